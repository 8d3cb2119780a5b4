use pagecatch_core::Effect;
use pagecatch_logging::catch_info;

use crate::config_store::ConfigStore;
use crate::notify::ReportDispatcher;

/// Carries out the effects emitted by the run state machine.
pub struct EffectRunner {
    config: ConfigStore,
    dispatcher: ReportDispatcher,
}

impl EffectRunner {
    pub fn new(config: ConfigStore, dispatcher: ReportDispatcher) -> Self {
        Self { config, dispatcher }
    }

    /// Execute `effects` in order. Returns the delivery result when a report
    /// was among them.
    pub fn run(&self, effects: Vec<Effect>) -> Option<bool> {
        let mut delivered = None;
        for effect in effects {
            match effect {
                Effect::RecordUserAgent {
                    name,
                    url,
                    locator,
                    user_agent,
                } => {
                    self.config
                        .record_user_agent_logged(&name, &url, locator.as_deref(), &user_agent);
                }
                Effect::DeliverReport(report) => {
                    catch_info!("Delivering report: {}", report.subject);
                    let handled = self.dispatcher.dispatch(&report.subject, &report.body);
                    catch_info!("Report handled (delivered: {handled})");
                    delivered = Some(handled);
                }
            }
        }
        delivered
    }
}
