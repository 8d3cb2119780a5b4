use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use pagecatch_core::{update, Msg, RunState, RunSummary};
use pagecatch_engine::{
    ensure_output_dir, DirSnapshotStore, FetchSettings, OpenAiSummarizer, Pipeline, ReqwestFetcher,
};
use pagecatch_logging::{catch_error, catch_info, catch_warn};

use crate::config::AppConfig;
use crate::config_store::ConfigStore;
use crate::effects::EffectRunner;
use crate::notify::{MailLog, ReportDispatcher};
use crate::smtp::SmtpNotifier;

/// Create the snapshot and log directories named by `config`.
pub fn prepare_dirs(config: &AppConfig) -> Result<()> {
    ensure_output_dir(&config.data_dir)
        .with_context(|| format!("failed to create data dir {:?}", config.data_dir))?;
    ensure_output_dir(&config.log_dir)
        .with_context(|| format!("failed to create log dir {:?}", config.log_dir))?;
    Ok(())
}

fn build_pipeline(config: &AppConfig) -> Pipeline {
    let fetcher = Arc::new(ReqwestFetcher::new(FetchSettings::default()));
    let store = Arc::new(DirSnapshotStore::new(config.data_dir.clone()));
    let pipeline = Pipeline::new(fetcher, store, config.user_agents.clone());

    let Some(settings) = config.summarizer_settings() else {
        catch_warn!("No OpenAI API key configured, summaries are disabled");
        return pipeline;
    };
    match OpenAiSummarizer::new(settings) {
        Ok(summarizer) => pipeline.with_summarizer(Arc::new(summarizer)),
        Err(err) => {
            catch_error!("Failed to initialize summarizer: {err}");
            pipeline
        }
    }
}

fn build_dispatcher(config: &AppConfig, send_enabled: bool) -> ReportDispatcher {
    let dispatcher = ReportDispatcher::new(
        config.mail.clone(),
        send_enabled,
        MailLog::new(config.mail_log_path()),
    );
    if !send_enabled || !config.mail.is_complete() {
        return dispatcher;
    }
    match SmtpNotifier::new(&config.mail) {
        Ok(notifier) => dispatcher.with_transport(Box::new(notifier)),
        Err(err) => {
            catch_error!("Failed to initialize mail transport: {err}");
            dispatcher
        }
    }
}

/// Counters of a finished run and whether its report was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunResult {
    pub summary: RunSummary,
    /// `true` when sent, or written to the mail log with sending disabled.
    pub report_delivered: bool,
}

/// One full monitoring pass over every configured site, ending with the report.
///
/// Expects the directories from [`prepare_dirs`]. `send_mail` is AND-ed with
/// `mail.send` from the configuration.
pub async fn run(config: &AppConfig, config_path: &Path, send_mail: bool) -> Result<RunResult> {
    let pipeline = build_pipeline(config);
    let dispatcher = build_dispatcher(config, send_mail && config.mail.send);
    let runner = EffectRunner::new(ConfigStore::new(config_path.to_path_buf()), dispatcher);

    let mut state = RunState::new();
    for site in config.sites() {
        if site.url.trim().is_empty() {
            catch_warn!("Skipping site {:?}: no url configured", site.name);
            continue;
        }
        let run = pipeline.process_site(&site).await;
        let (next, effects) = update(
            state,
            Msg::SiteProcessed {
                site,
                outcome: run.outcome,
                used_user_agent: run.used_user_agent,
            },
        );
        state = next;
        runner.run(effects);
    }

    let (state, effects) = update(
        state,
        Msg::RunFinished {
            today: Local::now().date_naive(),
        },
    );
    let report_delivered = runner.run(effects).unwrap_or(false);

    let summary = state.summary();
    catch_info!("Run complete: {summary}");
    Ok(RunResult {
        summary,
        report_delivered,
    })
}
