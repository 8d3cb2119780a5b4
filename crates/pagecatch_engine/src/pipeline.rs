use std::sync::Arc;

use pagecatch_core::{trial_order, NoUpdateReason, SiteDescriptor, SiteOutcome};
use pagecatch_logging::{catch_debug, catch_error, catch_info};

use crate::diff::{additive_diff, DiffOutcome};
use crate::fetch::{fetch_with_fallback, Fetcher};
use crate::snapshot::SnapshotStore;
use crate::summarize::{summarize_if_english, Summarizer};

/// Result of one site's pass through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRun {
    pub outcome: SiteOutcome,
    /// Identity that fetched the page, even if a later stage failed.
    pub used_user_agent: Option<String>,
}

/// Fetch -> snapshot -> diff -> classify -> summarize, one site at a time.
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    store: Arc<dyn SnapshotStore>,
    summarizer: Option<Arc<dyn Summarizer>>,
    user_agents: Vec<String>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn SnapshotStore>,
        user_agents: Vec<String>,
    ) -> Self {
        Self {
            fetcher,
            store,
            summarizer: None,
            user_agents,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// Process one site. Failures end up in the returned outcome, never as `Err`.
    pub async fn process_site(&self, site: &SiteDescriptor) -> SiteRun {
        catch_info!("Processing site {} ({})", site.name, site.url);

        let order = trial_order(&self.user_agents, site.preferred_user_agent());
        let page = match fetch_with_fallback(
            self.fetcher.as_ref(),
            &site.url,
            site.effective_locator(),
            &order,
        )
        .await
        {
            Ok(page) => page,
            Err(failure) => return failed(site, failure.to_string(), None),
        };
        catch_debug!("Decoded {} as {}", site.name, page.encoding);
        let used = Some(page.user_agent.clone());

        let identity = site.identity();
        if let Err(err) = self.store.save(&identity, &page.html) {
            return failed(site, format!("failed to save snapshot: {err}"), used);
        }

        let (newest, previous) = match self.store.find_latest_two(&identity) {
            Ok(Some(pair)) => pair,
            Ok(None) => {
                catch_info!("Not enough snapshots to compare yet: {}", site.name);
                return SiteRun {
                    outcome: no_update(site, NoUpdateReason::NoBaseline),
                    used_user_agent: used,
                };
            }
            Err(err) => return failed(site, format!("failed to list snapshots: {err}"), used),
        };

        let outcome = match additive_diff(&newest, &previous) {
            DiffOutcome::NoDiff => {
                catch_info!("No update: {}", site.name);
                no_update(site, NoUpdateReason::Unchanged)
            }
            DiffOutcome::Added(diff) => {
                let summary =
                    summarize_if_english(self.summarizer.as_deref(), &site.name, &diff).await;
                catch_info!("Update detected: {}", site.name);
                SiteOutcome::Updated {
                    name: site.name.clone(),
                    url: site.url.clone(),
                    diff,
                    summary,
                }
            }
        };

        SiteRun {
            outcome,
            used_user_agent: used,
        }
    }
}

fn no_update(site: &SiteDescriptor, reason: NoUpdateReason) -> SiteOutcome {
    SiteOutcome::NoUpdate {
        name: site.name.clone(),
        reason,
    }
}

fn failed(site: &SiteDescriptor, message: String, used_user_agent: Option<String>) -> SiteRun {
    catch_error!("Error processing site {}: {message}", site.name);
    SiteRun {
        outcome: SiteOutcome::Failed {
            name: site.name.clone(),
            url: site.url.clone(),
            message,
        },
        used_user_agent,
    }
}
