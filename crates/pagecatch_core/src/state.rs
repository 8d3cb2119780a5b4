use crate::view_model::RunSummary;
use crate::SiteOutcome;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunState {
    outcomes: Vec<SiteOutcome>,
    finished: bool,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn outcomes(&self) -> &[SiteOutcome] {
        &self.outcomes
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for outcome in &self.outcomes {
            match outcome {
                SiteOutcome::Updated { .. } => summary.updated += 1,
                SiteOutcome::NoUpdate { .. } => summary.unchanged += 1,
                SiteOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    pub(crate) fn push_outcome(&mut self, outcome: SiteOutcome) {
        self.outcomes.push(outcome);
    }

    pub(crate) fn finish(&mut self) {
        self.finished = true;
    }
}
