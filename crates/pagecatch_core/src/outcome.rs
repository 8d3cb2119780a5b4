#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoUpdateReason {
    /// The two latest snapshots produced no additive lines.
    Unchanged,
    /// Fewer than two snapshots exist, so nothing could be compared.
    NoBaseline,
}

/// Result of processing one site during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteOutcome {
    Updated {
        name: String,
        url: String,
        diff: String,
        summary: Option<String>,
    },
    NoUpdate {
        name: String,
        reason: NoUpdateReason,
    },
    Failed {
        name: String,
        url: String,
        message: String,
    },
}

impl SiteOutcome {
    pub fn name(&self) -> &str {
        match self {
            SiteOutcome::Updated { name, .. }
            | SiteOutcome::NoUpdate { name, .. }
            | SiteOutcome::Failed { name, .. } => name,
        }
    }

    pub fn has_update(&self) -> bool {
        matches!(self, SiteOutcome::Updated { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, SiteOutcome::Failed { .. })
    }
}
