use std::fmt;

/// Per-run counters for the closing log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub updated: usize,
    pub unchanged: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} site(s): {} updated, {} unchanged, {} failed",
            self.total(),
            self.updated,
            self.unchanged,
            self.failed
        )
    }
}
