use crate::Report;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Persist the client identity that last worked for a site.
    RecordUserAgent {
        name: String,
        url: String,
        locator: Option<String>,
        user_agent: String,
    },
    /// Hand the finished report to the notifier.
    DeliverReport(Report),
}
