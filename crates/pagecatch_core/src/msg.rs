use chrono::NaiveDate;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// The engine finished one site, successfully or not.
    SiteProcessed {
        site: crate::SiteDescriptor,
        outcome: crate::SiteOutcome,
        /// Identity that produced a response, if any attempt succeeded.
        used_user_agent: Option<String>,
    },
    /// All configured sites were processed; assemble the report.
    RunFinished { today: NaiveDate },
}
