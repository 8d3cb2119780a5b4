//! Pagecatch core: site model, pure run state machine and report assembly.
mod effect;
mod msg;
mod outcome;
mod report;
mod site;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use outcome::{NoUpdateReason, SiteOutcome};
pub use report::{build_report, Report};
pub use site::{trial_order, SiteDescriptor};
pub use state::RunState;
pub use update::update;
pub use view_model::RunSummary;
