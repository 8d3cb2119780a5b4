use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use pagecatch_engine::{append_record, PersistError};
use pagecatch_logging::{catch_error, catch_info, catch_warn};

use crate::config::MailConfig;

/// Outbound delivery of a finished report.
pub trait Notifier: Send + Sync {
    /// `true` when the message left the process.
    fn deliver(&self, subject: &str, body: &str) -> bool;
}

/// Local append-only record of every report that was not sent.
#[derive(Debug, Clone)]
pub struct MailLog {
    path: PathBuf,
}

impl MailLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, subject: &str, body: &str) -> Result<(), PersistError> {
        self.append_at(subject, body, Local::now().naive_local())
    }

    pub fn append_at(
        &self,
        subject: &str,
        body: &str,
        at: NaiveDateTime,
    ) -> Result<(), PersistError> {
        append_record(&self.path, &format_record(subject, body, at))
    }
}

pub fn format_record(subject: &str, body: &str, at: NaiveDateTime) -> String {
    format!(
        "\n{}\nDate: {}\nSubject: {}\n\n{}\n",
        "=".repeat(50),
        at.format("%Y-%m-%d %H:%M:%S"),
        subject,
        body
    )
}

/// Routes the report to the configured transport and falls back to the mail log.
pub struct ReportDispatcher {
    settings: MailConfig,
    send_enabled: bool,
    transport: Option<Box<dyn Notifier>>,
    log: MailLog,
}

impl ReportDispatcher {
    pub fn new(settings: MailConfig, send_enabled: bool, log: MailLog) -> Self {
        Self {
            settings,
            send_enabled,
            transport: None,
            log,
        }
    }

    pub fn with_transport(mut self, transport: Box<dyn Notifier>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Deliver or log the report. Returns `true` when handled as intended,
    /// which includes a disabled transport.
    pub fn dispatch(&self, subject: &str, body: &str) -> bool {
        if !self.send_enabled {
            catch_info!("Mail sending disabled, writing report to {:?}", self.log.path());
            self.write_log(subject, body);
            return true;
        }

        let Some(transport) = self.transport.as_deref() else {
            catch_warn!("No mail transport available, writing report to {:?}", self.log.path());
            self.write_log(subject, body);
            return false;
        };
        if !self.settings.is_complete() {
            catch_error!("Mail settings are incomplete (user, password and to are required)");
            self.write_log(subject, body);
            return false;
        }

        if transport.deliver(subject, body) {
            catch_info!("Report sent to {}", self.settings.to.join(", "));
            true
        } else {
            catch_error!("Report delivery failed, writing report to {:?}", self.log.path());
            self.write_log(subject, body);
            false
        }
    }

    fn write_log(&self, subject: &str, body: &str) {
        if let Err(err) = self.log.append(subject, body) {
            catch_error!("Failed to write mail log {:?}: {err}", self.log.path());
        }
    }
}
