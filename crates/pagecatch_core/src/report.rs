use chrono::NaiveDate;

use crate::SiteOutcome;

const UPDATES_HEADING: &str = "# 更新あり\n";
const NO_UPDATES_HEADING: &str = "# 更新なし\n";
const ERRORS_HEADING: &str = "\n# エラー:\n";
const SUMMARY_HEADING: &str = "### 和訳要約";
const MARKER_UPDATED: &str = "更新あり";
const MARKER_UNCHANGED: &str = "更新なし";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub subject: String,
    pub body: String,
    pub has_updates: bool,
}

/// Render the run report. Sections keep the order in which outcomes arrived.
pub fn build_report(outcomes: &[SiteOutcome], today: NaiveDate) -> Report {
    let mut updates = String::from(UPDATES_HEADING);
    let mut unchanged = String::from(NO_UPDATES_HEADING);
    let mut errors = Vec::new();

    for outcome in outcomes {
        match outcome {
            SiteOutcome::Updated {
                name,
                url,
                diff,
                summary,
            } => {
                updates.push_str(&format!("\n## {name}\n{url}\n\n{diff}\n"));
                if let Some(summary) = summary.as_deref().filter(|s| !s.is_empty()) {
                    updates.push_str(&format!("\n{SUMMARY_HEADING}\n{summary}\n"));
                }
            }
            SiteOutcome::NoUpdate { name, .. } => {
                unchanged.push_str(name);
                unchanged.push('\n');
            }
            SiteOutcome::Failed { name, url, message } => {
                errors.push(format!("Error processing {name} ({url}): {message}"));
            }
        }
    }

    let has_updates = outcomes.iter().any(SiteOutcome::has_update);
    let marker = if has_updates {
        MARKER_UPDATED
    } else {
        MARKER_UNCHANGED
    };
    let subject = format!("{marker}：差分報告（{}）", today.format("%Y/%m/%d"));

    let mut body = format!("{updates}\n{unchanged}");
    if !errors.is_empty() {
        body.push_str(ERRORS_HEADING);
        body.push_str(&errors.join("\n"));
    }

    Report {
        subject,
        body,
        has_updates,
    }
}
