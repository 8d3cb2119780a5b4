use std::fs;
use std::path::Path;

use pagecatch_logging::{catch_debug, catch_error, catch_warn};
use similar::{Algorithm, ChangeTag, TextDiff};

use crate::extract::extract_text;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOutcome {
    /// Lines present in the newer text only, joined with `\n`.
    Added(String),
    NoDiff,
}

impl DiffOutcome {
    pub fn added(&self) -> Option<&str> {
        match self {
            DiffOutcome::Added(text) => Some(text),
            DiffOutcome::NoDiff => None,
        }
    }
}

/// Lines a line-based comparison of `old` against `new` marks as inserted.
/// Deletions and lines common to both never appear.
pub fn additive_lines(old: &str, new: &str) -> Vec<String> {
    if old == new {
        return Vec::new();
    }
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_slices(&old_lines, &new_lines);

    diff.iter_all_changes()
        .filter(|change| change.tag() == ChangeTag::Insert)
        .map(|change| change.value().to_string())
        .collect()
}

/// Compare two stored snapshots after normalizing both with [`extract_text`].
///
/// Missing or unreadable files yield [`DiffOutcome::NoDiff`]; diffing is best effort.
pub fn additive_diff(newest: &Path, previous: &Path) -> DiffOutcome {
    if !newest.exists() || !previous.exists() {
        catch_warn!(
            "Snapshot missing for comparison: newest={} previous={}",
            newest.exists(),
            previous.exists()
        );
        return DiffOutcome::NoDiff;
    }

    let (new_raw, old_raw) = match (fs::read(newest), fs::read(previous)) {
        (Ok(new_raw), Ok(old_raw)) => (new_raw, old_raw),
        (Err(err), _) | (_, Err(err)) => {
            catch_error!("Failed to read snapshots for comparison: {err}");
            return DiffOutcome::NoDiff;
        }
    };

    let new_text = extract_text(&String::from_utf8_lossy(&new_raw));
    let old_text = extract_text(&String::from_utf8_lossy(&old_raw));
    if new_text == old_text {
        catch_debug!("No diff: normalized texts are identical");
        return DiffOutcome::NoDiff;
    }

    let added = additive_lines(&old_text, &new_text);
    if added.is_empty() {
        catch_debug!("No diff: no added lines");
        return DiffOutcome::NoDiff;
    }
    DiffOutcome::Added(added.join("\n"))
}
