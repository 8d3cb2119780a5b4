use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use pagecatch_logging::catch_debug;
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
/// Length of a formatted `TIMESTAMP_FORMAT` value.
const TIMESTAMP_LEN: usize = 15;
const SNAPSHOT_EXTENSION: &str = ".txt";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ordered, append-only history of captured documents per site identity.
pub trait SnapshotStore: Send + Sync {
    /// Store a new capture and return where it lives.
    fn save(&self, identity: &str, content: &str) -> Result<PathBuf, SnapshotError>;

    /// Newest and previous capture for `identity`, or `None` with fewer than two.
    fn find_latest_two(&self, identity: &str) -> Result<Option<(PathBuf, PathBuf)>, SnapshotError>;
}

/// Replace every character outside `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_identity(identity: &str) -> String {
    identity
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// Snapshots as files named `<YYYYMMDD-HHMMSS>_<sanitized identity>.txt` in one directory.
#[derive(Clone)]
pub struct DirSnapshotStore {
    writer: AtomicFileWriter,
    clock: Clock,
}

impl DirSnapshotStore {
    pub fn new(dir: PathBuf) -> Self {
        Self::with_clock(dir, Arc::new(|| Local::now().naive_local()))
    }

    pub fn with_clock(dir: PathBuf, clock: Clock) -> Self {
        Self {
            writer: AtomicFileWriter::new(dir),
            clock,
        }
    }

    pub fn dir(&self) -> &Path {
        self.writer.dir()
    }

    fn next_free_name(&self, timestamp: &str, sanitized: &str) -> String {
        let plain = format!("{timestamp}_{sanitized}{SNAPSHOT_EXTENSION}");
        if !self.dir().join(&plain).exists() {
            return plain;
        }
        let mut seq = 1u32;
        loop {
            let candidate = format!("{timestamp}-{seq:02}_{sanitized}{SNAPSHOT_EXTENSION}");
            if !self.dir().join(&candidate).exists() {
                return candidate;
            }
            seq += 1;
        }
    }
}

impl SnapshotStore for DirSnapshotStore {
    fn save(&self, identity: &str, content: &str) -> Result<PathBuf, SnapshotError> {
        let timestamp = (self.clock)().format(TIMESTAMP_FORMAT).to_string();
        let name = self.next_free_name(&timestamp, &sanitize_identity(identity));
        let path = self.writer.write(&name, content)?;
        catch_debug!("Saved snapshot {:?}", path);
        Ok(path)
    }

    fn find_latest_two(&self, identity: &str) -> Result<Option<(PathBuf, PathBuf)>, SnapshotError> {
        let dir = self.dir();
        if !dir.is_dir() {
            return Ok(None);
        }
        let sanitized = sanitize_identity(identity);

        let mut names: Vec<String> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .filter(|name| name.contains(&sanitized))
            .collect();
        if names.len() < 2 {
            return Ok(None);
        }

        // Timestamp, then same-second sequence; the full name breaks ties so
        // results do not depend on directory listing order.
        names.sort_by(|a, b| sort_key(b).cmp(&sort_key(a)).then_with(|| b.cmp(a)));

        Ok(Some((dir.join(&names[0]), dir.join(&names[1]))))
    }
}

fn timestamp_prefix(name: &str) -> &str {
    name.split('_').next().unwrap_or(name)
}

/// `(timestamp, sequence)` of a snapshot name; plain names have sequence 0.
/// The sequence compares numerically, so `-100` sorts after `-99`.
fn sort_key(name: &str) -> (&str, u32) {
    let prefix = timestamp_prefix(name);
    match prefix.get(TIMESTAMP_LEN..) {
        Some(rest) if rest.starts_with('-') => match rest[1..].parse() {
            Ok(seq) => (&prefix[..TIMESTAMP_LEN], seq),
            Err(_) => (prefix, 0),
        },
        _ => (prefix, 0),
    }
}
