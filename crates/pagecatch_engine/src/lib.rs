//! Pagecatch engine: fetch, normalize, snapshot and diff pipeline.
mod decode;
mod diff;
mod extract;
mod fetch;
mod language;
mod locator;
mod persist;
mod pipeline;
mod snapshot;
mod summarize;
mod types;

pub use decode::{decode_document, extract_charset, resolve_encoding};
pub use diff::{additive_diff, additive_lines, DiffOutcome};
pub use extract::{extract_text, narrow_to_locator};
pub use fetch::{
    fetch_with_fallback, FetchSettings, FetchedPage, Fetcher, ReqwestFetcher, BROWSER_HEADERS,
};
pub use language::is_english;
pub use locator::{looks_like_xpath, xpath_to_css, XPathError};
pub use persist::{append_record, ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{Pipeline, SiteRun};
pub use snapshot::{sanitize_identity, Clock, DirSnapshotStore, SnapshotError, SnapshotStore};
pub use summarize::{
    summarize_if_english, OpenAiSummarizer, SummarizeError, Summarizer, SummarizerSettings,
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_PROMPT,
};
pub use types::{FailureKind, FetchError, FetchFailure, RawDocument};
