use std::fmt;

/// Response body of one successful attempt, before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
    pub final_url: String,
}

/// Failure of a single attempt with a single client identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for FetchError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    InvalidUserAgent,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::InvalidUserAgent => write!(f, "invalid user agent header"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// Every client identity was tried and none produced a document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to fetch {url}: {}", last_error_message(.last_error))]
pub struct FetchFailure {
    pub url: String,
    /// Most recent attempt error; `None` when there was nothing to try.
    pub last_error: Option<FetchError>,
}

fn last_error_message(last: &Option<FetchError>) -> String {
    match last {
        Some(err) => err.to_string(),
        None => "no user agents configured".to_string(),
    }
}
