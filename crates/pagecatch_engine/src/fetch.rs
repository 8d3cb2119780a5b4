use std::time::Duration;

use futures_util::StreamExt;
use pagecatch_logging::{catch_debug, catch_error, catch_info, catch_warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};

use crate::decode::{decode_document, extract_charset};
use crate::extract::narrow_to_locator;
use crate::{FailureKind, FetchError, FetchFailure, RawDocument};

/// Headers sent with every request besides `User-Agent`. Compression is
/// negotiated by the client itself.
pub const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
    ),
    ("accept-language", "ja,en-US;q=0.7,en;q=0.3"),
    ("connection", "keep-alive"),
    ("upgrade-insecure-requests", "1"),
    ("cache-control", "no-cache"),
    ("pragma", "no-cache"),
];

#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub request_timeout: Duration,
    pub redirect_limit: usize,
    pub max_bytes: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            redirect_limit: 10,
            max_bytes: 10 * 1024 * 1024,
        }
    }
}

/// One GET attempt with one client identity.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<RawDocument, FetchError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    settings: FetchSettings,
}

impl ReqwestFetcher {
    pub fn new(settings: FetchSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, FetchError> {
        reqwest::Client::builder()
            .timeout(self.settings.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(self.settings.redirect_limit))
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))
    }

    fn request_headers(user_agent: &str) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();
        for &(name, value) in BROWSER_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        let agent = HeaderValue::from_str(user_agent).map_err(|err| {
            FetchError::new(FailureKind::InvalidUserAgent, err.to_string())
        })?;
        headers.insert(USER_AGENT, agent);
        Ok(headers)
    }
}

#[async_trait::async_trait]
impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<RawDocument, FetchError> {
        let parsed = url::Url::parse(url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let headers = Self::request_headers(user_agent)?;
        let client = self.build_client()?;

        let response = client
            .get(parsed)
            .headers(headers)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        if let Some(content_len) = response.content_length() {
            if content_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(content_len),
                    },
                    "response too large",
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.settings.max_bytes {
                return Err(FetchError::new(
                    FailureKind::TooLarge {
                        max_bytes: self.settings.max_bytes,
                        actual: Some(next_len),
                    },
                    "response too large",
                ));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(RawDocument {
            bytes,
            content_type,
            final_url,
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        return FetchError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_redirect() {
        return FetchError::new(FailureKind::RedirectLimitExceeded, err.to_string());
    }
    FetchError::new(FailureKind::Network, err.to_string())
}

/// A decoded, optionally narrowed document and the identity that fetched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub html: String,
    pub user_agent: String,
    pub encoding: &'static str,
}

/// Try each identity of `order` until one attempt succeeds.
///
/// The body is decoded with the declared charset when present and narrowed to
/// `locator` when one is given. When every attempt fails, the last attempt's
/// error is carried by the returned [`FetchFailure`].
pub async fn fetch_with_fallback(
    fetcher: &dyn Fetcher,
    url: &str,
    locator: Option<&str>,
    order: &[String],
) -> Result<FetchedPage, FetchFailure> {
    catch_info!("Fetching {url}");
    let mut last_error = None;

    for agent in order {
        catch_debug!("Trying user agent: {agent}");
        match fetcher.fetch(url, agent).await {
            Ok(raw) => {
                let declared = raw.content_type.as_deref().and_then(extract_charset);
                let (decoded, encoding) = decode_document(&raw.bytes, declared.as_deref());
                if raw.final_url != url {
                    catch_info!("Redirected {url} -> {}", raw.final_url);
                }
                let html = match locator {
                    Some(locator) => narrow_to_locator(&decoded, locator),
                    None => decoded,
                };
                catch_info!("Fetched {url} (user agent: {agent})");
                return Ok(FetchedPage {
                    html,
                    user_agent: agent.clone(),
                    encoding: encoding.name(),
                });
            }
            Err(err) => {
                catch_warn!("Fetch failed for {url}: {err} (user agent: {agent})");
                last_error = Some(err);
            }
        }
    }

    let failure = FetchFailure {
        url: url.to_string(),
        last_error,
    };
    catch_error!("All user agents failed: {failure}");
    Err(failure)
}
