use std::time::Duration;

use pagecatch_logging::{catch_debug, catch_error, catch_info, catch_warn};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use crate::language::is_english;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PROMPT: &str = "以下の英文を日本語で要約してください。\n\n英文:\n{text}";

#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    #[error("invalid api key header: {0}")]
    InvalidApiKey(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("summarization backend returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("summarization backend returned no content")]
    EmptyResponse,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummarizerSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Prompt with a `{text}` placeholder for the diff.
    pub prompt_template: String,
    pub timeout: Duration,
}

impl SummarizerSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1000,
            temperature: 0.7,
            prompt_template: DEFAULT_PROMPT.to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    pub fn render_prompt(&self, text: &str) -> String {
        self.prompt_template.replace("{text}", text)
    }
}

/// Text-in, text-out summarization backend.
#[async_trait::async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

/// Chat-completions client for OpenAI-compatible endpoints.
pub struct OpenAiSummarizer {
    settings: SummarizerSettings,
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiSummarizer {
    pub fn new(settings: SummarizerSettings) -> Result<Self, SummarizeError> {
        let mut headers = HeaderMap::new();
        let auth = format!("Bearer {}", settings.api_key.trim());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth)
                .map_err(|err| SummarizeError::InvalidApiKey(err.to_string()))?,
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .default_headers(headers)
            .build()?;
        let endpoint = format!(
            "{}/chat/completions",
            settings.base_url.trim_end_matches('/')
        );
        Ok(Self {
            settings,
            client,
            endpoint,
        })
    }
}

#[async_trait::async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let prompt = self.settings.render_prompt(text);
        let body = ChatRequest {
            model: &self.settings.model,
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };
        catch_debug!("Requesting summary, model: {}", self.settings.model);

        let resp = self.client.post(&self.endpoint).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            return Err(SummarizeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        parsed
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(SummarizeError::EmptyResponse)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

/// Summary for English diffs; `None` for other text, without a backend, or on failure.
pub async fn summarize_if_english(
    summarizer: Option<&dyn Summarizer>,
    site_name: &str,
    diff: &str,
) -> Option<String> {
    if !is_english(diff) {
        return None;
    }
    catch_info!("English text detected: {site_name}");
    let Some(summarizer) = summarizer else {
        catch_warn!("No summarization backend configured, skipping summary");
        return None;
    };
    match summarizer.summarize(diff).await {
        Ok(summary) => {
            catch_debug!("Summary completed for {site_name}");
            Some(summary)
        }
        Err(err) => {
            catch_error!("Summarization failed for {site_name}: {err}");
            None
        }
    }
}
