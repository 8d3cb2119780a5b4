use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pagecatch_core::SiteDescriptor;
use pagecatch_engine::{SummarizerSettings, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_PROMPT};
use serde::Deserialize;

/// Immutable run configuration loaded from `config.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default)]
    pub user_agents: Vec<String>,
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub mail: MailConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "locator")]
    pub xpath: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_prompt")]
    pub translation_summary_prompt: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            base_url: default_base_url(),
            translation_summary_prompt: default_prompt(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_true")]
    pub send: bool,
    #[serde(default = "default_smtp_server")]
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Vec<String>,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            send: true,
            smtp_server: default_smtp_server(),
            smtp_port: default_smtp_port(),
            user: None,
            password: None,
            from: None,
            to: Vec::new(),
        }
    }
}

impl MailConfig {
    /// Credentials and recipients are all present.
    pub fn is_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        filled(&self.user) && filled(&self.password) && !self.to.is_empty()
    }
}

impl AppConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn mail_log_path(&self) -> PathBuf {
        self.log_dir.join("mail.log")
    }

    /// Configured sites in order, as pipeline descriptors.
    pub fn sites(&self) -> Vec<SiteDescriptor> {
        self.sites
            .iter()
            .map(|site| SiteDescriptor {
                name: site.name.clone(),
                url: site.url.clone(),
                locator: site.xpath.clone(),
                user_agent: site.user_agent.clone(),
            })
            .collect()
    }

    /// Summarizer settings, or `None` when no API key is configured.
    pub fn summarizer_settings(&self) -> Option<SummarizerSettings> {
        let api_key = self
            .openai
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())?;
        Some(SummarizerSettings {
            api_key: api_key.to_string(),
            base_url: self.openai.base_url.clone(),
            model: self.openai.model.clone(),
            max_tokens: self.openai.max_tokens,
            temperature: self.openai.temperature,
            prompt_template: self.openai.translation_summary_prompt.clone(),
            timeout: Duration::from_secs(60),
        })
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("log")
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_temperature() -> f32 {
    0.7
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_prompt() -> String {
    DEFAULT_PROMPT.to_string()
}

fn default_true() -> bool {
    true
}

fn default_smtp_server() -> String {
    "smtp.gmail.com".to_string()
}

fn default_smtp_port() -> u16 {
    587
}
