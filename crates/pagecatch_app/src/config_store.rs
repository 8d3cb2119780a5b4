use std::fs;
use std::path::{Path, PathBuf};

use pagecatch_engine::{AtomicFileWriter, PersistError};
use pagecatch_logging::{catch_error, catch_info};
use serde_yaml::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigWriteError {
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to write config: {0}")]
    Persist(#[from] PersistError),
    #[error("config has no site named {0:?} with a matching url and locator")]
    SiteNotFound(String),
    #[error("config path {0:?} has no file name")]
    InvalidPath(PathBuf),
}

/// Writes per-site state back into the configuration document in place,
/// leaving every other key as the user wrote it.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set `user_agent` on the site matching `name`, `url` and `locator`.
    pub fn record_user_agent(
        &self,
        name: &str,
        url: &str,
        locator: Option<&str>,
        user_agent: &str,
    ) -> Result<(), ConfigWriteError> {
        let content = fs::read_to_string(&self.path)?;
        let mut document: Value = serde_yaml::from_str(&content)?;

        let site = document
            .get_mut("sites")
            .and_then(Value::as_sequence_mut)
            .and_then(|sites| {
                sites
                    .iter_mut()
                    .find(|site| site_matches(site, name, url, locator))
            })
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| ConfigWriteError::SiteNotFound(name.to_string()))?;
        site.insert(
            Value::String("user_agent".to_string()),
            Value::String(user_agent.to_string()),
        );

        let serialized = serde_yaml::to_string(&document)?;
        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ConfigWriteError::InvalidPath(self.path.clone()))?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        AtomicFileWriter::new(dir).write(file_name, &serialized)?;
        Ok(())
    }

    /// Like [`Self::record_user_agent`], logging instead of returning errors.
    pub fn record_user_agent_logged(
        &self,
        name: &str,
        url: &str,
        locator: Option<&str>,
        user_agent: &str,
    ) {
        match self.record_user_agent(name, url, locator, user_agent) {
            Ok(()) => catch_info!("Saved user agent for {name}: {user_agent}"),
            Err(err) => catch_error!("Failed to save user agent for {name}: {err}"),
        }
    }
}

fn site_matches(site: &Value, name: &str, url: &str, locator: Option<&str>) -> bool {
    let text = |key: &str| site.get(key).and_then(Value::as_str).unwrap_or("");
    let site_locator = match site.get("xpath").and_then(Value::as_str) {
        Some(xpath) => xpath,
        None => text("locator"),
    };
    text("name") == name && text("url") == url && site_locator == locator.unwrap_or("")
}
