use std::fmt;
use std::path::PathBuf;

use crate::domain::DomainError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1";
pub const DEFAULT_REFERER: &str = "http://localhost";
pub const DEFAULT_TITLE: &str = "NovelAI-Generator";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Settings for the completion endpoint and the log directory.
///
/// | Variable              | Default                        | Purpose                     |
/// |-----------------------|--------------------------------|-----------------------------|
/// | `OPENROUTER_API_KEY`  | required                       | Bearer credential           |
/// | `OPENROUTER_BASE_URL` | `https://openrouter.ai/api/v1` | Any OpenAI-compatible API   |
/// | `PARLEY_MODEL`        | `deepseek/deepseek-r1`         | Model identifier            |
/// | `PARLEY_REFERER`      | `http://localhost`             | `HTTP-Referer` header       |
/// | `PARLEY_TITLE`        | `NovelAI-Generator`            | `X-Title` header            |
/// | `PARLEY_LOG_DIR`      | `logs`                         | Root of all log files       |
/// | `PARLEY_TIMEOUT_SECS` | `120`                          | Per-request timeout         |
#[derive(Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub referer: String,
    pub title: String,
    pub log_dir: PathBuf,
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Defaults for everything except the credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            referer: DEFAULT_REFERER.to_string(),
            title: DEFAULT_TITLE.to_string(),
            log_dir: PathBuf::from(DEFAULT_LOG_DIR),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENROUTER_API_KEY")
            .ok_or_else(|| DomainError::config("OPENROUTER_API_KEY is not set"))?;
        let mut config = Self::with_api_key(api_key);

        if let Some(url) = get("OPENROUTER_BASE_URL") {
            config.base_url = url;
        }
        if let Some(model) = get("PARLEY_MODEL") {
            config.model = model;
        }
        if let Some(referer) = get("PARLEY_REFERER") {
            config.referer = referer;
        }
        if let Some(title) = get("PARLEY_TITLE") {
            config.title = title;
        }
        if let Some(dir) = get("PARLEY_LOG_DIR") {
            config.log_dir = PathBuf::from(dir);
        }
        if let Some(secs) = get("PARLEY_TIMEOUT_SECS") {
            config.timeout_secs = secs.trim().parse().map_err(|_| {
                DomainError::config(format!("PARLEY_TIMEOUT_SECS must be a number, got '{secs}'"))
            })?;
        }

        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("referer", &self.referer)
            .field("title", &self.title)
            .field("log_dir", &self.log_dir)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
