//! Client Settings
//!
//! Connection settings for the DeepSeek API, read from the environment or
//! set in code.

use crate::error::{DeepSeekError, Result};
use crate::models::ModelAllowList;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1/";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(100);

/// Required API key
pub const API_KEY_ENV: &str = "DEEPSEEK_API_KEY";

/// Optional base URL override
pub const BASE_URL_ENV: &str = "DEEPSEEK_BASE_URL";

/// Optional timeout override, in seconds
pub const TIMEOUT_ENV: &str = "DEEPSEEK_TIMEOUT_SECS";

/// Optional comma separated allow-list override
pub const ALLOWED_MODELS_ENV: &str = "DEEPSEEK_ALLOWED_MODELS";

/// Settings used to build a [`DeepSeekClient`](crate::DeepSeekClient)
#[derive(Clone)]
pub struct ClientConfig {
    /// Bearer token sent with every request
    pub api_key: String,

    /// API root; `chat/completions` is resolved against it
    pub base_url: String,

    /// Whole-request timeout
    pub timeout: Duration,

    /// Value of the `User-Agent` header
    pub user_agent: String,

    /// Models accepted by request validation
    pub allowed_models: ModelAllowList,
}

impl ClientConfig {
    /// Defaults for everything except the API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            allowed_models: ModelAllowList::default(),
        }
    }

    /// Load `.env` if present, then read the process environment
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings from a dotenv file without touching the process environment
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let iter = dotenvy::from_path_iter(path).map_err(|e| {
            DeepSeekError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut vars = HashMap::new();
        for item in iter {
            let (key, value) = item.map_err(|e| {
                DeepSeekError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })?;
            vars.insert(key, value);
        }

        Self::from_lookup(|name| vars.get(name).cloned())
    }

    /// Build settings from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_empty(API_KEY_ENV)
            .ok_or_else(|| DeepSeekError::Config(format!("{} is not set", API_KEY_ENV)))?;

        let mut config = Self::new(api_key.trim());

        if let Some(url) = non_empty(BASE_URL_ENV) {
            config.base_url = url.trim().to_string();
        }

        if let Some(secs) = non_empty(TIMEOUT_ENV) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                DeepSeekError::Config(format!("{} must be a whole number of seconds", TIMEOUT_ENV))
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        if let Some(list) = non_empty(ALLOWED_MODELS_ENV) {
            config.allowed_models = ModelAllowList::parse(&list);
        }

        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_allowed_models(mut self, allowed_models: ModelAllowList) -> Self {
        self.allowed_models = allowed_models;
        self
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("allowed_models", &self.allowed_models)
            .finish()
    }
}

fn default_user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}
