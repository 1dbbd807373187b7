//! Agent configuration, loadable from TOML or environment.
//!
//! The oracle credential always comes from `OPENAI_API_KEY`. A missing or
//! empty credential is a startup failure, never a per-request one.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use crate::error::{AgentError, AgentResult};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";
pub const BASE_URL_VAR: &str = "OPENAI_BASE_URL";
pub const TIMEOUT_VAR: &str = "OPENAI_TIMEOUT_SECS";

/// Bearer credential for the oracle. Redacted in `Debug` output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Settings for the OpenAI-compatible chat completions endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL, without the trailing `/chat/completions`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Model used for every call.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Never read from files.
    #[serde(skip)]
    pub api_key: ApiKey,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4.1-mini".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            api_key: ApiKey::default(),
        }
    }
}

/// Top-level configuration for the agent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub openai: OpenAiConfig,
}

impl AgentConfig {
    /// Load config from environment variables.
    pub fn from_env() -> AgentResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().apply_overrides(lookup)
    }

    /// Load non-secret settings from a TOML file, then overlay the environment.
    pub fn from_file(path: impl AsRef<Path>) -> AgentResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AgentError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&contents, |key| std::env::var(key).ok())
    }

    pub fn from_toml_str<F>(contents: &str, lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config: Self = toml::from_str(contents)
            .map_err(|e| AgentError::Configuration(format!("invalid config file: {e}")))?;
        config.apply_overrides(lookup)
    }

    fn apply_overrides<F>(mut self, lookup: F) -> AgentResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup(MODEL_VAR) {
            self.openai.model = model;
        }
        if let Some(base_url) = lookup(BASE_URL_VAR) {
            self.openai.base_url = base_url;
        }
        if let Some(raw) = lookup(TIMEOUT_VAR) {
            self.openai.timeout_secs = raw.parse().map_err(|_| {
                AgentError::Configuration(format!("{TIMEOUT_VAR} must be an integer, got '{raw}'"))
            })?;
        }

        let api_key = ApiKey::new(lookup(API_KEY_VAR).unwrap_or_default());
        if api_key.is_empty() {
            return Err(AgentError::Configuration(format!(
                "{API_KEY_VAR} is not set in environment variables"
            )));
        }
        self.openai.api_key = api_key;
        Ok(self)
    }
}
