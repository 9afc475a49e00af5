use std::time::Duration;

use crate::url::DEFAULT_OLLAMA_BASE_URL;

/// Transport configuration for Ollama chat requests.
#[derive(Debug, Clone)]
pub struct OllamaApiConfig {
    /// Base URL of the Ollama host.
    pub base_url: String,
    /// Optional request timeout. Without it the generation call can hang
    /// for as long as the host keeps the connection open.
    pub timeout: Option<Duration>,
    /// Optional `keep_alive` value forwarded on every request.
    pub keep_alive: Option<String>,
}

impl Default for OllamaApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            timeout: None,
            keep_alive: None,
        }
    }
}

impl OllamaApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: impl Into<String>) -> Self {
        self.keep_alive = Some(keep_alive.into());
        self
    }
}
