use serde::{Deserialize, Serialize};

/// Wire-level chat message carried in the request payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireChatMessage {
    pub role: String,
    pub content: String,
}

impl WireChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Sampling options forwarded to the model runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChatOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_ctx: Option<u64>,
}

impl ChatOptions {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_ctx.is_none()
    }
}

/// Canonical request payload shape for the Ollama chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    /// Full ordered conversation history; the endpoint is stateless across calls.
    pub messages: Vec<WireChatMessage>,
    /// Default: true.
    #[serde(default = "default_true")]
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ChatOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_alive: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<WireChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            stream: true,
            options: None,
            keep_alive: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.options
            .get_or_insert_with(ChatOptions::default)
            .temperature = Some(temperature);
        self
    }
}
