//! Ollama-backed implementation of the shared `chat_provider` contract.
//!
//! This adapter translates `ollama_api` stream semantics into deterministic
//! `GenerateEvent` lifecycle events expected by the conversation controller.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use chat_provider::{
    CancelSignal, ChatProvider, GenerateEvent, GenerateRequest, ProviderInitError,
    ProviderProfile, TokenUsage,
};
use ollama_api::{
    ChatDone, ChatDoneReason, ChatRequest, ChatStreamEvent, OllamaApiClient, OllamaApiConfig,
    OllamaApiError, StreamResult, WireChatMessage,
};

pub use ollama_api::url::DEFAULT_OLLAMA_BASE_URL;

/// Stable provider identifier used by `sigma` startup selection.
pub const OLLAMA_PROVIDER_ID: &str = "ollama";

/// Runtime configuration for the Ollama provider.
#[derive(Debug, Clone, PartialEq)]
pub struct OllamaProviderConfig {
    pub host: String,
    pub model_id: String,
    pub temperature: Option<f64>,
    pub timeout: Option<Duration>,
}

impl OllamaProviderConfig {
    #[must_use]
    pub fn new(host: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            model_id: model_id.into(),
            temperature: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn into_api_config(self) -> OllamaApiConfig {
        let mut config = OllamaApiConfig::new(self.host);
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(timeout);
        }
        config
    }
}

trait StreamClient: Send + Sync {
    fn stream(
        &self,
        request: &ChatRequest,
        cancel: &CancelSignal,
    ) -> Result<StreamResult, OllamaApiError>;
}

#[derive(Debug)]
struct DefaultStreamClient {
    client: OllamaApiClient,
}

impl StreamClient for DefaultStreamClient {
    fn stream(
        &self,
        request: &ChatRequest,
        cancel: &CancelSignal,
    ) -> Result<StreamResult, OllamaApiError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|error| {
                OllamaApiError::Unknown(format!("failed to initialize tokio runtime: {error}"))
            })?;

        runtime.block_on(self.client.stream(request, Some(cancel)))
    }
}

/// `ChatProvider` adapter backed by `ollama_api` transport primitives.
pub struct OllamaProvider {
    model_id: String,
    temperature: Option<f64>,
    stream_client: Arc<dyn StreamClient>,
}

impl OllamaProvider {
    /// Creates a provider using real Ollama chat transport.
    pub fn new(config: OllamaProviderConfig) -> Result<Self, ProviderInitError> {
        let model_id = sanitize_model_id(&config.model_id)?;
        let temperature = config.temperature;
        let stream_client = Arc::new(DefaultStreamClient {
            client: OllamaApiClient::new(config.into_api_config()).map_err(map_init_error)?,
        });

        Ok(Self {
            model_id,
            temperature,
            stream_client,
        })
    }

    fn build_chat_request(&self, req: &GenerateRequest) -> ChatRequest {
        let messages = req
            .messages
            .iter()
            .map(|message| WireChatMessage::new(message.role(), message.text()))
            .collect();

        let mut request = ChatRequest::new(self.model_id.clone(), messages);
        if let Some(temperature) = req.temperature.or(self.temperature) {
            request = request.with_temperature(temperature);
        }
        request
    }

    fn emit_stream_chunks(
        &self,
        generation_id: u64,
        stream_events: Vec<ChatStreamEvent>,
        emit: &mut dyn FnMut(GenerateEvent),
    ) {
        for stream_event in stream_events {
            if let ChatStreamEvent::MessageDelta { content } = stream_event {
                if !content.is_empty() {
                    emit(GenerateEvent::Chunk {
                        generation_id,
                        text: content,
                    });
                }
            }
        }
    }

    fn emit_terminal_event(
        &self,
        generation_id: u64,
        done: Option<ChatDone>,
        emit: &mut dyn FnMut(GenerateEvent),
    ) {
        match done {
            Some(info) if terminal_reason_completes(info.reason) => {
                emit(GenerateEvent::Finished {
                    generation_id,
                    usage: usage_from_done(&info),
                });
            }
            Some(info) => emit(GenerateEvent::Failed {
                generation_id,
                error: format!(
                    "chat response ended with non-complete reason '{}'",
                    info.reason.map(|reason| reason.as_str()).unwrap_or("none")
                ),
            }),
            None => emit(GenerateEvent::Failed {
                generation_id,
                error: "chat stream ended without a done record".to_string(),
            }),
        }
    }

    #[cfg(test)]
    fn with_stream_client_for_tests(
        model_id: &str,
        stream_client: Arc<dyn StreamClient>,
    ) -> Self {
        Self {
            model_id: model_id.to_string(),
            temperature: None,
            stream_client,
        }
    }
}

impl ChatProvider for OllamaProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: OLLAMA_PROVIDER_ID.to_string(),
            model_id: self.model_id.clone(),
        }
    }

    fn generate(
        &self,
        req: GenerateRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(GenerateEvent),
    ) -> Result<(), String> {
        let generation_id = req.generation_id;

        emit(GenerateEvent::Started { generation_id });

        if cancel.load(Ordering::Acquire) {
            emit(GenerateEvent::Cancelled { generation_id });
            return Ok(());
        }

        let request = self.build_chat_request(&req);
        match self.stream_client.stream(&request, &cancel) {
            Ok(result) => {
                self.emit_stream_chunks(generation_id, result.events, emit);
                self.emit_terminal_event(generation_id, result.done, emit);
            }
            Err(OllamaApiError::Cancelled) => emit(GenerateEvent::Cancelled { generation_id }),
            Err(error) => emit(GenerateEvent::Failed {
                generation_id,
                error: format!("chat request failed: {error}"),
            }),
        }

        Ok(())
    }
}

fn terminal_reason_completes(reason: Option<ChatDoneReason>) -> bool {
    // A missing reason on a well-formed done record is treated as a normal
    // stop; `length` means the reply was truncated by the context window
    // but the text up to that point is complete and usable.
    matches!(
        reason,
        None | Some(ChatDoneReason::Stop) | Some(ChatDoneReason::Length)
    )
}

fn usage_from_done(info: &ChatDone) -> Option<TokenUsage> {
    match (info.stats.prompt_eval_count, info.stats.eval_count) {
        (None, None) => None,
        (prompt, completion) => Some(TokenUsage {
            prompt_tokens: prompt.unwrap_or(0),
            completion_tokens: completion.unwrap_or(0),
        }),
    }
}

fn sanitize_model_id(model_id: &str) -> Result<String, ProviderInitError> {
    let trimmed = model_id.trim();
    if trimmed.is_empty() {
        return Err(ProviderInitError::new(
            "Ollama provider requires a non-empty model id",
        ));
    }
    Ok(trimmed.to_string())
}

fn map_init_error(error: OllamaApiError) -> ProviderInitError {
    ProviderInitError::new(format!("failed to initialize Ollama client: {error}"))
}
