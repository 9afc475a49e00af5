//! Minimal provider-agnostic contract for executing a single generation call.
//!
//! This crate intentionally defines only the shared generation lifecycle
//! types. It excludes provider transport details, protocol payloads, and
//! conversation/session orchestration concerns.

use std::fmt;
use std::sync::{atomic::AtomicBool, Arc};

/// Identifier for one generation call.
pub type GenerationId = u64;

/// Shared cancellation flag for a generation call.
pub type CancelSignal = Arc<AtomicBool>;

/// Error returned while constructing/configuring a provider before any call starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderInitError {
    message: String,
}

impl ProviderInitError {
    /// Creates a new provider initialization error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the underlying error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ProviderInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProviderInitError {}

impl From<String> for ProviderInitError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ProviderInitError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Provider-neutral model-facing conversation history item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    System { text: String },
    User { text: String },
    Assistant { text: String },
}

impl ChatMessage {
    #[must_use]
    pub fn system(text: impl Into<String>) -> Self {
        Self::System { text: text.into() }
    }

    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant { text: text.into() }
    }

    /// Returns the wire-level role name for this message.
    #[must_use]
    pub fn role(&self) -> &'static str {
        match self {
            Self::System { .. } => "system",
            Self::User { .. } => "user",
            Self::Assistant { .. } => "assistant",
        }
    }

    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::System { text } | Self::User { text } | Self::Assistant { text } => text,
        }
    }
}

/// Input required to start a generation call.
///
/// `messages` carries the full ordered conversation history; callers never
/// prune or summarize it before dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub generation_id: GenerationId,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f64>,
}

/// Prompt/completion token counters reported by a provider when available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Provider-emitted lifecycle event for a generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerateEvent {
    Started {
        generation_id: GenerationId,
    },
    Chunk {
        generation_id: GenerationId,
        text: String,
    },
    Finished {
        generation_id: GenerationId,
        usage: Option<TokenUsage>,
    },
    Failed {
        generation_id: GenerationId,
        error: String,
    },
    Cancelled {
        generation_id: GenerationId,
    },
}

impl GenerateEvent {
    /// Returns the generation identifier associated with this event.
    #[must_use]
    pub fn generation_id(&self) -> GenerationId {
        match self {
            Self::Started { generation_id }
            | Self::Chunk { generation_id, .. }
            | Self::Finished { generation_id, .. }
            | Self::Failed { generation_id, .. }
            | Self::Cancelled { generation_id } => *generation_id,
        }
    }

    /// Returns true when this event terminates the generation lifecycle.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Finished { .. } | Self::Failed { .. } | Self::Cancelled { .. }
        )
    }
}

/// Immutable metadata describing a generation provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderProfile {
    pub provider_id: String,
    pub model_id: String,
}

/// Provider interface for executing one generation request.
pub trait ChatProvider: Send + Sync + 'static {
    /// Returns provider/model identity metadata.
    fn profile(&self) -> ProviderProfile;

    /// Executes a generation request and emits lifecycle events in provider order.
    ///
    /// Chunks must be emitted in upstream order, and exactly one terminal
    /// event must follow them. Consumption is strictly sequential from the
    /// caller perspective.
    fn generate(
        &self,
        req: GenerateRequest,
        cancel: CancelSignal,
        emit: &mut dyn FnMut(GenerateEvent),
    ) -> Result<(), String>;
}

#[cfg(test)]
mod tests {
    use super::{
        CancelSignal, ChatMessage, ChatProvider, GenerateEvent, GenerateRequest, ProviderInitError,
        ProviderProfile, TokenUsage,
    };

    struct MinimalProvider;

    impl ChatProvider for MinimalProvider {
        fn profile(&self) -> ProviderProfile {
            ProviderProfile {
                provider_id: "minimal".to_string(),
                model_id: "minimal-model".to_string(),
            }
        }

        fn generate(
            &self,
            req: GenerateRequest,
            _cancel: CancelSignal,
            emit: &mut dyn FnMut(GenerateEvent),
        ) -> Result<(), String> {
            emit(GenerateEvent::Started {
                generation_id: req.generation_id,
            });
            emit(GenerateEvent::Finished {
                generation_id: req.generation_id,
                usage: None,
            });
            Ok(())
        }
    }

    #[test]
    fn generate_event_generation_id_returns_event_generation_id() {
        let generation_id = 42;
        let events = [
            GenerateEvent::Started { generation_id },
            GenerateEvent::Chunk {
                generation_id,
                text: "partial".to_string(),
            },
            GenerateEvent::Finished {
                generation_id,
                usage: Some(TokenUsage {
                    prompt_tokens: 12,
                    completion_tokens: 3,
                }),
            },
            GenerateEvent::Failed {
                generation_id,
                error: "failure".to_string(),
            },
            GenerateEvent::Cancelled { generation_id },
        ];

        for event in events {
            assert_eq!(event.generation_id(), generation_id);
        }
    }

    #[test]
    fn generate_event_terminal_detection_matches_lifecycle() {
        assert!(!GenerateEvent::Started { generation_id: 1 }.is_terminal());
        assert!(!GenerateEvent::Chunk {
            generation_id: 1,
            text: "hello".to_string(),
        }
        .is_terminal());
        assert!(GenerateEvent::Finished {
            generation_id: 1,
            usage: None,
        }
        .is_terminal());
        assert!(GenerateEvent::Failed {
            generation_id: 1,
            error: "boom".to_string(),
        }
        .is_terminal());
        assert!(GenerateEvent::Cancelled { generation_id: 1 }.is_terminal());
    }

    #[test]
    fn provider_init_error_preserves_message() {
        let error = ProviderInitError::new("missing host");
        assert_eq!(error.message(), "missing host");
        assert_eq!(error.to_string(), "missing host");
    }

    #[test]
    fn generate_request_carries_ordered_history_and_sampling() {
        let request = GenerateRequest {
            generation_id: 7,
            messages: vec![
                ChatMessage::system("stay on task"),
                ChatMessage::user("I learned about gravity"),
            ],
            temperature: Some(0.2),
        };

        assert_eq!(request.generation_id, 7);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role(), "system");
        assert_eq!(request.messages[1].text(), "I learned about gravity");
        assert_eq!(request.temperature, Some(0.2));
    }

    #[test]
    fn minimal_provider_emits_started_then_terminal() {
        let provider = MinimalProvider;
        let mut events = Vec::new();
        provider
            .generate(
                GenerateRequest {
                    generation_id: 7,
                    messages: vec![ChatMessage::user("hello")],
                    temperature: None,
                },
                CancelSignal::default(),
                &mut |event| events.push(event),
            )
            .expect("minimal generate should succeed");

        assert!(matches!(
            events.first(),
            Some(GenerateEvent::Started { generation_id: 7 })
        ));
        assert!(events.last().is_some_and(GenerateEvent::is_terminal));
    }
}
