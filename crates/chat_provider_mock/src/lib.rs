//! Deterministic mock implementation of the shared `chat_provider` contract.
//!
//! This crate contains no transport/protocol logic and is intended for local
//! development and contract-level integration testing, including scripted
//! mid-stream failures.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use chat_provider::{
    CancelSignal, ChatProvider, GenerateEvent, GenerateRequest, ProviderProfile, TokenUsage,
};

/// Stable provider identifier used for explicit startup selection.
pub const MOCK_PROVIDER_ID: &str = "mock";

/// Scripted failure injected after a configured number of emitted chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedFailure {
    /// Number of chunk events to emit before failing. Zero fails before
    /// any text is produced.
    pub after_chunks: usize,
    pub error: String,
}

/// Deterministic mock provider used by `sigma` tests and local runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockProvider {
    chunks: Vec<String>,
    model_id: String,
    failure: Option<ScriptedFailure>,
}

impl MockProvider {
    /// Creates a mock provider that streams the caller-provided chunks.
    #[must_use]
    pub fn new(chunks: Vec<String>) -> Self {
        Self {
            chunks,
            model_id: "mock".to_string(),
            failure: None,
        }
    }

    /// Creates a mock provider with an explicit model identifier.
    #[must_use]
    pub fn with_model_id(chunks: Vec<String>, model_id: impl Into<String>) -> Self {
        Self {
            model_id: sanitize_model_id(model_id.into()),
            ..Self::new(chunks)
        }
    }

    /// Creates a mock provider that fails after emitting `after_chunks` chunks.
    #[must_use]
    pub fn failing_after(chunks: Vec<String>, after_chunks: usize, error: impl Into<String>) -> Self {
        Self {
            failure: Some(ScriptedFailure {
                after_chunks,
                error: error.into(),
            }),
            ..Self::new(chunks)
        }
    }

    const CALL_DELAY_MS: u64 = 20;
    const TOKEN_DELAY_MS: u64 = 5;
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(vec![
            "That's a thoughtful start. ".to_string(),
            "Before we move on, tell me a little more: ".to_string(),
            "what specifically about this week's material ".to_string(),
            "made you choose that goal, ".to_string(),
            "and how will you know you have reached it?\n".to_string(),
        ])
    }
}

impl ChatProvider for MockProvider {
    fn profile(&self) -> ProviderProfile {
        ProviderProfile {
            provider_id: MOCK_PROVIDER_ID.to_string(),
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
        let _ = req.messages;
        let _ = req.temperature;

        emit(GenerateEvent::Started { generation_id });
        thread::sleep(Duration::from_millis(Self::CALL_DELAY_MS));

        if cancel.load(Ordering::SeqCst) {
            emit(GenerateEvent::Cancelled { generation_id });
            return Ok(());
        }

        let mut emitted_chunks = 0usize;
        let mut completion_tokens = 0u64;

        for chunk in &self.chunks {
            if cancel.load(Ordering::SeqCst) {
                emit(GenerateEvent::Cancelled { generation_id });
                return Ok(());
            }

            if self.should_fail_now(emitted_chunks, generation_id, emit) {
                return Ok(());
            }

            let mut pending_token = String::new();
            for ch in chunk.chars() {
                pending_token.push(ch);

                if matches!(ch, ' ' | '\n') {
                    emit(GenerateEvent::Chunk {
                        generation_id,
                        text: std::mem::take(&mut pending_token),
                    });
                    emitted_chunks += 1;
                    completion_tokens += 1;
                    thread::sleep(Duration::from_millis(Self::TOKEN_DELAY_MS));

                    if self.should_fail_now(emitted_chunks, generation_id, emit) {
                        return Ok(());
                    }
                }
            }

            if !pending_token.is_empty() {
                if cancel.load(Ordering::SeqCst) {
                    emit(GenerateEvent::Cancelled { generation_id });
                    return Ok(());
                }

                emit(GenerateEvent::Chunk {
                    generation_id,
                    text: pending_token,
                });
                emitted_chunks += 1;
                completion_tokens += 1;
                thread::sleep(Duration::from_millis(Self::TOKEN_DELAY_MS));

                if self.should_fail_now(emitted_chunks, generation_id, emit) {
                    return Ok(());
                }
            }
        }

        if let Some(failure) = &self.failure {
            // A scripted failure set past the last chunk still fails the call.
            emit(GenerateEvent::Failed {
                generation_id,
                error: failure.error.clone(),
            });
            return Ok(());
        }

        if cancel.load(Ordering::SeqCst) {
            emit(GenerateEvent::Cancelled { generation_id });
        } else {
            emit(GenerateEvent::Finished {
                generation_id,
                usage: Some(TokenUsage {
                    prompt_tokens: req_prompt_tokens(&req),
                    completion_tokens,
                }),
            });
        }

        Ok(())
    }
}

impl MockProvider {
    fn should_fail_now(
        &self,
        emitted_chunks: usize,
        generation_id: u64,
        emit: &mut dyn FnMut(GenerateEvent),
    ) -> bool {
        let Some(failure) = &self.failure else {
            return false;
        };

        if emitted_chunks < failure.after_chunks {
            return false;
        }

        emit(GenerateEvent::Failed {
            generation_id,
            error: failure.error.clone(),
        });
        true
    }
}

fn req_prompt_tokens(req: &GenerateRequest) -> u64 {
    req.messages
        .iter()
        .map(|message| message.text().split_whitespace().count() as u64)
        .sum()
}

fn sanitize_model_id(model_id: String) -> String {
    let trimmed = model_id.trim();
    if trimmed.is_empty() {
        "mock".to_string()
    } else {
        trimmed.to_string()
    }
}
