use std::sync::Arc;

use chat_provider::{
    CancelSignal, ChatProvider, GenerateEvent, GenerateRequest, GenerationId, TokenUsage,
};
use thiserror::Error;
use tracing::{debug, warn};
use transcript_store::{now_rfc3339, TranscriptStore, TurnKind};

use crate::app::{Chat, Role, Turn};
use crate::course_materials::CourseResource;

/// UI boundary for one in-flight reply: a pending indicator followed by a
/// live-updating text region.
pub trait ReplyView {
    /// Called once per submission, before any text exists.
    fn reply_pending(&mut self);
    /// Called per chunk; the first call replaces the pending indicator.
    fn reply_chunk(&mut self, text: &str);
    fn reply_complete(&mut self);
    fn reply_failed(&mut self, error: &str);
}

#[derive(Debug, Error)]
pub enum TurnError {
    #[error("a reply is already being generated")]
    Busy,
    #[error("nothing to send")]
    EmptyInput,
    #[error("generation failed: {0}")]
    Generation(String),
    #[error("clock error: {0}")]
    Clock(String),
}

/// Orchestrates turn-taking for one session: accepts input, drives the
/// generation stream, and persists each completed turn exactly once.
///
/// The transcript store is optional; a missing or failing store degrades to
/// an in-memory-only conversation and is reported through the log.
pub struct ConversationController {
    chat: Chat,
    provider: Arc<dyn ChatProvider>,
    store: Option<TranscriptStore>,
    temperature: Option<f64>,
    next_generation_id: GenerationId,
}

impl ConversationController {
    /// Starts a fresh conversation seeded from the course script and
    /// persists the seeded system and opening turns.
    pub fn new(
        provider: Arc<dyn ChatProvider>,
        store: Option<TranscriptStore>,
        session_id: impl Into<String>,
        system_prompt: impl Into<String>,
        opening_message: impl Into<String>,
        temperature: Option<f64>,
    ) -> Result<Self, TurnError> {
        let ts = now()?;
        let chat = Chat::new(session_id, system_prompt, opening_message, &ts);

        let mut controller = Self {
            chat,
            provider,
            store,
            temperature,
            next_generation_id: 1,
        };
        controller.persist_turn(
            TurnKind::SystemText {
                text: controller.chat.system_prompt().to_string(),
            },
            &ts,
        );
        controller.persist_turn(
            TurnKind::AssistantText {
                text: controller.chat.opening_message().to_string(),
            },
            &ts,
        );

        Ok(controller)
    }

    /// Continues a persisted conversation by replaying its transcript into
    /// session state. Nothing is re-persisted.
    pub fn resume(
        provider: Arc<dyn ChatProvider>,
        store: TranscriptStore,
        system_prompt: impl Into<String>,
        opening_message: impl Into<String>,
        temperature: Option<f64>,
    ) -> Self {
        let session_id = store.header().session_id.clone();
        let turns = store
            .turns()
            .iter()
            .map(|entry| Turn {
                role: match entry.kind {
                    TurnKind::SystemText { .. } => Role::System,
                    TurnKind::UserText { .. } => Role::User,
                    TurnKind::AssistantText { .. } => Role::Assistant,
                },
                content: entry.kind.text().to_string(),
                ts: entry.ts.clone(),
            })
            .collect();

        Self {
            chat: Chat::resume(session_id, turns, system_prompt, opening_message),
            provider,
            store: Some(store),
            temperature,
            next_generation_id: 1,
        }
    }

    #[must_use]
    pub fn chat(&self) -> &Chat {
        &self.chat
    }

    #[must_use]
    pub fn provider_profile(&self) -> chat_provider::ProviderProfile {
        self.provider.profile()
    }

    /// Runs one full turn: commit + persist the user turn, stream the reply
    /// through `view`, then commit + persist the assistant turn.
    ///
    /// On generation failure no assistant turn is committed or persisted and
    /// the controller is immediately ready for a retry.
    pub fn submit(&mut self, text: &str, view: &mut dyn ReplyView) -> Result<String, TurnError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TurnError::EmptyInput);
        }

        let generation_id = self.next_generation_id;
        self.next_generation_id += 1;

        let ts = now()?;
        let messages = self
            .chat
            .begin_user_turn(text, &ts, generation_id)
            .map_err(|_| TurnError::Busy)?;
        self.persist_turn(
            TurnKind::UserText {
                text: text.to_string(),
            },
            &ts,
        );

        view.reply_pending();

        let request = GenerateRequest {
            generation_id,
            messages,
            temperature: self.temperature,
        };
        let cancel = CancelSignal::default();
        let provider = Arc::clone(&self.provider);

        let mut terminal: Option<GenerateEvent> = None;
        let chat = &mut self.chat;
        let run = provider.generate(request, cancel, &mut |event| match event {
            GenerateEvent::Started { generation_id } => chat.on_reply_started(generation_id),
            GenerateEvent::Chunk {
                generation_id,
                text,
            } => {
                chat.on_reply_chunk(generation_id, &text);
                view.reply_chunk(&text);
            }
            terminal_event => {
                // Terminal events are applied after the provider returns so
                // commit and persistence happen in one place.
                terminal = Some(terminal_event);
            }
        });

        if let Err(error) = run {
            if terminal.is_none() {
                terminal = Some(GenerateEvent::Failed {
                    generation_id,
                    error,
                });
            }
        }

        match terminal {
            Some(GenerateEvent::Finished { usage, .. }) => {
                let ts = now()?;
                match self.chat.on_reply_finished(generation_id, &ts) {
                    Some(turn) => {
                        self.persist_turn(
                            TurnKind::AssistantText {
                                text: turn.content.clone(),
                            },
                            &turn.ts,
                        );
                        log_usage(&self.chat.session().id, usage);
                        view.reply_complete();
                        Ok(turn.content)
                    }
                    None => {
                        debug!(session = %self.chat.session().id, "reply stream finished without text");
                        view.reply_complete();
                        Ok(String::new())
                    }
                }
            }
            Some(GenerateEvent::Failed { error, .. }) => {
                self.chat.on_reply_failed(generation_id, &error);
                view.reply_failed(&error);
                Err(TurnError::Generation(error))
            }
            Some(GenerateEvent::Cancelled { .. }) => {
                self.chat.on_reply_cancelled(generation_id);
                let error = "generation was cancelled".to_string();
                view.reply_failed(&error);
                Err(TurnError::Generation(error))
            }
            Some(_) | None => {
                let error = "provider exited without a terminal event".to_string();
                self.chat.on_reply_failed(generation_id, &error);
                view.reply_failed(&error);
                Err(TurnError::Generation(error))
            }
        }
    }

    /// Restarts the scripted conversation and persists the fresh seed turns.
    pub fn restart(&mut self) -> Result<(), TurnError> {
        let ts = now()?;
        self.chat.restart(&ts);
        self.persist_turn(
            TurnKind::SystemText {
                text: self.chat.system_prompt().to_string(),
            },
            &ts,
        );
        self.persist_turn(
            TurnKind::AssistantText {
                text: self.chat.opening_message().to_string(),
            },
            &ts,
        );
        Ok(())
    }

    /// Shows instructor material in the history view without sending it to
    /// the model or the transcript.
    pub fn show_resource(&mut self, resource: &CourseResource) {
        self.chat
            .push_notice(format!("{}:\n{}", resource.name(), resource.invoke()));
    }

    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.chat.push_notice(text);
    }

    pub fn quit(&mut self) {
        self.chat.on_quit();
    }

    fn persist_turn(&mut self, kind: TurnKind, ts: &str) {
        let Some(store) = self.store.as_mut() else {
            return;
        };

        if let Err(error) = store.record(ts, kind) {
            warn!(
                session = %self.chat.session().id,
                %error,
                "transcript append failed; turn kept in session state only"
            );
        }
    }
}

fn now() -> Result<String, TurnError> {
    now_rfc3339().map_err(|error| TurnError::Clock(error.to_string()))
}

fn log_usage(session_id: &str, usage: Option<TokenUsage>) {
    let Some(usage) = usage else {
        return;
    };

    debug!(
        session = %session_id,
        prompt_tokens = usage.prompt_tokens,
        completion_tokens = usage.completion_tokens,
        "reply token usage"
    );
}
