use chat_provider::{ChatMessage, GenerationId};

/// Conversation role for a committed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One committed message in a session. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    pub ts: String,
}

/// One user's active conversation: an opaque id plus the ordered turn list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub turns: Vec<Turn>,
}

impl Session {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            turns: Vec::new(),
        }
    }
}

/// Turn-taking state. A failed reply surfaces its error and lands back in
/// `Idle`, so retrying needs no acknowledgement step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Awaiting { generation_id: GenerationId },
    Exiting,
}

/// Rendered history item. `streaming` marks the live-updating reply region;
/// a streaming message with empty content is the pending indicator state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayMessage {
    pub role: Role,
    pub content: String,
    pub streaming: bool,
    pub generation_id: Option<GenerationId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingReply {
    generation_id: GenerationId,
    text: String,
}

/// Rejection returned when input arrives while a reply is being generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyInFlight;

/// Conversation state machine: owns the session turn list, the rendered
/// history, and the in-flight reply accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chat {
    pub mode: Mode,
    session: Session,
    view: Vec<DisplayMessage>,
    pending_reply: Option<PendingReply>,
    system_prompt: String,
    opening_message: String,
    last_error: Option<String>,
}

impl Chat {
    /// Creates a session seeded with the course script: a hidden system turn
    /// and the visible opening mentor message.
    pub fn new(
        session_id: impl Into<String>,
        system_prompt: impl Into<String>,
        opening_message: impl Into<String>,
        ts: &str,
    ) -> Self {
        let system_prompt = system_prompt.into();
        let opening_message = opening_message.into();

        let mut chat = Self {
            mode: Mode::Idle,
            session: Session::new(session_id),
            view: Vec::new(),
            pending_reply: None,
            system_prompt,
            opening_message,
            last_error: None,
        };
        chat.seed(ts);
        chat
    }

    /// Rebuilds a session from previously committed turns.
    pub fn resume(
        session_id: impl Into<String>,
        turns: Vec<Turn>,
        system_prompt: impl Into<String>,
        opening_message: impl Into<String>,
    ) -> Self {
        let view = turns
            .iter()
            .filter(|turn| turn.role != Role::System)
            .map(|turn| DisplayMessage {
                role: turn.role,
                content: turn.content.clone(),
                streaming: false,
                generation_id: None,
            })
            .collect();

        Self {
            mode: Mode::Idle,
            session: Session {
                id: session_id.into(),
                turns,
            },
            view,
            pending_reply: None,
            system_prompt: system_prompt.into(),
            opening_message: opening_message.into(),
            last_error: None,
        }
    }

    fn seed(&mut self, ts: &str) {
        self.session.turns.push(Turn {
            role: Role::System,
            content: self.system_prompt.clone(),
            ts: ts.to_string(),
        });
        self.session.turns.push(Turn {
            role: Role::Assistant,
            content: self.opening_message.clone(),
            ts: ts.to_string(),
        });
        self.view.push(DisplayMessage {
            role: Role::Assistant,
            content: self.opening_message.clone(),
            streaming: false,
            generation_id: None,
        });
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Returns rendered history: everything except the system prompt.
    #[must_use]
    pub fn view(&self) -> &[DisplayMessage] {
        &self.view
    }

    #[must_use]
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    #[must_use]
    pub fn opening_message(&self) -> &str {
        &self.opening_message
    }

    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Returns the full ordered conversation as provider-facing messages.
    #[must_use]
    pub fn context_messages(&self) -> Vec<ChatMessage> {
        self.session
            .turns
            .iter()
            .map(|turn| match turn.role {
                Role::System => ChatMessage::system(turn.content.clone()),
                Role::User => ChatMessage::user(turn.content.clone()),
                Role::Assistant => ChatMessage::assistant(turn.content.clone()),
            })
            .collect()
    }

    /// Commits a user turn and enters `Awaiting`, returning the generation
    /// context. Valid only in `Idle`; a reply in flight rejects new input.
    pub fn begin_user_turn(
        &mut self,
        text: &str,
        ts: &str,
        generation_id: GenerationId,
    ) -> Result<Vec<ChatMessage>, ReplyInFlight> {
        if !matches!(self.mode, Mode::Idle) {
            return Err(ReplyInFlight);
        }

        self.last_error = None;
        self.session.turns.push(Turn {
            role: Role::User,
            content: text.to_string(),
            ts: ts.to_string(),
        });
        self.view.push(DisplayMessage {
            role: Role::User,
            content: text.to_string(),
            streaming: false,
            generation_id: None,
        });
        self.mode = Mode::Awaiting { generation_id };

        Ok(self.context_messages())
    }

    /// Appends a notice to the rendered history without touching session state.
    pub fn push_notice(&mut self, content: impl Into<String>) {
        self.view.push(DisplayMessage {
            role: Role::System,
            content: content.into(),
            streaming: false,
            generation_id: None,
        });
    }

    /// Drops the conversation back to its seeded opening state.
    ///
    /// The transcript log keeps everything already persisted; only the
    /// in-memory session restarts.
    pub fn restart(&mut self, ts: &str) {
        self.session.turns.clear();
        self.view.clear();
        self.pending_reply = None;
        self.last_error = None;
        self.mode = Mode::Idle;
        self.seed(ts);
    }

    pub fn on_quit(&mut self) {
        self.mode = Mode::Exiting;
    }

    #[must_use]
    pub fn should_exit(&self) -> bool {
        matches!(self.mode, Mode::Exiting)
    }

    pub fn on_reply_started(&mut self, generation_id: GenerationId) {
        if !self.is_awaiting(generation_id) || self.has_reply_region(generation_id) {
            return;
        }

        self.view.push(DisplayMessage {
            role: Role::Assistant,
            content: String::new(),
            streaming: true,
            generation_id: Some(generation_id),
        });
    }

    pub fn on_reply_chunk(&mut self, generation_id: GenerationId, chunk: &str) {
        if !self.is_awaiting(generation_id) {
            return;
        }

        if let Some(message) = self
            .view
            .iter_mut()
            .rev()
            .find(|message| {
                message.role == Role::Assistant && message.generation_id == Some(generation_id)
            })
        {
            message.content.push_str(chunk);
        } else {
            self.view.push(DisplayMessage {
                role: Role::Assistant,
                content: chunk.to_string(),
                streaming: true,
                generation_id: Some(generation_id),
            });
        }

        self.append_pending_chunk(generation_id, chunk);
    }

    /// Commits the accumulated reply as an assistant turn and returns it.
    ///
    /// Returns `None` when the stream finished without producing text; no
    /// turn is appended in that case.
    pub fn on_reply_finished(&mut self, generation_id: GenerationId, ts: &str) -> Option<Turn> {
        if !self.is_awaiting(generation_id) {
            return None;
        }

        self.finalize_reply_region(generation_id);
        self.mode = Mode::Idle;

        let pending = self.take_pending(generation_id)?;
        if pending.text.is_empty() {
            return None;
        }

        let turn = Turn {
            role: Role::Assistant,
            content: pending.text,
            ts: ts.to_string(),
        };
        self.session.turns.push(turn.clone());
        Some(turn)
    }

    /// Aborts the in-flight reply: partial text stays rendered, nothing is
    /// committed to the session, and the error lands in the history view.
    pub fn on_reply_failed(&mut self, generation_id: GenerationId, error: &str) {
        if !self.is_awaiting(generation_id) {
            return;
        }

        self.finalize_reply_region(generation_id);
        self.take_pending(generation_id);
        self.last_error = Some(error.to_string());
        self.push_notice(format!("Reply failed: {error}"));
        self.mode = Mode::Idle;
    }

    pub fn on_reply_cancelled(&mut self, generation_id: GenerationId) {
        if !self.is_awaiting(generation_id) {
            return;
        }

        self.finalize_reply_region(generation_id);
        self.take_pending(generation_id);
        self.mode = Mode::Idle;
    }

    fn append_pending_chunk(&mut self, generation_id: GenerationId, chunk: &str) {
        if chunk.is_empty() {
            return;
        }

        let pending = self.pending_reply.get_or_insert_with(|| PendingReply {
            generation_id,
            text: String::new(),
        });
        assert_eq!(
            pending.generation_id, generation_id,
            "pending reply belongs to generation {}, cannot append chunk for generation {generation_id}",
            pending.generation_id
        );

        pending.text.push_str(chunk);
    }

    fn take_pending(&mut self, generation_id: GenerationId) -> Option<PendingReply> {
        let pending = self.pending_reply.take()?;
        assert_eq!(
            pending.generation_id, generation_id,
            "pending reply belongs to generation {}, cannot resolve generation {generation_id}",
            pending.generation_id
        );
        Some(pending)
    }

    fn finalize_reply_region(&mut self, generation_id: GenerationId) {
        for message in &mut self.view {
            if message.generation_id == Some(generation_id) {
                message.streaming = false;
            }
        }
    }

    fn is_awaiting(&self, generation_id: GenerationId) -> bool {
        matches!(self.mode, Mode::Awaiting { generation_id: active } if active == generation_id)
    }

    fn has_reply_region(&self, generation_id: GenerationId) -> bool {
        self.view
            .iter()
            .any(|message| message.generation_id == Some(generation_id))
    }
}
