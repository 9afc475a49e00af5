/// Canonical terminal reason mapped from the stream's final `done` record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatDoneReason {
    Stop,
    Length,
    Load,
    Unload,
}

impl ChatDoneReason {
    pub fn parse(value: &str) -> Option<Self> {
        Some(match value {
            "stop" => Self::Stop,
            "length" => Self::Length,
            "load" => Self::Load,
            "unload" => Self::Unload,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::Length => "length",
            Self::Load => "load",
            Self::Unload => "unload",
        }
    }
}

/// Prompt/completion evaluation counters reported by the final record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EvalStats {
    pub prompt_eval_count: Option<u64>,
    pub eval_count: Option<u64>,
}

/// Terminal summary of one streamed chat response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatDone {
    pub reason: Option<ChatDoneReason>,
    pub stats: EvalStats,
}

/// Stream event emitted by the parser after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatStreamEvent {
    /// Incremental assistant text fragment.
    MessageDelta { content: String },
    /// Final record of the response; no further deltas follow.
    Done(ChatDone),
    /// In-band error record emitted by the host.
    StreamError { message: String },
    /// Line that failed to parse as a stream record, retained verbatim.
    Malformed { line: String },
}
