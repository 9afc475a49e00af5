use serde::Deserialize;

use crate::events::{ChatDone, ChatDoneReason, ChatStreamEvent, EvalStats};

/// Incremental parser for newline-delimited JSON chat streams.
#[derive(Debug, Default)]
pub struct NdjsonStreamParser {
    buffer: String,
}

/// Superset of the fields a stream record may carry. Unknown fields
/// (timings, model echo, context arrays) are ignored by design.
#[derive(Debug, Deserialize)]
struct StreamLine {
    #[serde(default)]
    message: Option<StreamLineMessage>,
    #[serde(default)]
    done: Option<bool>,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u64>,
    #[serde(default)]
    eval_count: Option<u64>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamLineMessage {
    #[serde(default)]
    content: String,
}

impl NdjsonStreamParser {
    /// Feed arbitrary bytes into the parser and drain complete events.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ChatStreamEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        let mut events = Vec::new();

        while let Some(split) = self.buffer.find('\n') {
            let line = self.buffer[..split].to_string();
            self.buffer.drain(0..split + 1);

            if let Some(event) = map_line(&line) {
                events.push(event);
            }
        }

        events
    }

    /// Drain any trailing record left in the buffer after the byte stream ends.
    ///
    /// The host terminates every record with a newline, so leftover bytes
    /// here mean the connection was cut mid-record; the partial line is
    /// surfaced as [`ChatStreamEvent::Malformed`] unless it parses whole.
    pub fn finish(&mut self) -> Option<ChatStreamEvent> {
        let leftover = std::mem::take(&mut self.buffer);
        map_line(&leftover)
    }

    /// Parse a complete stream payload string in one shot.
    pub fn parse_lines(input: &str) -> Vec<ChatStreamEvent> {
        let mut parser = Self::default();
        let mut events = parser.feed(input.as_bytes());
        events.extend(parser.finish());
        events
    }

    pub fn is_empty_buffer(&self) -> bool {
        self.buffer.trim().is_empty()
    }
}

fn map_line(line: &str) -> Option<ChatStreamEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(parsed) = serde_json::from_str::<StreamLine>(trimmed) else {
        return Some(ChatStreamEvent::Malformed {
            line: trimmed.to_string(),
        });
    };

    if let Some(message) = parsed.error {
        return Some(ChatStreamEvent::StreamError { message });
    }

    if parsed.done == Some(true) {
        return Some(ChatStreamEvent::Done(ChatDone {
            reason: parsed.done_reason.as_deref().and_then(ChatDoneReason::parse),
            stats: EvalStats {
                prompt_eval_count: parsed.prompt_eval_count,
                eval_count: parsed.eval_count,
            },
        }));
    }

    if let Some(message) = parsed.message {
        return Some(ChatStreamEvent::MessageDelta {
            content: message.content,
        });
    }

    // A record with neither message, done, nor error carries nothing to
    // act on (e.g. a bare load notification); skip it.
    None
}
