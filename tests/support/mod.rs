use sigma::controller::ReplyView;

/// Recorded UI-boundary event for assertions on render ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    Pending,
    Chunk(String),
    Complete,
    Failed(String),
}

/// `ReplyView` spy that records the live-region protocol.
#[derive(Debug, Default)]
pub struct RecordingView {
    pub events: Vec<ViewEvent>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenation of every streamed chunk, in arrival order.
    pub fn streamed_text(&self) -> String {
        self.events
            .iter()
            .filter_map(|event| match event {
                ViewEvent::Chunk(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl ReplyView for RecordingView {
    fn reply_pending(&mut self) {
        self.events.push(ViewEvent::Pending);
    }

    fn reply_chunk(&mut self, text: &str) {
        self.events.push(ViewEvent::Chunk(text.to_string()));
    }

    fn reply_complete(&mut self) {
        self.events.push(ViewEvent::Complete);
    }

    fn reply_failed(&mut self, error: &str) {
        self.events.push(ViewEvent::Failed(error.to_string()));
    }
}
