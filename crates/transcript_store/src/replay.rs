use chat_provider::ChatMessage;

use crate::schema::TurnKind;
use crate::store::TranscriptStore;

impl TranscriptStore {
    /// Replays persisted turns in order as provider-facing context messages.
    #[must_use]
    pub fn replay(&self) -> Vec<ChatMessage> {
        self.turns()
            .iter()
            .map(|entry| match &entry.kind {
                TurnKind::SystemText { text } => ChatMessage::system(text.clone()),
                TurnKind::UserText { text } => ChatMessage::user(text.clone()),
                TurnKind::AssistantText { text } => ChatMessage::assistant(text.clone()),
            })
            .collect()
    }
}
