use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptRecordType {
    Transcript,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRecordType {
    Turn,
}

/// Deployment metadata identifying which scripted conversation a
/// transcript belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTags {
    pub course: String,
    pub week: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<String>,
}

impl TranscriptTags {
    #[must_use]
    pub fn new(course: impl Into<String>, week: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            week: week.into(),
            interaction: None,
        }
    }

    #[must_use]
    pub fn with_interaction(mut self, interaction: impl Into<String>) -> Self {
        self.interaction = Some(interaction.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranscriptHeader {
    #[serde(rename = "type")]
    pub record_type: TranscriptRecordType,
    pub version: u32,
    pub session_id: String,
    pub created_at: String,
    pub course: String,
    pub week: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction: Option<String>,
}

impl TranscriptHeader {
    #[must_use]
    pub fn v1(
        session_id: impl Into<String>,
        created_at: impl Into<String>,
        tags: TranscriptTags,
    ) -> Self {
        Self {
            record_type: TranscriptRecordType::Transcript,
            version: 1,
            session_id: session_id.into(),
            created_at: created_at.into(),
            course: tags.course,
            week: tags.week,
            interaction: tags.interaction,
        }
    }

    #[must_use]
    pub fn tags(&self) -> TranscriptTags {
        TranscriptTags {
            course: self.course.clone(),
            week: self.week.clone(),
            interaction: self.interaction.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEntry {
    #[serde(rename = "type")]
    pub record_type: TurnRecordType,
    pub id: String,
    pub ts: String,
    #[serde(flatten)]
    pub kind: TurnKind,
}

impl TurnEntry {
    #[must_use]
    pub fn new(id: impl Into<String>, ts: impl Into<String>, kind: TurnKind) -> Self {
        Self {
            record_type: TurnRecordType::Turn,
            id: id.into(),
            ts: ts.into(),
            kind,
        }
    }
}

/// Persisted turn payload. Turns are write-once; there is no record kind
/// for edits or deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnKind {
    SystemText { text: String },
    UserText { text: String },
    AssistantText { text: String },
}

impl TurnKind {
    /// Returns the turn text regardless of role.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::SystemText { text } | Self::UserText { text } | Self::AssistantText { text } => {
                text
            }
        }
    }
}

// Untagged: each record's single-variant `type` enum discriminates, and
// the full line (tag included) reaches the inner struct, which keeps the
// flattened `kind` representation intact.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub(crate) enum JsonLine {
    Transcript(TranscriptHeader),
    Turn(TurnEntry),
}
