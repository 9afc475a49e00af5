mod error;
mod paths;
mod replay;
mod schema;
mod store;

pub use error::TranscriptStoreError;
pub use paths::{transcript_file_name, transcript_root};
pub use schema::{
    TranscriptHeader, TranscriptRecordType, TranscriptTags, TurnEntry, TurnKind, TurnRecordType,
};
pub use store::{now_rfc3339, TranscriptStore};
