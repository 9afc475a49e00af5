use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::TranscriptStoreError;
use crate::paths::{transcript_file_name, transcript_root};
use crate::schema::{JsonLine, TranscriptHeader, TranscriptTags, TurnEntry, TurnKind};

/// Append-only durable log of conversation turns for one session.
///
/// Each session owns its own file, and every append is a single atomic
/// line write, so independent sessions never interleave records.
pub struct TranscriptStore {
    pub(crate) path: PathBuf,
    pub(crate) file: File,
    pub(crate) header: TranscriptHeader,
    pub(crate) entries: Vec<TurnEntry>,
    pub(crate) index_by_id: HashMap<String, usize>,
}

impl TranscriptStore {
    /// Creates a fresh transcript file under `cwd` and writes its header.
    pub fn create_new(cwd: &Path, tags: TranscriptTags) -> Result<Self, TranscriptStoreError> {
        if !cwd.is_absolute() {
            return Err(TranscriptStoreError::NonAbsoluteCreateDir {
                path: cwd.to_path_buf(),
            });
        }

        let root = transcript_root(cwd);
        std::fs::create_dir_all(&root)
            .map_err(|source| TranscriptStoreError::io("creating transcript root", &root, source))?;

        let session_id = Uuid::new_v4().to_string();
        let created_at = now_rfc3339()?;
        let path = root.join(transcript_file_name(&created_at, &session_id));
        let header = TranscriptHeader::v1(session_id, created_at, tags);

        let mut file = OpenOptions::new()
            .create_new(true)
            .append(true)
            .open(&path)
            .map_err(|source| TranscriptStoreError::io("creating transcript file", &path, source))?;

        let line = serialize_line(&path, &header)?;
        file.write_all(line.as_bytes())
            .map_err(|source| TranscriptStoreError::io("writing transcript header", &path, source))?;
        file.flush()
            .map_err(|source| TranscriptStoreError::io("flushing transcript header", &path, source))?;

        Ok(Self {
            path,
            file,
            header,
            entries: Vec::new(),
            index_by_id: HashMap::new(),
        })
    }

    /// Opens and validates an existing transcript file for append and replay.
    pub fn open(path: &Path) -> Result<Self, TranscriptStoreError> {
        let path = path.to_path_buf();
        let read_file = File::open(&path)
            .map_err(|source| TranscriptStoreError::io("opening transcript file", &path, source))?;
        let reader = BufReader::new(read_file);

        let mut header: Option<TranscriptHeader> = None;
        let mut entries: Vec<TurnEntry> = Vec::new();
        let mut index_by_id = HashMap::new();
        let mut previous_ts: Option<OffsetDateTime> = None;

        for (line_index, line_result) in reader.lines().enumerate() {
            let line_number = line_index + 1;
            let line = line_result
                .map_err(|source| TranscriptStoreError::io_line(&path, line_number, source))?;
            let parsed = parse_json_line(&path, line_number, &line)?;

            if line_number == 1 {
                match parsed {
                    JsonLine::Transcript(parsed_header) => {
                        validate_header_line(&path, line_number, &parsed_header)?;
                        header = Some(parsed_header);
                    }
                    JsonLine::Turn(_) => {
                        return Err(TranscriptStoreError::InvalidHeaderRecord {
                            path,
                            line: line_number,
                        });
                    }
                }

                continue;
            }

            match parsed {
                JsonLine::Transcript(_) => {
                    return Err(TranscriptStoreError::InvalidTurnRecord {
                        path,
                        line: line_number,
                    });
                }
                JsonLine::Turn(entry) => {
                    let ts = validate_rfc3339(&path, line_number, "ts", &entry.ts)?;
                    if index_by_id.contains_key(&entry.id) {
                        return Err(TranscriptStoreError::DuplicateTurnId {
                            path,
                            line: line_number,
                            id: entry.id,
                        });
                    }
                    if previous_ts.is_some_and(|previous| ts < previous) {
                        return Err(TranscriptStoreError::TurnOrderViolation {
                            path,
                            line: line_number,
                            id: entry.id,
                        });
                    }

                    previous_ts = Some(ts);
                    index_by_id.insert(entry.id.clone(), entries.len());
                    entries.push(entry);
                }
            }
        }

        let header =
            header.ok_or_else(|| TranscriptStoreError::MissingHeader { path: path.clone() })?;

        let file = OpenOptions::new()
            .append(true)
            .open(&path)
            .map_err(|source| {
                TranscriptStoreError::io("opening transcript file for append", &path, source)
            })?;

        Ok(Self {
            path,
            file,
            header,
            entries,
            index_by_id,
        })
    }

    /// Appends one immutable turn record as a single line write.
    pub fn append(&mut self, entry: TurnEntry) -> Result<(), TranscriptStoreError> {
        let line_number = self.entries.len() + 2;
        let ts = validate_rfc3339(&self.path, line_number, "ts", &entry.ts)?;

        if self.index_by_id.contains_key(&entry.id) {
            return Err(TranscriptStoreError::DuplicateTurnId {
                path: self.path.clone(),
                line: line_number,
                id: entry.id,
            });
        }

        if let Some(previous) = self.entries.last() {
            let previous_ts = validate_rfc3339(&self.path, line_number, "ts", &previous.ts)?;
            if ts < previous_ts {
                return Err(TranscriptStoreError::TurnOrderViolation {
                    path: self.path.clone(),
                    line: line_number,
                    id: entry.id,
                });
            }
        }

        let line = serialize_line(&self.path, &entry)?;
        self.file
            .write_all(line.as_bytes())
            .map_err(|source| TranscriptStoreError::io("appending turn", &self.path, source))?;
        self.file
            .flush()
            .map_err(|source| TranscriptStoreError::io("flushing turn", &self.path, source))?;

        self.index_by_id.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    /// Builds a turn record stamped with a fresh id and the given timestamp,
    /// then appends it.
    pub fn record(
        &mut self,
        ts: impl Into<String>,
        kind: TurnKind,
    ) -> Result<(), TranscriptStoreError> {
        let entry = TurnEntry::new(Uuid::new_v4().to_string(), ts, kind);
        self.append(entry)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn header(&self) -> &TranscriptHeader {
        &self.header
    }

    #[must_use]
    pub fn turns(&self) -> &[TurnEntry] {
        &self.entries
    }
}

/// Current UTC time formatted as an RFC3339 string.
pub fn now_rfc3339() -> Result<String, TranscriptStoreError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(TranscriptStoreError::ClockFormat)
}

fn serialize_line<T: serde::Serialize>(
    path: &Path,
    record: &T,
) -> Result<String, TranscriptStoreError> {
    let mut line = serde_json::to_string(record)
        .map_err(|source| TranscriptStoreError::json_serialize(path, source))?;
    line.push('\n');
    Ok(line)
}

pub(crate) fn parse_json_line(
    path: &Path,
    line_number: usize,
    line: &str,
) -> Result<JsonLine, TranscriptStoreError> {
    serde_json::from_str::<JsonLine>(line)
        .map_err(|source| TranscriptStoreError::json_line(path, line_number, source))
}

pub(crate) fn validate_header_line(
    path: &Path,
    line_number: usize,
    header: &TranscriptHeader,
) -> Result<(), TranscriptStoreError> {
    if header.version != 1 {
        return Err(TranscriptStoreError::UnsupportedVersion {
            path: path.to_path_buf(),
            line: line_number,
            found: header.version,
        });
    }

    validate_rfc3339(path, line_number, "created_at", &header.created_at)?;
    Ok(())
}

pub(crate) fn validate_rfc3339(
    path: &Path,
    line_number: usize,
    field: &'static str,
    value: &str,
) -> Result<OffsetDateTime, TranscriptStoreError> {
    OffsetDateTime::parse(value, &Rfc3339).map_err(|_| TranscriptStoreError::InvalidTimestamp {
        path: path.to_path_buf(),
        line: line_number,
        field,
        value: value.to_string(),
    })
}
