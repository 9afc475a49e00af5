//! Transport-only Ollama chat API client primitives.
//!
//! This crate owns request/response building and parsing behavior for an
//! Ollama-style `/api/chat` streaming endpoint only. It intentionally
//! contains no conversation state and no session/UI coupling.
//!
//! Stream normalization maps newline-delimited JSON records into
//! [`ChatStreamEvent`]s, preserving malformed lines for explicit
//! caller-side failure handling.

pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod ndjson;
pub mod payload;
pub mod url;

pub use client::OllamaApiClient;
pub use client::StreamResult;
pub use config::OllamaApiConfig;
pub use error::OllamaApiError;
pub use events::{ChatDone, ChatDoneReason, ChatStreamEvent, EvalStats};
pub use ndjson::NdjsonStreamParser;
pub use payload::{ChatOptions, ChatRequest, WireChatMessage};
pub use url::normalize_chat_url;
