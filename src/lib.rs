//! Scripted self-reflection mentor runtime.
//!
//! ## Provider bootstrap
//!
//! `sigma` requires explicit provider selection:
//!
//! - `SIGMA_PROVIDER=mock` for deterministic local runs and tests
//! - `SIGMA_PROVIDER=ollama` for an Ollama chat endpoint
//!
//! When `SIGMA_PROVIDER=ollama`, the endpoint is taken from
//! `SIGMA_OLLAMA_HOST` (default `http://127.0.0.1:11434`), the model from
//! `SIGMA_MODEL` (default `mixtral`), sampling temperature from
//! `SIGMA_TEMPERATURE`, and the request timeout from `SIGMA_TIMEOUT_SEC`.
//!
//! ## Conversation contract
//!
//! The controller owns one session per process: an ordered, immutable turn
//! list seeded from a per-course prompt script selected by `SIGMA_COURSE`
//! and `SIGMA_WEEK`. Every generation call receives the full ordered
//! history; nothing is pruned or summarized.
//!
//! Completed turns are appended to a per-session JSONL transcript under
//! `.sigma/transcripts/`. Transcript appends are exactly-once per completed
//! turn and never block the conversation: a failed append is logged and the
//! turn stays visible in session state. Set `SIGMA_RESUME_TRANSCRIPT` to a
//! transcript path to replay it and continue that conversation.

pub mod app;
pub mod commands;
pub mod config;
pub mod controller;
pub mod course_materials;
pub mod prompts;
pub mod providers;
