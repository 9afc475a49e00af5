/// Default base URL for a locally hosted Ollama endpoint.
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434";

/// Normalize a base URL to an Ollama chat endpoint.
///
/// Normalization rules:
/// 1) keep `/api/chat` unchanged
/// 2) append `/chat` when path ends in `/api`
/// 3) append `/api/chat` otherwise
pub fn normalize_chat_url(input: &str) -> String {
    let base = if input.trim().is_empty() {
        DEFAULT_OLLAMA_BASE_URL
    } else {
        input.trim()
    };

    let trimmed = base.trim_end_matches('/');
    if trimmed.ends_with("/api/chat") {
        return trimmed.to_string();
    }
    if trimmed.ends_with("/api") {
        return format!("{trimmed}/chat");
    }
    format!("{trimmed}/api/chat")
}
