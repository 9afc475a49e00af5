use ollama_api::normalize_chat_url;
use ollama_api::url::DEFAULT_OLLAMA_BASE_URL;

#[test]
fn empty_input_falls_back_to_default_host() {
    assert_eq!(
        normalize_chat_url(""),
        format!("{DEFAULT_OLLAMA_BASE_URL}/api/chat")
    );
    assert_eq!(
        normalize_chat_url("   "),
        format!("{DEFAULT_OLLAMA_BASE_URL}/api/chat")
    );
}

#[test]
fn bare_host_gets_full_chat_path() {
    assert_eq!(
        normalize_chat_url("http://gpu07.cyverse.org:11444"),
        "http://gpu07.cyverse.org:11444/api/chat"
    );
    assert_eq!(
        normalize_chat_url("http://gpu07.cyverse.org:11444/"),
        "http://gpu07.cyverse.org:11444/api/chat"
    );
}

#[test]
fn api_suffix_gets_chat_segment() {
    assert_eq!(
        normalize_chat_url("http://localhost:11434/api"),
        "http://localhost:11434/api/chat"
    );
}

#[test]
fn full_chat_path_is_preserved() {
    assert_eq!(
        normalize_chat_url("http://localhost:11434/api/chat"),
        "http://localhost:11434/api/chat"
    );
    assert_eq!(
        normalize_chat_url("http://localhost:11434/api/chat/"),
        "http://localhost:11434/api/chat"
    );
}
