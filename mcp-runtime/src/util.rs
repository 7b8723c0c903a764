use std::time::Duration;

use serde_json::Value;

const ERROR_BODY_MAX_CHARS: usize = 500;

pub fn client(connect_timeout: Duration, request_timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .user_agent(concat!("casebridge-mcp/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub fn parse_response_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).to_string()))
}

/// Upstream error bodies are echoed to callers; keep them bounded.
pub fn error_body_excerpt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();
    if text.chars().count() <= ERROR_BODY_MAX_CHARS {
        return text.to_string();
    }
    let mut excerpt: String = text.chars().take(ERROR_BODY_MAX_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

pub fn to_pretty_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}
