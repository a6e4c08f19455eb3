pub mod openai;

pub use openai::{Completion, OpenAIClient};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One conversation message, passed through to the LLM API verbatim.
/// `content` stays a raw value so assistant tool-call messages and `tool`
/// role results survive the round trip untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        ChatMessage {
            role: "system".to_string(),
            content: Some(Value::String(content.to_string())),
            tool_calls: None,
            tool_call_id: None,
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == "system"
    }
}

/// Upstream LLM failure: network error, non-2xx status or malformed
/// response. Aborts the turn before any dispatch; never retried.
#[derive(Debug, Clone, PartialEq)]
pub struct AiError {
    pub message: String,
    pub status: Option<u16>,
}

impl AiError {
    pub fn new(message: impl Into<String>) -> Self {
        AiError { message: message.into(), status: None }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        AiError { message: message.into(), status: Some(status) }
    }
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} (HTTP {})", self.message, status),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for AiError {}
