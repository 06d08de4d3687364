use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        };
        f.write_str(name)
    }
}

/// Distinguishes conversational entries from local notices.
///
/// Notices are shown to the user but never sent to the query service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageKind {
    #[default]
    Chat,
    Error,
}

/// Client-assigned position token, unique within one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MessageId(u64);

impl MessageId {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub kind: MessageKind,
}

impl Message {
    #[must_use]
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            kind: MessageKind::Chat,
        }
    }

    #[must_use]
    pub fn assistant(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
            kind: MessageKind::Chat,
        }
    }

    #[must_use]
    pub fn error_notice(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::System,
            content: content.into(),
            kind: MessageKind::Error,
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }

    #[must_use]
    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// A message as it appears in request and response bodies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub messages: Vec<WireMessage>,
}

impl QueryRequest {
    #[must_use]
    pub const fn new(messages: Vec<WireMessage>) -> Self {
        Self { messages }
    }

    #[must_use]
    pub fn last_user_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

/// Single-shot response body. Any server-side `id` is ignored; ids are
/// always assigned by the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub response: WireMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseMode {
    #[default]
    Streaming,
    SingleShot,
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Streaming => f.write_str("streaming"),
            Self::SingleShot => f.write_str("single-shot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = QueryRequest::new(vec![WireMessage::new(Role::User, "Hi")]);
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"messages":[{"role":"user","content":"Hi"}]}"#);
    }

    #[test]
    fn test_response_ignores_server_id() {
        let body = r#"{"response": {"id": "2", "role": "assistant", "content": "Hello!"}}"#;
        let parsed: QueryResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.response, WireMessage::new(Role::Assistant, "Hello!"));
    }

    #[test]
    fn test_response_missing_field_fails() {
        let result = serde_json::from_str::<QueryResponse>(r#"{"reply": "nope"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_last_user_text() {
        let request = QueryRequest::new(vec![
            WireMessage::new(Role::User, "first"),
            WireMessage::new(Role::Assistant, "answer"),
            WireMessage::new(Role::User, "second"),
        ]);
        assert_eq!(request.last_user_text(), Some("second"));
        assert_eq!(QueryRequest::new(vec![]).last_user_text(), None);
    }

    #[test]
    fn test_error_notice_kind() {
        let notice = Message::error_notice(MessageId::new(3), "boom");
        assert!(notice.is_error());
        assert_eq!(notice.role, Role::System);
        assert!(!Message::user(MessageId::new(0), "hi").is_error());
    }

    #[test]
    fn test_response_mode_parsing() {
        let mode: ResponseMode = serde_json::from_str(r#""single-shot""#).unwrap();
        assert_eq!(mode, ResponseMode::SingleShot);
        assert_eq!(ResponseMode::default().to_string(), "streaming");
    }
}
