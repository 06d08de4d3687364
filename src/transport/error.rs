use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Request failed ({status}): {message}")]
    Network { status: u16, message: String },

    #[error("Response body is not readable")]
    StreamUnavailable,

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl TransportError {
    #[must_use]
    pub fn network(status: u16, message: impl Into<String>) -> Self {
        Self::Network {
            status,
            message: message.into(),
        }
    }

    /// Builds a `Network` error from a non-2xx response.
    ///
    /// The query service answers bad requests with `{"error": "..."}`; other
    /// gateways tend to nest it as `{"error": {"message": "..."}}`. Both are
    /// understood, anything else falls back to the bare status.
    #[must_use]
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                let error = v.get("error")?;
                error
                    .as_str()
                    .or_else(|| error.get("message")?.as_str())
                    .map(String::from)
            })
            .unwrap_or_else(|| format!("HTTP {status}"));

        Self::Network { status, message }
    }

    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `limit` is reported when reqwest says the request timed out.
    pub(crate) fn from_reqwest(err: &reqwest::Error, limit: Duration) -> Self {
        if err.is_timeout() {
            return Self::Timeout(limit);
        }
        if err.is_decode() {
            return Self::Parse(err.to_string());
        }
        if err.is_body() {
            return Self::Stream(err.to_string());
        }
        Self::Connection(err.to_string())
    }
}
