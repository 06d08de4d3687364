use thiserror::Error;

use crate::transport::TransportError;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyInput,

    #[error("A reply is still pending")]
    Busy,

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    /// Rejections leave the conversation untouched and can simply be retried.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::Busy)
    }
}
