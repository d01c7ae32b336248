// src/errors.rs

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong inside chatline.
///
/// Only the first three variants can come out of a chat exchange, and the
/// user never sees them directly: the controller renders all of them as the
/// same fixed bot message.
#[derive(Debug, Error)]
pub enum ChatError {
    /// The request could not be sent or the body could not be read.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned {status}")]
    Status { status: StatusCode },

    /// The body was not a `{"response": ...}` object.
    #[error("Failed to decode reply: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logger error: {0}")]
    Logger(#[from] flexi_logger::FlexiLoggerError),
}

pub type ChatResult<T> = Result<T, ChatError>;

impl ChatError {
    pub fn config_error(message: impl Into<String>) -> Self {
        ChatError::Config(message.into())
    }

    pub fn status_error(status: StatusCode) -> Self {
        ChatError::Status { status }
    }

    /// True for failures of a chat exchange, as opposed to local set-up errors.
    pub fn is_response_unavailable(&self) -> bool {
        matches!(
            self,
            ChatError::Transport(_) | ChatError::Status { .. } | ChatError::Decode(_)
        )
    }
}
