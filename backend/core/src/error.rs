use thiserror::Error;

/// Top-level error type for the wisemonk runtime.
#[derive(Debug, Error)]
pub enum MonkError {
    /// A message was routed to the counter of a different channel.
    #[error("channel mismatch: expected {expected}, got {got}")]
    ChannelMismatch { expected: String, got: String },

    #[error("invalid message timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("channel closed: {0}")]
    ChannelClosed(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MonkError {
    /// Fatal errors indicate a broken precondition of the surrounding system.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MonkError::ChannelMismatch { .. }
                | MonkError::InvalidTimestamp(_)
                | MonkError::ConfigError(_)
        )
    }
}
