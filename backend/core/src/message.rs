use serde::{Deserialize, Serialize};

use crate::error::MonkError;

/// An inbound chat message, already demultiplexed by the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub channel_id: String,
    pub user_id: String,
    /// Event time as a numeric string: seconds with fractional precision.
    pub ts: String,
    pub text: String,
}

impl ChatMessage {
    pub fn new(
        channel_id: impl Into<String>,
        user_id: impl Into<String>,
        ts: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            user_id: user_id.into(),
            ts: ts.into(),
            text: text.into(),
        }
    }

    /// Whole-second event time of the message.
    pub fn unix_seconds(&self) -> Result<i64, MonkError> {
        let secs: f64 = self
            .ts
            .trim()
            .parse()
            .map_err(|_| MonkError::InvalidTimestamp(self.ts.clone()))?;
        if !secs.is_finite() {
            return Err(MonkError::InvalidTimestamp(self.ts.clone()));
        }
        Ok(secs.trunc() as i64)
    }
}

/// A message ready to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub channel_id: String,
    pub text: String,
}
