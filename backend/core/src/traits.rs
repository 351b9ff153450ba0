use async_trait::async_trait;

use crate::error::MonkError;
use crate::message::OutgoingMessage;

/// Outbound side of the chat transport.
///
/// Split into compose and send so tests can observe exactly what would be sent.
#[async_trait]
pub trait Outbound: Send + Sync {
    fn compose_outgoing(&self, text: &str, channel_id: &str) -> OutgoingMessage {
        OutgoingMessage {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        }
    }

    /// Fire-and-forget delivery; the caller never retries.
    async fn send(&self, message: OutgoingMessage) -> Result<(), MonkError>;
}

/// A link to a topic in the external archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicLink {
    pub url: String,
}

/// External archive/forum service used for topic creation and search.
#[async_trait]
pub trait Archive: Send + Sync {
    /// Create a topic and return its URL. `title` must already be sanitized.
    async fn create_topic(
        &self,
        title: &str,
        raw: &str,
        category: &str,
    ) -> Result<String, MonkError>;

    /// Search topics restricted to `categories`, best matches first.
    async fn search(
        &self,
        query: &str,
        categories: &[String],
        max_results: usize,
    ) -> Result<Vec<TopicLink>, MonkError>;
}
