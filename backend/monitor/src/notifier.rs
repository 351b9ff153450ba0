use std::sync::Arc;

use tracing::{info, warn};
use wisemonk_core::{sanitize_title, Archive, MonkError, Outbound};

use crate::bucket::BucketStore;
use crate::proverbs::compose_alert;

/// Composes and sends threshold alerts for one channel, archiving the
/// transcript first when an archive is available.
pub struct Notifier {
    channel_id: String,
    outbound: Arc<dyn Outbound>,
    archive: Option<Arc<dyn Archive>>,
    /// Archive category new topics are posted into.
    create_topic_in: String,
}

impl Notifier {
    pub fn new(
        channel_id: impl Into<String>,
        outbound: Arc<dyn Outbound>,
        archive: Option<Arc<dyn Archive>>,
        create_topic_in: impl Into<String>,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            outbound,
            archive,
            create_topic_in: create_topic_in.into(),
        }
    }

    pub fn has_archive(&self) -> bool {
        self.archive.is_some()
    }

    /// Send exactly one alert built from a store claimed by the caller.
    ///
    /// The store is consumed, so the activity it held is gone afterwards.
    pub async fn alert(&self, store: BucketStore) {
        let mut closing = String::new();
        if let (true, Some(first)) = (self.has_archive(), store.first_message()) {
            let title = sanitize_title(first);
            match self.create_topic(&title, &store).await {
                Ok(url) => closing = format!("Please move your discussion to {url}"),
                Err(e) => {
                    warn!(channel = %self.channel_id, error = %e, "Archiving before alert failed; sending plain alert");
                }
            }
        }

        let text = compose_alert(&closing);
        let message = self.outbound.compose_outgoing(&text, &self.channel_id);
        match self.outbound.send(message).await {
            Ok(()) => info!(channel = %self.channel_id, "Alert sent"),
            Err(e) => warn!(channel = %self.channel_id, error = %e, "Failed to send alert"),
        }
    }

    /// Post the store's transcript as a new archive topic and return its URL.
    pub async fn create_topic(&self, title: &str, store: &BucketStore) -> Result<String, MonkError> {
        let Some(archive) = &self.archive else {
            return Err(MonkError::Archive("no archive configured".into()));
        };
        let raw = format!("```{}```", store.transcript());
        archive.create_topic(title, &raw, &self.create_topic_in).await
    }
}
