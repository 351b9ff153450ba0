//! Monitor Event Logger
//!
//! Structured channel-monitor events (alerts, meditation, archive activity)
//! emitted under the `monitor_events` target.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MonitorEvent {
    ThresholdReached {
        count: usize,
        threshold: usize,
    },
    MeditationStarted {
        seconds: u64,
    },
    MeditationEnded,
    TopicCreated {
        url: String,
    },
    SearchServed {
        query: String,
        results: usize,
    },
}

#[derive(Debug, Serialize)]
pub struct MonitorLogEntry {
    pub channel_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: MonitorEvent,
}

impl MonitorLogEntry {
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

pub struct MonitorEventLogger;

impl MonitorEventLogger {
    /// Build the log entry for `event`, scrubbing user-supplied text.
    pub fn entry(channel_id: &str, mut event: MonitorEvent) -> MonitorLogEntry {
        if let MonitorEvent::SearchServed { query, .. } = &mut event {
            *query = redact_sensitive_data(query);
        }
        MonitorLogEntry {
            channel_id: channel_id.into(),
            timestamp: Utc::now(),
            event,
        }
    }

    pub fn log_event(channel_id: &str, event: MonitorEvent) {
        let entry = Self::entry(channel_id, event);
        info!(target: "monitor_events", entry = %entry.to_json(), "Monitor event");
    }
}
