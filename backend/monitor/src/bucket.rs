//! Per-second activity buckets for one channel and the sliding-window compaction over them.

use std::time::Duration;

/// Messages recorded at one whole-second timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    /// Unix time of the messages in this bucket.
    pub timestamp: i64,
    pub count: usize,
    /// Formatted transcript lines in arrival order.
    pub messages: Vec<String>,
}

/// Unordered on insert, sorted on demand by [`BucketStore::count`].
///
/// Holds at most one bucket per timestamp.
#[derive(Debug, Clone, Default)]
pub struct BucketStore {
    buckets: Vec<Bucket>,
}

impl BucketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one message at `timestamp`, merging into an existing bucket if present.
    pub fn record(&mut self, timestamp: i64, message: impl Into<String>) {
        let message = message.into();
        // Recent timestamps are most likely near the end.
        if let Some(bucket) = self
            .buckets
            .iter_mut()
            .rev()
            .find(|b| b.timestamp == timestamp)
        {
            bucket.count += 1;
            bucket.messages.push(message);
            return;
        }
        self.buckets.push(Bucket {
            timestamp,
            count: 1,
            messages: vec![message],
        });
    }

    /// Count messages strictly newer than `now - window`.
    ///
    /// Destructive: every bucket at or before the boundary is dropped for good,
    /// transcript included.
    pub fn count(&mut self, now: i64, window: Duration) -> usize {
        self.buckets.sort_by_key(|b| b.timestamp);
        let window_secs = i64::try_from(window.as_secs()).unwrap_or(i64::MAX);
        let boundary = now.saturating_sub(window_secs);

        let stale = self.buckets.partition_point(|b| b.timestamp <= boundary);
        // Shifts the survivors to the front and truncates.
        self.buckets.drain(..stale);

        self.buckets.iter().map(|b| b.count).sum()
    }

    /// All recorded messages as numbered lines, bucket by bucket.
    pub fn transcript(&self) -> String {
        self.buckets
            .iter()
            .flat_map(|b| b.messages.iter())
            .enumerate()
            .map(|(i, m)| format!("[{:>2}] {}\n", i + 1, m))
            .collect()
    }

    /// The earliest-stored message, used as the default archive title.
    pub fn first_message(&self) -> Option<&str> {
        self.buckets
            .first()
            .and_then(|b| b.messages.first())
            .map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }
}
