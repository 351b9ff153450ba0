//! Test doubles for the transport and archive collaborators.

use std::sync::Mutex;

use async_trait::async_trait;
use wisemonk_core::{Archive, MonkError, OutgoingMessage, Outbound, TopicLink};

#[derive(Default)]
pub struct RecordingOutbound {
    sent: Mutex<Vec<OutgoingMessage>>,
    attempts: Mutex<usize>,
    fail: bool,
}

impl RecordingOutbound {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent().into_iter().map(|m| m.text).collect()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Outbound for RecordingOutbound {
    async fn send(&self, message: OutgoingMessage) -> Result<(), MonkError> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail {
            return Err(MonkError::Transport("connection reset".into()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedTopic {
    pub title: String,
    pub raw: String,
    pub category: String,
}

#[derive(Default)]
pub struct FakeArchive {
    url: Option<String>,
    results: Vec<String>,
    created: Mutex<Vec<CreatedTopic>>,
    searches: Mutex<Vec<(String, Vec<String>, usize)>>,
}

impl FakeArchive {
    pub fn with_url(url: &str) -> Self {
        Self {
            url: Some(url.to_string()),
            ..Self::default()
        }
    }

    /// Topic creation fails; searches come back empty.
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_results(mut self, urls: &[&str]) -> Self {
        self.results = urls.iter().map(|u| u.to_string()).collect();
        self
    }

    pub fn created(&self) -> Vec<CreatedTopic> {
        self.created.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<(String, Vec<String>, usize)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl Archive for FakeArchive {
    async fn create_topic(&self, title: &str, raw: &str, category: &str) -> Result<String, MonkError> {
        self.created.lock().unwrap().push(CreatedTopic {
            title: title.to_string(),
            raw: raw.to_string(),
            category: category.to_string(),
        });
        self.url
            .clone()
            .ok_or_else(|| MonkError::Archive("status 500".into()))
    }

    async fn search(
        &self,
        query: &str,
        categories: &[String],
        max_results: usize,
    ) -> Result<Vec<TopicLink>, MonkError> {
        self.searches
            .lock()
            .unwrap()
            .push((query.to_string(), categories.to_vec(), max_results));
        Ok(self
            .results
            .iter()
            .map(|url| TopicLink { url: url.clone() })
            .collect())
    }
}
