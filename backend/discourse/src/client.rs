use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};
use wisemonk_core::{Archive, MonkError, TopicLink};

use crate::types::{CategoriesResponse, CreatedPost, NewTopic, SearchResponse, SearchTopic};

/// Account the bot posts as unless configured otherwise.
pub const DEFAULT_USERNAME: &str = "wisemonk";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Discourse HTTP client with a startup-loaded category cache.
pub struct DiscourseClient {
    http: Client,
    prefix: String,
    api_key: String,
    username: String,
    /// Category id → name, filled by [`DiscourseClient::load_categories`].
    categories: RwLock<HashMap<u64, String>>,
}

impl DiscourseClient {
    pub fn new(
        prefix: impl Into<String>,
        api_key: impl Into<String>,
        username: impl Into<String>,
    ) -> Result<Self, MonkError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MonkError::ConfigError(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            prefix: prefix.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            username: username.into(),
            categories: RwLock::new(HashMap::new()),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.prefix, path)
    }

    fn topic_url(&self, slug: &str, id: u64) -> String {
        format!("{}/t/{}/{}", self.prefix, slug, id)
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("Api-Key", &self.api_key)
            .header("Api-Username", &self.username)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, MonkError> {
        let url = self.url(path);
        let response = self
            .authed(self.http.get(&url).query(query))
            .send()
            .await
            .map_err(|e| MonkError::Archive(format!("GET {path} failed: {e}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonkError::Archive(format!("GET {path} returned {status}")));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| MonkError::Archive(format!("GET {path} returned malformed JSON: {e}")))
    }

    /// Fetch and cache all categories. Returns how many were loaded.
    pub async fn load_categories(&self) -> Result<usize, MonkError> {
        let response: CategoriesResponse = self.get_json("categories.json", &[]).await?;
        let loaded: HashMap<u64, String> = response
            .category_list
            .categories
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
        let count = loaded.len();
        *self
            .categories
            .write()
            .map_err(|_| MonkError::ConfigError("category cache poisoned".into()))? = loaded;
        info!(count, "Loaded Discourse categories");
        Ok(count)
    }

    pub fn category_name(&self, id: u64) -> Option<String> {
        self.categories.read().ok()?.get(&id).cloned()
    }

    /// Every name in `required` must be a known category.
    pub fn ensure_categories(&self, required: &[String]) -> Result<(), MonkError> {
        let categories = self
            .categories
            .read()
            .map_err(|_| MonkError::ConfigError("category cache poisoned".into()))?;
        for name in required {
            if !categories.values().any(|known| known == name) {
                return Err(MonkError::ConfigError(format!(
                    "category {name} doesn't exist in discourse"
                )));
            }
        }
        Ok(())
    }

    fn in_categories(&self, topic: &SearchTopic, allowed: &[String]) -> bool {
        topic
            .category
            .and_then(|id| self.category_name(id))
            .is_some_and(|name| allowed.iter().any(|a| *a == name))
    }
}

#[async_trait]
impl Archive for DiscourseClient {
    async fn create_topic(&self, title: &str, raw: &str, category: &str) -> Result<String, MonkError> {
        let body = NewTopic { title, raw, category };
        let response = self
            .authed(self.http.post(self.url("posts.json")).json(&body))
            .send()
            .await
            .map_err(|e| MonkError::Archive(format!("POST posts.json failed: {e}")))?;

        let status = response.status();
        if status != StatusCode::OK {
            let detail = response.text().await.unwrap_or_default();
            if status == StatusCode::FORBIDDEN {
                error!("Discourse rejected our credentials");
            } else {
                warn!(title, status = %status, body = %detail, "Discourse refused the topic");
            }
            return Err(MonkError::Archive(format!("topic creation returned {status}")));
        }

        let created: CreatedPost = response
            .json()
            .await
            .map_err(|e| MonkError::Archive(format!("malformed topic response: {e}")))?;
        let url = self.topic_url(&created.topic_slug, created.topic_id);
        info!(url = %url, "Created Discourse topic");
        Ok(url)
    }

    async fn search(
        &self,
        query: &str,
        categories: &[String],
        max_results: usize,
    ) -> Result<Vec<TopicLink>, MonkError> {
        let response: SearchResponse = self
            .get_json("search.json", &[("q", query), ("order", "views")])
            .await?;
        let total = response.topics.len();
        let links: Vec<TopicLink> = response
            .topics
            .iter()
            .filter(|t| self.in_categories(t, categories))
            .take(max_results)
            .map(|t| TopicLink {
                url: self.topic_url(&t.slug, t.id),
            })
            .collect();
        debug!(query, total, kept = links.len(), "Discourse search");
        Ok(links)
    }
}
