//! Slack Web API client: `chat.postMessage` for replies and `users.list`
//! for the user directory.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};
use wisemonk_core::{MonkError, OutgoingMessage, Outbound, UserDirectory};

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

/// Every Web API response carries `ok` and, on failure, `error`.
#[derive(Deserialize)]
struct ApiStatus {
    ok: bool,
    error: Option<String>,
}

#[derive(Deserialize)]
struct UsersPage {
    ok: bool,
    error: Option<String>,
    #[serde(default)]
    members: Vec<Member>,
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Deserialize)]
struct Member {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: String,
}

pub struct SlackClient {
    http: Client,
    bot_token: String,
    api_base: String,
}

impl SlackClient {
    pub fn new(bot_token: impl Into<String>) -> Result<Self, MonkError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| MonkError::ConfigError(format!("failed to build http client: {e}")))?;
        Ok(Self {
            http,
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.api_base, method)
    }

    /// Fetch every workspace member and build the id → name directory.
    pub async fn fetch_users(&self) -> Result<UserDirectory, MonkError> {
        let mut names = HashMap::new();
        let mut cursor = String::new();
        loop {
            let mut request = self
                .http
                .get(self.method_url("users.list"))
                .bearer_auth(&self.bot_token);
            if !cursor.is_empty() {
                request = request.query(&[("cursor", cursor.as_str())]);
            }
            let response = request
                .send()
                .await
                .map_err(|e| MonkError::Transport(format!("users.list failed: {e}")))?;
            let status = response.status();
            if !status.is_success() {
                return Err(MonkError::Transport(format!("users.list returned {status}")));
            }
            let page: UsersPage = response
                .json()
                .await
                .map_err(|e| MonkError::Transport(format!("users.list returned malformed JSON: {e}")))?;
            if !page.ok {
                return Err(MonkError::Transport(format!(
                    "users.list error: {}",
                    page.error.unwrap_or_default()
                )));
            }
            names.extend(page.members.into_iter().map(|m| (m.id, m.name)));

            cursor = page
                .response_metadata
                .map(|meta| meta.next_cursor)
                .unwrap_or_default();
            if cursor.is_empty() {
                break;
            }
        }
        info!(count = names.len(), "[Slack] Loaded user directory");
        Ok(UserDirectory::new(names))
    }
}

#[async_trait]
impl Outbound for SlackClient {
    async fn send(&self, message: OutgoingMessage) -> Result<(), MonkError> {
        let body = PostMessage {
            channel: &message.channel_id,
            text: &message.text,
        };
        let res = self
            .http
            .post(self.method_url("chat.postMessage"))
            .bearer_auth(&self.bot_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| MonkError::Transport(format!("chat.postMessage failed: {e}")))?;

        if !res.status().is_success() {
            let err = res.text().await.unwrap_or_default();
            error!("[Slack] chat.postMessage failed: {}", err);
            return Err(MonkError::Transport(format!("Slack send failed: {err}")));
        }
        let status: ApiStatus = res
            .json()
            .await
            .map_err(|e| MonkError::Transport(format!("chat.postMessage returned malformed JSON: {e}")))?;
        if !status.ok {
            let err = status.error.unwrap_or_default();
            error!("[Slack] chat.postMessage rejected: {}", err);
            return Err(MonkError::Transport(format!("Slack send rejected: {err}")));
        }
        debug!(channel_id = %message.channel_id, "[Slack] Sent message");
        Ok(())
    }
}
