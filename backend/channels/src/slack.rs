//! Slack channel adapter for wisemonk.
//!
//! Receives Slack Events API webhooks and forwards plain channel messages to
//! the ingress queue. Replies go out through [`crate::slack_api::SlackClient`].

use crate::slack_events::{SlackEnvelope, verify_signature};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use wisemonk_core::ChatMessage;

pub const DEFAULT_WEBHOOK_PATH: &str = "/webhooks/slack";

#[derive(Clone)]
pub struct SlackConfig {
    pub signing_secret: String,
    pub webhook_path: String,
}

#[derive(Clone)]
struct AppState {
    signing_secret: String,
    ingress_tx: mpsc::Sender<ChatMessage>,
}

pub struct SlackAdapter {
    config: SlackConfig,
    ingress_tx: mpsc::Sender<ChatMessage>,
}

impl SlackAdapter {
    pub fn new(config: SlackConfig, ingress_tx: mpsc::Sender<ChatMessage>) -> Self {
        Self { config, ingress_tx }
    }

    pub fn webhook_path(&self) -> &str {
        &self.config.webhook_path
    }

    /// Router serving the Events API webhook at the configured path.
    pub fn build_router(&self) -> Router {
        let state = AppState {
            signing_secret: self.config.signing_secret.clone(),
            ingress_tx: self.ingress_tx.clone(),
        };
        Router::new()
            .route(&self.config.webhook_path, post(handle_slack_event))
            .with_state(state)
    }
}

async fn handle_slack_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let now = chrono::Utc::now().timestamp();
    if !verify_signature(&headers, &body, &state.signing_secret, now) {
        warn!("[Slack] Invalid signature, rejecting webhook");
        return (StatusCode::UNAUTHORIZED, "invalid_signature").into_response();
    }

    let envelope: SlackEnvelope = match serde_json::from_slice(&body) {
        Ok(e) => e,
        Err(err) => {
            error!("[Slack] Failed to parse event envelope: {}", err);
            return (StatusCode::BAD_REQUEST, "bad_json").into_response();
        }
    };

    match envelope.envelope_type.as_str() {
        "url_verification" => {
            let challenge = envelope.challenge.unwrap_or_default();
            (StatusCode::OK, challenge).into_response()
        }
        "event_callback" => {
            let Some(msg) = envelope.event.and_then(|e| e.into_chat_message()) else {
                return (StatusCode::OK, "ignored").into_response();
            };
            debug!(channel_id = %msg.channel_id, user_id = %msg.user_id, "[Slack] message received");
            // Closed queue: the monitor is shutting down.
            if state.ingress_tx.send(msg).await.is_err() {
                error!("[Slack] Ingress queue closed, dropping message");
                return (StatusCode::SERVICE_UNAVAILABLE, "shutting_down").into_response();
            }
            (StatusCode::OK, "ok").into_response()
        }
        _ => (StatusCode::OK, "ignored").into_response(),
    }
}
