//! Slack Events API
//!
//! Envelope types, request signing and the mapping from `message` events to
//! [`ChatMessage`].

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use wisemonk_core::ChatMessage;

const SIGNATURE_HEADER: &str = "x-slack-signature";
const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Requests older than this are treated as replays.
pub const MAX_REQUEST_AGE_SECS: i64 = 5 * 60;

/// Top-level event envelope from the Slack Events API.
#[derive(Deserialize, Debug)]
pub struct SlackEnvelope {
    #[serde(rename = "type")]
    pub envelope_type: String,
    /// Present on `url_verification` challenges.
    pub challenge: Option<String>,
    /// Present on `event_callback`.
    pub event: Option<SlackEvent>,
}

#[derive(Deserialize, Debug)]
pub struct SlackEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    /// Edits, joins and other non-plain messages carry a subtype.
    pub subtype: Option<String>,
    pub user: Option<String>,
    pub text: Option<String>,
    pub channel: Option<String>,
    pub ts: Option<String>,
    pub bot_id: Option<String>,
}

impl SlackEvent {
    /// Plain user messages become chat messages; everything else is dropped.
    pub fn into_chat_message(self) -> Option<ChatMessage> {
        if self.event_type != "message" || self.bot_id.is_some() || self.subtype.is_some() {
            return None;
        }
        Some(ChatMessage::new(
            self.channel?,
            self.user?,
            self.ts?,
            self.text.unwrap_or_default(),
        ))
    }
}

/// Verify `X-Slack-Signature` (HMAC-SHA256 over `v0:{timestamp}:{body}`).
///
/// `now` is unix seconds; stale timestamps fail verification.
pub fn verify_signature(headers: &HeaderMap, body: &[u8], signing_secret: &str, now: i64) -> bool {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let (Some(sig), Some(ts)) = (header(SIGNATURE_HEADER), header(TIMESTAMP_HEADER)) else {
        return false;
    };
    let Ok(sent_at) = ts.parse::<i64>() else {
        return false;
    };
    let Some(age) = now.checked_sub(sent_at) else {
        return false;
    };
    if age.unsigned_abs() > MAX_REQUEST_AGE_SECS.unsigned_abs() {
        return false;
    }
    let Some(expected) = sig.strip_prefix("v0=").and_then(|hexed| hex::decode(hexed).ok()) else {
        return false;
    };

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes()) else {
        return false;
    };
    mac.update(b"v0:");
    mac.update(ts.as_bytes());
    mac.update(b":");
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Compute the `v0=` signature Slack would send for `body` at `timestamp`.
pub fn sign(signing_secret: &str, timestamp: i64, body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(signing_secret.as_bytes())
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(format!("v0:{timestamp}:").as_bytes());
    mac.update(body);
    format!("v0={}", hex::encode(mac.finalize().into_bytes()))
}
