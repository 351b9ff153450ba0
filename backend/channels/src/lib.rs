pub mod slack;
pub mod slack_api;
pub mod slack_events;

pub use slack::{DEFAULT_WEBHOOK_PATH, SlackAdapter, SlackConfig};
pub use slack_api::{DEFAULT_API_BASE, SlackClient};
