//! wisemonk runtime configuration schema.
//!
//! Top-level keys keep the names used by existing deployments
//! (`token`, `discourseprefix`, `discoursekey`, `channels.<id>.maxmsg`, ...).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WisemonkConfig {
    /// Slack bot token (`xoxb-...`).
    #[serde(default)]
    pub token: String,

    /// Slack app signing secret for webhook verification.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub signing_secret: String,

    /// Discourse base URL, e.g. `https://discuss.example.com`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub discourseprefix: String,

    /// Discourse API key. Empty disables archiving and search.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub discoursekey: String,

    /// Discourse account the key acts as.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discourseuser: Option<String>,

    /// Monitored channels by channel id.
    #[serde(default)]
    pub channels: BTreeMap<String, ChannelConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Seconds between threshold checks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_seconds: Option<u64>,

    /// Per-channel inbound queue capacity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_capacity: Option<usize>,
}

impl WisemonkConfig {
    pub fn archive_enabled(&self) -> bool {
        !self.discoursekey.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Sliding window length, e.g. `5m`.
    #[serde(default)]
    pub interval: String,

    /// Messages within the window that trigger an alert.
    #[serde(default)]
    pub maxmsg: i64,

    /// Discourse categories searched from this channel.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_over: Vec<String>,

    /// Discourse category new topics are created in.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub create_topic_in: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Directory for rolling log files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_historical_json_layout() {
        let raw = r#"{
            "token": "xoxb-1",
            "discourseprefix": "https://discuss.example.com",
            "discoursekey": "abc",
            "channels": {
                "C0GBJCH9Z": {
                    "interval": "5m",
                    "maxmsg": 20,
                    "search_over": ["Users", "Slack"],
                    "create_topic_in": "Slack"
                }
            }
        }"#;
        let cfg: WisemonkConfig = serde_yaml::from_str(raw).unwrap();
        let ch = &cfg.channels["C0GBJCH9Z"];
        assert_eq!(ch.interval, "5m");
        assert_eq!(ch.maxmsg, 20);
        assert_eq!(ch.search_over, vec!["Users", "Slack"]);
        assert!(cfg.archive_enabled());
    }

    #[test]
    fn parses_yaml_with_sections() {
        let raw = "
token: xoxb-1
server:
  port: 9000
logging:
  level: debug
channels:
  C1:
    interval: 1m
    maxmsg: 3
";
        let cfg: WisemonkConfig = serde_yaml::from_str(raw).unwrap();
        assert_eq!(cfg.server.as_ref().unwrap().port, Some(9000));
        assert_eq!(cfg.logging.as_ref().unwrap().level.as_deref(), Some("debug"));
        assert!(!cfg.archive_enabled());
    }
}
