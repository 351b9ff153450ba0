//! Config validation: collects every problem in one pass with field paths.

use crate::schema::WisemonkConfig;
use thiserror::Error;
use wisemonk_core::parse_duration;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &WisemonkConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_slack(config, &mut report);
    validate_channels(config, &mut report);
    validate_discourse(config, &mut report);
    validate_runtime(config, &mut report);
    report
}

fn validate_slack(config: &WisemonkConfig, report: &mut ValidationReport) {
    if config.token.trim().is_empty() {
        report.error("token", "Slack bot token is required");
    }
    if config.signing_secret.trim().is_empty() {
        report.warn(
            "signing_secret",
            "No signing secret; every webhook request will be rejected",
        );
    }
}

fn validate_channels(config: &WisemonkConfig, report: &mut ValidationReport) {
    if config.channels.is_empty() {
        report.warn("channels", "No channels configured; nothing will be monitored");
    }
    for (id, channel) in &config.channels {
        let path = format!("channels.{id}");
        if id.trim().is_empty() {
            report.error("channels", "Channel id cannot be empty");
        }
        match parse_duration(&channel.interval) {
            Ok(d) if d.as_nanos() > 0 => {}
            Ok(_) => report.error(format!("{path}.interval"), "interval must be positive"),
            Err(e) => report.error(
                format!("{path}.interval"),
                format!("invalid interval '{}': {e}", channel.interval),
            ),
        }
        if channel.maxmsg <= 0 {
            report.error(format!("{path}.maxmsg"), "maxmsg must be > 0");
        }
    }
}

fn validate_discourse(config: &WisemonkConfig, report: &mut ValidationReport) {
    if !config.archive_enabled() {
        let wants_archive = config
            .channels
            .values()
            .any(|c| !c.create_topic_in.is_empty() || !c.search_over.is_empty());
        if wants_archive {
            report.warn(
                "discoursekey",
                "Channels name Discourse categories but no discoursekey is set; archiving is disabled",
            );
        }
        return;
    }
    let prefix = config.discourseprefix.trim();
    if prefix.is_empty() {
        report.error("discourseprefix", "discourseprefix is required with a discoursekey");
    } else if !(prefix.starts_with("http://") || prefix.starts_with("https://")) {
        report.error("discourseprefix", format!("'{prefix}' is not an http(s) URL"));
    }
    for (id, channel) in &config.channels {
        if channel.create_topic_in.trim().is_empty() {
            report.error(
                format!("channels.{id}.create_topic_in"),
                "create_topic_in is required when Discourse is configured",
            );
        }
    }
}

fn validate_runtime(config: &WisemonkConfig, report: &mut ValidationReport) {
    if config.tick_seconds == Some(0) {
        report.error("tick_seconds", "tick_seconds must be >= 1");
    }
    if config.queue_capacity == Some(0) {
        report.error("queue_capacity", "queue_capacity must be >= 1");
    }
    if let Some(path) = config.server.as_ref().and_then(|s| s.webhook_path.as_deref()) {
        if !path.starts_with('/') {
            report.error("server.webhook_path", "webhook_path must start with '/'");
        }
    }
}
