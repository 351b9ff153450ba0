//! Config defaults: applies sensible default values to parsed config.

use std::time::Duration;

use crate::schema::{LoggingConfig, ServerConfig, WisemonkConfig};

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WEBHOOK_PATH: &str = "/webhooks/slack";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_LOG_DIR: &str = "logs";
pub const DEFAULT_TICK_SECONDS: u64 = 10;
pub const DEFAULT_QUEUE_CAPACITY: usize = 500;
pub const DEFAULT_DISCOURSE_USER: &str = "wisemonk";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: WisemonkConfig) -> WisemonkConfig {
    let config = apply_server_defaults(config);
    let config = apply_logging_defaults(config);
    apply_runtime_defaults(config)
}

fn apply_server_defaults(mut config: WisemonkConfig) -> WisemonkConfig {
    let server = config.server.get_or_insert_with(ServerConfig::default);
    server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    server.port.get_or_insert(DEFAULT_PORT);
    server
        .webhook_path
        .get_or_insert_with(|| DEFAULT_WEBHOOK_PATH.to_string());
    config
}

fn apply_logging_defaults(mut config: WisemonkConfig) -> WisemonkConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    logging.dir.get_or_insert_with(|| DEFAULT_LOG_DIR.to_string());
    config
}

fn apply_runtime_defaults(mut config: WisemonkConfig) -> WisemonkConfig {
    config.tick_seconds.get_or_insert(DEFAULT_TICK_SECONDS);
    config.queue_capacity.get_or_insert(DEFAULT_QUEUE_CAPACITY);
    if config.discourseuser.as_deref().map_or(true, str::is_empty) {
        config.discourseuser = Some(DEFAULT_DISCOURSE_USER.to_string());
    }
    config
}

/// Effective values, falling back to the defaults above when unset.
impl WisemonkConfig {
    pub fn bind_address(&self) -> String {
        let server = self.server.as_ref();
        let bind = server
            .and_then(|s| s.bind.as_deref())
            .unwrap_or(DEFAULT_BIND);
        let port = server.and_then(|s| s.port).unwrap_or(DEFAULT_PORT);
        format!("{bind}:{port}")
    }

    pub fn webhook_path(&self) -> &str {
        self.server
            .as_ref()
            .and_then(|s| s.webhook_path.as_deref())
            .unwrap_or(DEFAULT_WEBHOOK_PATH)
    }

    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    pub fn log_dir(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.dir.as_deref())
            .unwrap_or(DEFAULT_LOG_DIR)
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_secs(self.tick_seconds.unwrap_or(DEFAULT_TICK_SECONDS))
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity.unwrap_or(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn discourse_user(&self) -> &str {
        self.discourseuser
            .as_deref()
            .filter(|u| !u.is_empty())
            .unwrap_or(DEFAULT_DISCOURSE_USER)
    }
}
