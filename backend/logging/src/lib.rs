//! Telemetry and structured logging components for wisemonk.
//!
//! Handles log redaction, JSON output generation, file rotation, and channel-monitor event logging.

pub mod logger;
pub mod monitor_events;
pub mod redact;

pub use logger::{filter_directives, init_logger, LoggerGuard};
pub use monitor_events::{MonitorEvent, MonitorEventLogger, MonitorLogEntry};
pub use redact::redact_sensitive_data;
