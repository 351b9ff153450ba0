//! Serve-time settings: the config file plus command-line and environment overrides.

use anyhow::{anyhow, Result};
use wisemonk_channels::DEFAULT_API_BASE;
use wisemonk_config::WisemonkConfig;
use wisemonk_core::parse_duration;
use wisemonk_monitor::ChannelSettings;
use wisemonk_supervisor::SupervisorOptions;

#[derive(Debug, Clone)]
pub struct ServeSettings {
    /// `host:port` the HTTP server binds to.
    pub bind_address: String,
    pub webhook_path: String,
    /// Slack Web API base URL (`SLACK_API_BASE` overrides).
    pub slack_api_base: String,
    pub supervisor: SupervisorOptions,
}

impl ServeSettings {
    /// Port precedence: `--port`, then `WISEMONK_PORT`, then the config file.
    pub fn resolve(config: &WisemonkConfig, port: Option<u16>) -> Self {
        let env_port = std::env::var("WISEMONK_PORT").ok().and_then(|p| p.parse().ok());
        Self::resolve_with(config, port.or(env_port), std::env::var("SLACK_API_BASE").ok())
    }

    fn resolve_with(config: &WisemonkConfig, port: Option<u16>, api_base: Option<String>) -> Self {
        let mut bind_address = config.bind_address();
        if let Some(port) = port {
            let host = bind_address
                .rsplit_once(':')
                .map(|(host, _)| host.to_string())
                .unwrap_or(bind_address);
            bind_address = format!("{host}:{port}");
        }
        Self {
            bind_address,
            webhook_path: config.webhook_path().to_string(),
            slack_api_base: api_base
                .filter(|base| !base.is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            supervisor: SupervisorOptions {
                queue_capacity: config.queue_capacity(),
                tick_period: config.tick_period(),
            },
        }
    }
}

/// Per-channel monitor settings from the `channels` section.
pub fn channel_settings(config: &WisemonkConfig) -> Result<Vec<ChannelSettings>> {
    config
        .channels
        .iter()
        .map(|(id, channel)| {
            let window = parse_duration(&channel.interval)
                .map_err(|e| anyhow!("channel {id}: {e}"))?
                .to_std()
                .filter(|d| !d.is_zero())
                .ok_or_else(|| anyhow!("channel {id}: interval must be positive"))?;
            let threshold = usize::try_from(channel.maxmsg)
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| anyhow!("channel {id}: maxmsg must be > 0"))?;
            Ok(ChannelSettings {
                channel_id: id.clone(),
                window,
                threshold,
                search_over: channel.search_over.clone(),
                create_topic_in: channel.create_topic_in.clone(),
            })
        })
        .collect()
}
