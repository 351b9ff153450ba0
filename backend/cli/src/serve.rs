//! `wisemonk serve`: wire Slack, Discourse and the per-channel counters together.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use wisemonk_channels::{SlackAdapter, SlackClient, SlackConfig};
use wisemonk_config::WisemonkConfig;
use wisemonk_core::{Archive, Outbound};
use wisemonk_discourse::DiscourseClient;
use wisemonk_supervisor::Supervisor;

use crate::api::{self, AppState};
use crate::config::{channel_settings, ServeSettings};

pub async fn run(config: WisemonkConfig, port: Option<u16>) -> Result<()> {
    let settings = ServeSettings::resolve(&config, port);
    let channels = channel_settings(&config)?;
    info!(
        addr = %settings.bind_address,
        channels = channels.len(),
        "Starting wisemonk"
    );

    let slack = SlackClient::new(&config.token)?.with_api_base(&settings.slack_api_base);
    let users = Arc::new(
        slack
            .fetch_users()
            .await
            .context("Failed to load the Slack user directory")?,
    );

    let archive: Option<Arc<dyn Archive>> = if config.archive_enabled() {
        let discourse = DiscourseClient::new(
            &config.discourseprefix,
            &config.discoursekey,
            config.discourse_user(),
        )?;
        discourse
            .load_categories()
            .await
            .context("Failed to load Discourse categories")?;
        let required: Vec<String> = channels.iter().map(|c| c.create_topic_in.clone()).collect();
        discourse.ensure_categories(&required)?;
        let archive: Arc<dyn Archive> = Arc::new(discourse);
        Some(archive)
    } else {
        info!("No discoursekey configured; archiving and search are disabled");
        None
    };

    let outbound: Arc<dyn Outbound> = Arc::new(slack);
    let channel_ids: Vec<String> = channels.iter().map(|c| c.channel_id.clone()).collect();
    let supervisor = Supervisor::spawn(
        channels,
        outbound,
        archive.clone(),
        users,
        settings.supervisor.clone(),
    );

    let (ingress_tx, ingress_rx) = mpsc::channel(settings.supervisor.queue_capacity.max(1));
    let adapter = SlackAdapter::new(
        SlackConfig {
            signing_secret: config.signing_secret.clone(),
            webhook_path: settings.webhook_path.clone(),
        },
        ingress_tx,
    );
    info!(path = adapter.webhook_path(), "[Slack] Webhook adapter registered");

    let state = Arc::new(AppState {
        channels: channel_ids,
        archive_enabled: archive.is_some(),
        started_at: Instant::now(),
    });
    let app = api::build_router(state, adapter.build_router()).layer(TraceLayer::new_for_http());
    drop(adapter);

    let listener = TcpListener::bind(&settings.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_address))?;
    info!(addr = %settings.bind_address, path = %settings.webhook_path, "HTTP server listening");

    let ingress = tokio::spawn(supervisor.router().forward(ingress_rx));

    tokio::select! {
        served = async { axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await } => {
            served.context("HTTP server failed")?;
            info!("HTTP server stopped");
        }
        outcome = supervisor.run() => {
            outcome.context("Channel monitor stopped")?;
        }
        forwarded = ingress => {
            match forwarded {
                Ok(result) => result.context("Ingress router stopped")?,
                Err(e) => error!(error = %e, "Ingress router task panicked"),
            }
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
