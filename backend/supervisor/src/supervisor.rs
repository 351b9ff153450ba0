use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use wisemonk_core::{Archive, ChatMessage, MonkError, Outbound, UserDirectory};
use wisemonk_monitor::{ChannelCounter, ChannelSettings, DEFAULT_TICK_PERIOD};

/// Default inbound queue size per channel.
pub const DEFAULT_QUEUE_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub queue_capacity: usize,
    pub tick_period: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }
}

/// Cloneable handle that delivers inbound messages to the counter of their channel.
#[derive(Clone)]
pub struct IngressRouter {
    queues: Arc<HashMap<String, mpsc::Sender<ChatMessage>>>,
}

impl IngressRouter {
    pub fn is_monitored(&self, channel_id: &str) -> bool {
        self.queues.contains_key(channel_id)
    }

    /// Queue `msg` for its channel, waiting while the queue is full.
    ///
    /// Returns `Ok(false)` for channels that are not monitored.
    pub async fn route(&self, msg: ChatMessage) -> Result<bool, MonkError> {
        let Some(tx) = self.queues.get(&msg.channel_id) else {
            debug!(channel = %msg.channel_id, "Dropping message for unmonitored channel");
            return Ok(false);
        };
        tx.send(msg)
            .await
            .map_err(|e| MonkError::ChannelClosed(e.0.channel_id))?;
        Ok(true)
    }

    /// Ingress loop: forward everything the transport delivers until it hangs up.
    pub async fn forward(self, mut rx: mpsc::Receiver<ChatMessage>) -> Result<(), MonkError> {
        info!(channels = self.queues.len(), "Ingress router started");
        while let Some(msg) = rx.recv().await {
            self.route(msg).await?;
        }
        info!("Ingress channel closed, shutting down");
        Ok(())
    }
}

/// Owns one counter task per monitored channel.
pub struct Supervisor {
    router: IngressRouter,
    counters: JoinSet<(String, Result<(), MonkError>)>,
}

impl Supervisor {
    /// Start a counter for every channel in `channels`.
    pub fn spawn(
        channels: Vec<ChannelSettings>,
        outbound: Arc<dyn Outbound>,
        archive: Option<Arc<dyn Archive>>,
        users: Arc<UserDirectory>,
        options: SupervisorOptions,
    ) -> Self {
        let mut queues = HashMap::new();
        let mut counters = JoinSet::new();

        for settings in channels {
            let channel_id = settings.channel_id.clone();
            let (tx, rx) = mpsc::channel(options.queue_capacity.max(1));
            let counter = ChannelCounter::new(
                settings,
                outbound.clone(),
                archive.clone(),
                users.clone(),
            )
            .with_tick_period(options.tick_period);

            let task_channel = channel_id.clone();
            counters.spawn(async move { (task_channel, counter.run(rx).await) });
            if queues.insert(channel_id.clone(), tx).is_some() {
                warn!(channel = %channel_id, "Channel configured twice; keeping the last entry");
            }
        }

        info!(channels = queues.len(), "Supervisor started");
        Self {
            router: IngressRouter {
                queues: Arc::new(queues),
            },
            counters,
        }
    }

    pub fn router(&self) -> IngressRouter {
        self.router.clone()
    }

    pub fn channel_count(&self) -> usize {
        self.router.queues.len()
    }

    /// Wait for the counters.
    ///
    /// Returns once every router handle is dropped and the counters drain,
    /// or with the first fatal error a counter reports.
    pub async fn run(self) -> Result<(), MonkError> {
        let Supervisor {
            router,
            mut counters,
        } = self;
        drop(router);

        while let Some(joined) = counters.join_next().await {
            match joined {
                Ok((channel, Ok(()))) => info!(channel = %channel, "Counter finished"),
                Ok((channel, Err(e))) => {
                    error!(channel = %channel, error = %e, "Counter failed; stopping all counters");
                    counters.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    counters.abort_all();
                    return Err(MonkError::Other(anyhow!("counter task panicked: {e}")));
                }
            }
        }

        info!("All counters stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use wisemonk_core::OutgoingMessage;

    #[derive(Default)]
    struct Collect(Mutex<Vec<OutgoingMessage>>);

    #[async_trait]
    impl Outbound for Collect {
        async fn send(&self, message: OutgoingMessage) -> Result<(), MonkError> {
            self.0.lock().unwrap().push(message);
            Ok(())
        }
    }

    fn settings(channel_id: &str) -> ChannelSettings {
        ChannelSettings {
            channel_id: channel_id.into(),
            window: Duration::from_secs(600),
            threshold: 20,
            search_over: vec![],
            create_topic_in: "Slack".into(),
        }
    }

    fn supervisor(outbound: Arc<Collect>) -> Supervisor {
        Supervisor::spawn(
            vec![settings("C1"), settings("C2")],
            outbound,
            None,
            Arc::new(UserDirectory::default()),
            SupervisorOptions::default(),
        )
    }

    #[tokio::test]
    async fn routes_by_channel_and_drops_unknown() {
        let outbound = Arc::new(Collect::default());
        let sup = supervisor(outbound.clone());
        let router = sup.router();
        assert_eq!(sup.channel_count(), 2);

        let routed = router
            .route(ChatMessage::new("C2", "U1", "1700000000.1", "wisemonk meditate for 5m"))
            .await
            .unwrap();
        assert!(routed);
        assert!(!router
            .route(ChatMessage::new("C9", "U1", "1700000000.1", "hello"))
            .await
            .unwrap());

        drop(router);
        sup.run().await.unwrap();

        let sent = outbound.0.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].channel_id, "C2");
        assert_eq!(sent[0].text, "Okay, I am going to meditate for 5m0s");
    }

    #[tokio::test]
    async fn fatal_counter_error_stops_the_supervisor() {
        let sup = supervisor(Arc::new(Collect::default()));
        let router = sup.router();

        router
            .route(ChatMessage::new("C1", "U1", "garbage", "hello"))
            .await
            .unwrap();

        let err = sup.run().await.unwrap_err();
        assert!(matches!(err, MonkError::InvalidTimestamp(ts) if ts == "garbage"));
    }

    #[tokio::test]
    async fn forward_drains_the_ingress_queue() {
        let outbound = Arc::new(Collect::default());
        let sup = supervisor(outbound.clone());
        let (ingress_tx, ingress_rx) = mpsc::channel(8);
        let forwarder = tokio::spawn(sup.router().forward(ingress_rx));

        ingress_tx
            .send(ChatMessage::new("C1", "U1", "1700000000.5", "wisemonk meditate for 90s"))
            .await
            .unwrap();
        drop(ingress_tx);

        forwarder.await.unwrap().unwrap();
        sup.run().await.unwrap();
        assert_eq!(
            outbound.0.lock().unwrap()[0].text,
            "Okay, I am going to meditate for 1m30s"
        );
    }
}
