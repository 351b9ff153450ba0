use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use wisemonk_commands::{detect_command, CommandIntent, SEARCH_NOT_UNDERSTOOD};
use wisemonk_core::{
    format_duration, sanitize_title, Archive, ChatMessage, MonkError, Outbound, UserDirectory,
};
use wisemonk_logging::{MonitorEvent, MonitorEventLogger};

use crate::bucket::BucketStore;
use crate::meditation::{minutes_label, Meditation};
use crate::notifier::Notifier;

/// How often the counter checks its window against the threshold.
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(10);

/// Shorter tick periods are raised to this.
pub const MIN_TICK_PERIOD: Duration = Duration::from_secs(1);

const NOTHING_FOUND: &str = "Sorry, I didn't find anything.";
const TOPIC_FAILED: &str = "Sorry, I could not create the topic.";

/// Per-channel monitoring settings.
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub channel_id: String,
    /// Trailing window activity is counted over.
    pub window: Duration,
    /// Message count that triggers an alert once reached.
    pub threshold: usize,
    /// Archive categories searches are restricted to.
    pub search_over: Vec<String>,
    /// Archive category new topics go into.
    pub create_topic_in: String,
}

/// The activity counter of one channel.
///
/// All state is owned by the dispatch loop in [`ChannelCounter::run`]: messages,
/// ticks and the meditation wake-up are handled one at a time, so the bucket
/// store and the meditation deadline never need a lock.
pub struct ChannelCounter {
    settings: ChannelSettings,
    store: BucketStore,
    meditation: Meditation,
    outbound: Arc<dyn Outbound>,
    archive: Option<Arc<dyn Archive>>,
    users: Arc<UserDirectory>,
    notifier: Arc<Notifier>,
    tick_period: Duration,
}

impl ChannelCounter {
    pub fn new(
        settings: ChannelSettings,
        outbound: Arc<dyn Outbound>,
        archive: Option<Arc<dyn Archive>>,
        users: Arc<UserDirectory>,
    ) -> Self {
        let notifier = Arc::new(Notifier::new(
            settings.channel_id.clone(),
            outbound.clone(),
            archive.clone(),
            settings.create_topic_in.clone(),
        ));
        Self {
            settings,
            store: BucketStore::new(),
            meditation: Meditation::new(),
            outbound,
            archive,
            users,
            notifier,
            tick_period: DEFAULT_TICK_PERIOD,
        }
    }

    pub fn with_tick_period(mut self, period: Duration) -> Self {
        self.tick_period = period.max(MIN_TICK_PERIOD);
        self
    }

    pub fn tick_period(&self) -> Duration {
        self.tick_period
    }

    pub fn channel_id(&self) -> &str {
        &self.settings.channel_id
    }

    pub fn store(&self) -> &BucketStore {
        &self.store
    }

    pub fn is_meditating(&self) -> bool {
        self.meditation.is_active(Instant::now())
    }

    /// Dispatch loop. Returns when the queue closes, or with the first fatal error.
    pub async fn run(mut self, mut rx: mpsc::Receiver<ChatMessage>) -> Result<(), MonkError> {
        info!(
            channel = %self.settings.channel_id,
            window_secs = self.settings.window.as_secs(),
            threshold = self.settings.threshold,
            "Channel counter started"
        );

        let mut ticker = time::interval_at(Instant::now() + self.tick_period, self.tick_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let wake_at = self.meditation.wake_at();
            tokio::select! {
                msg = rx.recv() => {
                    let Some(msg) = msg else {
                        info!(channel = %self.settings.channel_id, "Counter queue closed, shutting down");
                        break;
                    };
                    if let Err(e) = self.handle_message(msg).await {
                        error!(channel = %self.settings.channel_id, error = %e, "Counter stopped by fatal input");
                        return Err(e);
                    }
                }
                _ = ticker.tick() => {
                    self.on_tick(Utc::now().timestamp());
                }
                _ = time::sleep_until(wake_at.unwrap_or_else(Instant::now)), if wake_at.is_some() => {
                    self.on_meditation_end();
                }
            }
        }

        Ok(())
    }

    /// Act on any command in `msg`, then record it.
    ///
    /// Channel mismatches and malformed timestamps are fatal.
    pub async fn handle_message(&mut self, msg: ChatMessage) -> Result<(), MonkError> {
        if msg.channel_id != self.settings.channel_id {
            return Err(MonkError::ChannelMismatch {
                expected: self.settings.channel_id.clone(),
                got: msg.channel_id,
            });
        }
        let ts = msg.unix_seconds()?;

        match detect_command(&msg.text) {
            CommandIntent::None => {}
            CommandIntent::Search { query, max_results } => self.search(&query, max_results).await,
            CommandIntent::SearchRejected => {
                if self.archive.is_some() {
                    self.reply(SEARCH_NOT_UNDERSTOOD).await;
                }
            }
            CommandIntent::Archive { title } => self.archive_activity(&title).await,
            CommandIntent::Pause { duration } => self.meditate(duration).await,
            CommandIntent::PauseRejected { reason } => self.reply(&reason.to_string()).await,
        }

        // The command message itself is part of the activity.
        let line = self.users.format_line(&msg.user_id, &msg.text);
        self.store.record(ts, line);
        Ok(())
    }

    /// Threshold check. When it fires, the store is handed to a notifier task
    /// and this counter starts over empty; the task's handle is returned.
    pub fn on_tick(&mut self, now: i64) -> Option<JoinHandle<()>> {
        if self.meditation.is_active(Instant::now()) {
            debug!(channel = %self.settings.channel_id, "Meditating, skipping threshold check");
            return None;
        }
        // A deadline that passed without its wake-up having run yet.
        if self.meditation.wake_at().is_some() {
            self.on_meditation_end();
        }

        let count = self.store.count(now, self.settings.window);
        if count < self.settings.threshold {
            return None;
        }

        MonitorEventLogger::log_event(
            &self.settings.channel_id,
            MonitorEvent::ThresholdReached {
                count,
                threshold: self.settings.threshold,
            },
        );
        let claimed = std::mem::take(&mut self.store);
        let notifier = self.notifier.clone();
        Some(tokio::spawn(async move { notifier.alert(claimed).await }))
    }

    /// Deferred pause expiry: resume with an empty window.
    pub fn on_meditation_end(&mut self) {
        self.meditation.finish();
        self.store.clear();
        MonitorEventLogger::log_event(&self.settings.channel_id, MonitorEvent::MeditationEnded);
    }

    async fn meditate(&mut self, duration: Duration) {
        let now = Instant::now();
        if let Some(remaining) = self.meditation.remaining(now) {
            let text = format!(
                "I am meditating. My meditation will finish in {} mins",
                minutes_label(remaining)
            );
            self.reply(&text).await;
            return;
        }

        self.meditation.start(now, duration);
        MonitorEventLogger::log_event(
            &self.settings.channel_id,
            MonitorEvent::MeditationStarted {
                seconds: duration.as_secs(),
            },
        );
        let text = format!("Okay, I am going to meditate for {}", format_duration(duration));
        self.reply(&text).await;
    }

    async fn archive_activity(&mut self, title: &str) {
        if !self.notifier.has_archive() {
            debug!(channel = %self.settings.channel_id, "No archive configured, ignoring create topic");
            return;
        }

        let title = sanitize_title(title);
        let reply = match self.notifier.create_topic(&title, &self.store).await {
            Ok(url) => {
                MonitorEventLogger::log_event(
                    &self.settings.channel_id,
                    MonitorEvent::TopicCreated { url: url.clone() },
                );
                format!("New topic created with url: {url}")
            }
            Err(e) => {
                warn!(channel = %self.settings.channel_id, error = %e, "Failed to create topic");
                TOPIC_FAILED.to_string()
            }
        };
        self.store.clear();
        self.reply(&reply).await;
    }

    async fn search(&self, query: &str, max_results: usize) {
        let Some(archive) = &self.archive else {
            debug!(channel = %self.settings.channel_id, "No archive configured, ignoring query");
            return;
        };

        let links = match archive
            .search(query, &self.settings.search_over, max_results)
            .await
        {
            Ok(links) => links,
            Err(e) => {
                warn!(channel = %self.settings.channel_id, error = %e, "Archive search failed");
                Vec::new()
            }
        };
        let found: String = links
            .iter()
            .take(max_results)
            .map(|link| format!("{}\n", link.url))
            .collect();

        MonitorEventLogger::log_event(
            &self.settings.channel_id,
            MonitorEvent::SearchServed {
                query: query.to_string(),
                results: links.len().min(max_results),
            },
        );
        if found.is_empty() {
            self.reply(NOTHING_FOUND).await;
        } else {
            self.reply(&found).await;
        }
    }

    async fn reply(&self, text: &str) {
        let message = self.outbound.compose_outgoing(text, &self.settings.channel_id);
        if let Err(e) = self.outbound.send(message).await {
            warn!(channel = %self.settings.channel_id, error = %e, "Failed to send reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeArchive, RecordingOutbound};

    const CHANNEL: &str = "general";

    fn settings(threshold: usize) -> ChannelSettings {
        ChannelSettings {
            channel_id: CHANNEL.into(),
            window: Duration::from_secs(600),
            threshold,
            search_over: vec!["Users".into()],
            create_topic_in: "Slack".into(),
        }
    }

    fn counter(
        threshold: usize,
        outbound: Arc<RecordingOutbound>,
        archive: Option<Arc<FakeArchive>>,
    ) -> ChannelCounter {
        let users: UserDirectory = [("U13LHF42F".to_string(), "mrjn".to_string())]
            .into_iter()
            .collect();
        ChannelCounter::new(
            settings(threshold),
            outbound,
            archive.map(|a| a as Arc<dyn Archive>),
            Arc::new(users),
        )
    }

    fn message_at(ts: i64, text: &str) -> ChatMessage {
        ChatMessage::new(CHANNEL, "U13LHF42F", format!("{ts}.000606"), text)
    }

    fn message(text: &str) -> ChatMessage {
        message_at(Utc::now().timestamp(), text)
    }

    #[tokio::test]
    async fn records_formatted_messages() {
        let outbound = Arc::new(RecordingOutbound::default());
        let mut counter = counter(20, outbound.clone(), None);

        counter.handle_message(message_at(1465010249, "hi <@U13LHF42F>")).await.unwrap();
        counter.handle_message(message_at(1465010249, "again")).await.unwrap();

        let buckets = counter.store().buckets();
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 2);
        assert_eq!(buckets[0].messages[0], "mrjn          : hi @mrjn");
        assert!(outbound.sent().is_empty());
    }

    #[tokio::test]
    async fn mismatched_channel_is_fatal() {
        let mut counter = counter(20, Arc::new(RecordingOutbound::default()), None);
        let msg = ChatMessage::new("random", "U1", "1465010249.000606", "hello");
        let err = counter.handle_message(msg).await.unwrap_err();
        assert!(matches!(err, MonkError::ChannelMismatch { .. }));
        assert!(counter.store().is_empty());
    }

    #[tokio::test]
    async fn malformed_timestamp_is_fatal() {
        let mut counter = counter(20, Arc::new(RecordingOutbound::default()), None);
        let msg = ChatMessage::new(CHANNEL, "U1", "not-a-time", "hello");
        let err = counter.handle_message(msg).await.unwrap_err();
        assert!(matches!(err, MonkError::InvalidTimestamp(_)));
    }

    #[tokio::test]
    async fn pause_replies() {
        let outbound = Arc::new(RecordingOutbound::default());
        let mut counter = counter(20, outbound.clone(), None);

        for text in [
            "wisemonk meditat for 1hr",
            "wisemonk meditate for 1hr",
            "wisemonk meditate for 200h",
            "wisemonk meditate for -5m",
            "wisemonk meditate for 5m",
            "wisemonk meditate for 5m",
        ] {
            counter.handle_message(message(text)).await.unwrap();
        }

        assert_eq!(
            outbound.texts(),
            vec![
                "Sorry, I don't understand you.",
                "It's hard to meditate for more than an hour at one go you know.",
                "Sorry, going back in time is not what I can do.",
                "Okay, I am going to meditate for 5m0s",
                "I am meditating. My meditation will finish in 5 mins",
            ]
        );
        assert!(counter.is_meditating());
        // Commands are still recorded as activity.
        assert_eq!(counter.store().buckets().iter().map(|b| b.count).sum::<usize>(), 6);
    }

    #[tokio::test]
    async fn tick_fires_one_alert_and_empties_the_store() {
        let outbound = Arc::new(RecordingOutbound::default());
        let mut counter = counter(20, outbound.clone(), None);
        let now = Utc::now().timestamp();
        for i in 0..20 {
            counter.handle_message(message_at(now - i, "busy")).await.unwrap();
        }
        assert_eq!(counter.store().len(), 20);

        let handle = counter.on_tick(now).expect("threshold reached");
        assert!(counter.store().is_empty());
        handle.await.unwrap();

        assert_eq!(outbound.sent().len(), 1);
        assert!(counter.on_tick(now).is_none());
        assert_eq!(outbound.sent().len(), 1);
    }

    #[tokio::test]
    async fn tick_below_threshold_only_compacts() {
        let outbound = Arc::new(RecordingOutbound::default());
        let mut counter = counter(20, outbound.clone(), None);
        let now = Utc::now().timestamp();
        for i in 0..10 {
            counter.handle_message(message_at(now - i, "new")).await.unwrap();
            counter.handle_message(message_at(now - 600 - i, "old")).await.unwrap();
        }

        assert!(counter.on_tick(now).is_none());
        assert_eq!(counter.store().len(), 10);
        assert!(outbound.sent().is_empty());
    }

    #[tokio::test]
    async fn tick_is_silent_while_meditating() {
        let outbound = Arc::new(RecordingOutbound::default());
        let mut counter = counter(3, outbound.clone(), None);
        counter.handle_message(message("wisemonk meditate for 10m")).await.unwrap();
        for _ in 0..5 {
            counter.handle_message(message("chatter")).await.unwrap();
        }

        assert!(counter.on_tick(Utc::now().timestamp()).is_none());
        assert_eq!(counter.store().buckets().iter().map(|b| b.count).sum::<usize>(), 6);
        assert_eq!(outbound.sent().len(), 1);

        counter.on_meditation_end();
        assert!(counter.store().is_empty());
    }

    #[tokio::test]
    async fn archive_command_posts_transcript_and_clears() {
        let outbound = Arc::new(RecordingOutbound::default());
        let archive = Arc::new(FakeArchive::with_url("https://forum.example/t/testing/7"));
        let mut counter = counter(20, outbound.clone(), Some(archive.clone()));

        counter.handle_message(message("first thought")).await.unwrap();
        counter
            .handle_message(message("wisemonk create topic testing wisemonk"))
            .await
            .unwrap();

        let created = archive.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].title, "Topic created by wisemonk with title: testing wisemonk");
        assert_eq!(created[0].raw, "```[ 1] mrjn          : first thought\n```");
        assert_eq!(created[0].category, "Slack");
        assert_eq!(
            outbound.texts(),
            vec!["New topic created with url: https://forum.example/t/testing/7"]
        );
        // Only the command message survives the clear.
        assert_eq!(counter.store().len(), 1);
    }

    #[tokio::test]
    async fn archive_failure_is_reported() {
        let outbound = Arc::new(RecordingOutbound::default());
        let archive = Arc::new(FakeArchive::failing());
        let mut counter = counter(20, outbound.clone(), Some(archive));

        counter.handle_message(message("wisemonk create topic x")).await.unwrap();
        assert_eq!(outbound.texts(), vec![TOPIC_FAILED]);
    }

    #[tokio::test]
    async fn search_lists_links_up_to_the_bound() {
        let outbound = Arc::new(RecordingOutbound::default());
        let archive = Arc::new(
            FakeArchive::default().with_results(&["https://f/t/a/1", "https://f/t/b/2", "https://f/t/c/3"]),
        );
        let mut counter = counter(20, outbound.clone(), Some(archive.clone()));

        counter.handle_message(message("wisemonk query async 2")).await.unwrap();

        assert_eq!(outbound.texts(), vec!["https://f/t/a/1\nhttps://f/t/b/2\n"]);
        assert_eq!(
            archive.searches(),
            vec![("async".to_string(), vec!["Users".to_string()], 2)]
        );
    }

    #[tokio::test]
    async fn empty_search_says_so() {
        let outbound = Arc::new(RecordingOutbound::default());
        let archive = Arc::new(FakeArchive::default());
        let mut counter = counter(20, outbound.clone(), Some(archive));

        counter.handle_message(message("wisemonk query nothing 3")).await.unwrap();
        assert_eq!(outbound.texts(), vec![NOTHING_FOUND]);
    }

    #[tokio::test]
    async fn archive_commands_are_ignored_without_an_archive() {
        let outbound = Arc::new(RecordingOutbound::default());
        let mut counter = counter(20, outbound.clone(), None);

        counter.handle_message(message("wisemonk query async 2")).await.unwrap();
        counter.handle_message(message("wisemonk create topic title")).await.unwrap();

        assert!(outbound.sent().is_empty());
        assert_eq!(counter.store().buckets().iter().map(|b| b.count).sum::<usize>(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_alerts_on_tick() {
        let outbound = Arc::new(RecordingOutbound::default());
        let counter = counter(5, outbound.clone(), None);
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(counter.run(rx));

        for _ in 0..6 {
            tx.send(message("busy")).await.unwrap();
        }
        time::sleep(Duration::from_secs(11)).await;
        assert_eq!(outbound.sent().len(), 1);

        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(outbound.sent().len(), 1);

        drop(tx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn meditation_expiry_discards_earlier_activity() {
        let outbound = Arc::new(RecordingOutbound::default());
        let counter = counter(5, outbound.clone(), None);
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(counter.run(rx));

        tx.send(message("wisemonk meditate for 1m")).await.unwrap();
        for _ in 0..10 {
            tx.send(message("chatter")).await.unwrap();
        }

        // Ticks during the pause do not alert.
        time::sleep(Duration::from_secs(45)).await;
        assert_eq!(outbound.texts(), vec!["Okay, I am going to meditate for 1m0s"]);

        // The wake-up at 60s empties the window, so later ticks stay quiet.
        time::sleep(Duration::from_secs(30)).await;
        assert_eq!(outbound.sent().len(), 1);

        drop(tx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_tick_period_is_raised_to_the_minimum() {
        let outbound = Arc::new(RecordingOutbound::default());
        let counter = counter(5, outbound.clone(), None).with_tick_period(Duration::ZERO);
        assert_eq!(counter.tick_period(), MIN_TICK_PERIOD);

        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(counter.run(rx));
        for _ in 0..6 {
            tx.send(message("busy")).await.unwrap();
        }
        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(outbound.sent().len(), 1);

        drop(tx);
        handle.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn run_loop_ends_with_fatal_error() {
        let counter = counter(5, Arc::new(RecordingOutbound::default()), None);
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(counter.run(rx));

        tx.send(ChatMessage::new("random", "U1", "1.0", "hi")).await.unwrap();
        let result = handle.await.unwrap();
        assert!(matches!(result, Err(MonkError::ChannelMismatch { .. })));
    }
}
