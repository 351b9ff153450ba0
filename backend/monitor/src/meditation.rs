//! Pause ("meditation") state of one channel counter.

use std::time::Duration;

use tokio::time::Instant;

/// When monitoring resumes. Expiry is a pure time comparison; [`Meditation::wake_at`]
/// additionally exposes the deadline so the owner can run its wake-up action once.
#[derive(Debug, Clone, Default)]
pub struct Meditation {
    until: Option<Instant>,
}

impl Meditation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Instant, duration: Duration) -> Instant {
        let until = now + duration;
        self.until = Some(until);
        until
    }

    /// Time left, or `None` when not meditating at `now`.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.until
            .filter(|until| *until > now)
            .map(|until| until - now)
    }

    pub fn is_active(&self, now: Instant) -> bool {
        self.remaining(now).is_some()
    }

    /// Deadline whose wake-up action has not run yet.
    pub fn wake_at(&self) -> Option<Instant> {
        self.until
    }

    /// Mark the wake-up action as done.
    pub fn finish(&mut self) {
        self.until = None;
    }
}

/// Remaining time in whole minutes, rounded to the nearest minute.
pub fn minutes_label(remaining: Duration) -> String {
    format!("{:.0}", remaining.as_secs_f64() / 60.0)
}
