//! Channel activity monitoring: sliding-window bucket counting, meditation
//! (paused alerting), and threshold alerts.

pub mod bucket;
pub mod counter;
pub mod meditation;
pub mod notifier;
pub mod proverbs;

#[cfg(test)]
pub(crate) mod testing;

pub use bucket::{Bucket, BucketStore};
pub use counter::{ChannelCounter, ChannelSettings, DEFAULT_TICK_PERIOD, MIN_TICK_PERIOD};
pub use meditation::Meditation;
pub use notifier::Notifier;
