//! Discourse archive for wisemonk: topic creation from channel transcripts
//! and category-restricted search.

pub mod client;
pub mod types;

pub use client::{DiscourseClient, DEFAULT_USERNAME};
