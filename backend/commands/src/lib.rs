pub mod detection;
pub mod types;

pub use detection::{classify_pause, detect_command, MAX_PAUSE};
pub use types::{CommandIntent, PauseRejection, SEARCH_NOT_UNDERSTOOD};
