/// Command intents extracted from chat text.
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pause rejections
// ---------------------------------------------------------------------------

/// Why a pause request was turned down. `Display` is the reply sent to the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseRejection {
    /// The duration could not be parsed.
    Unparseable,
    Negative,
    /// An hour or more.
    TooLong,
}

impl fmt::Display for PauseRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reply = match self {
            PauseRejection::Unparseable => "Sorry, I don't understand you.",
            PauseRejection::Negative => "Sorry, going back in time is not what I can do.",
            PauseRejection::TooLong => {
                "It's hard to meditate for more than an hour at one go you know."
            }
        };
        f.write_str(reply)
    }
}

// ---------------------------------------------------------------------------
// Intent
// ---------------------------------------------------------------------------

/// The single intent extracted from one message. Produced fresh per message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandIntent {
    /// Plain chatter.
    None,
    /// Suspend threshold alerts for `duration` (always under an hour).
    Pause { duration: Duration },
    PauseRejected { reason: PauseRejection },
    /// Archive the current transcript under `title`.
    Archive { title: String },
    Search { query: String, max_results: usize },
    /// The result count of a search did not fit.
    SearchRejected,
}

impl CommandIntent {
    pub fn is_none(&self) -> bool {
        matches!(self, CommandIntent::None)
    }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            CommandIntent::None => "none",
            CommandIntent::Pause { .. } => "pause",
            CommandIntent::PauseRejected { .. } => "pause_rejected",
            CommandIntent::Archive { .. } => "archive",
            CommandIntent::Search { .. } => "search",
            CommandIntent::SearchRejected => "search_rejected",
        }
    }
}

/// Reply for a search whose result count could not be read.
pub const SEARCH_NOT_UNDERSTOOD: &str = "Sorry, I didn't understand you.";
