/// Command detection: classify one message's text into a [`CommandIntent`].
///
/// Patterns are tried in a fixed order (search, archive, pause) and the first
/// one that matches wins, even when a later one would match too.
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::debug;
use wisemonk_core::parse_duration;

use crate::types::{CommandIntent, PauseRejection};

static SEARCH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wisemonk query (.+) (\d+)").unwrap());
static ARCHIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wisemonk create topic (.+)").unwrap());
static PAUSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"wisemonk meditate for (.+)").unwrap());

/// Pauses of an hour or more are refused.
pub const MAX_PAUSE: Duration = Duration::from_secs(60 * 60);

/// Classify `text`. Returns [`CommandIntent::None`] for ordinary messages.
pub fn detect_command(text: &str) -> CommandIntent {
    let intent = detect_search(text)
        .or_else(|| detect_archive(text))
        .or_else(|| detect_pause(text))
        .unwrap_or(CommandIntent::None);
    if !intent.is_none() {
        debug!(kind = intent.kind(), "Detected command");
    }
    intent
}

fn detect_search(text: &str) -> Option<CommandIntent> {
    let caps = SEARCH_RE.captures(text)?;
    let intent = match caps[2].parse::<usize>() {
        Ok(max_results) => CommandIntent::Search {
            query: caps[1].to_string(),
            max_results,
        },
        Err(_) => CommandIntent::SearchRejected,
    };
    Some(intent)
}

fn detect_archive(text: &str) -> Option<CommandIntent> {
    let caps = ARCHIVE_RE.captures(text)?;
    Some(CommandIntent::Archive {
        title: caps[1].to_string(),
    })
}

fn detect_pause(text: &str) -> Option<CommandIntent> {
    let caps = PAUSE_RE.captures(text)?;
    Some(classify_pause(&caps[1]))
}

/// Validate a requested pause duration.
pub fn classify_pause(raw: &str) -> CommandIntent {
    let reason = match parse_duration(raw) {
        Err(_) => PauseRejection::Unparseable,
        Ok(d) if d.is_negative() => PauseRejection::Negative,
        Ok(d) => match d.to_std() {
            Some(duration) if duration < MAX_PAUSE => {
                return CommandIntent::Pause { duration };
            }
            _ => PauseRejection::TooLong,
        },
    };
    CommandIntent::PauseRejected { reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejection(text: &str) -> String {
        match detect_command(text) {
            CommandIntent::PauseRejected { reason } => reason.to_string(),
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[test]
    fn ordinary_text_is_not_a_command() {
        assert_eq!(detect_command("good morning"), CommandIntent::None);
        assert_eq!(detect_command("wisemonk meditat for 1hr"), CommandIntent::None);
        assert_eq!(detect_command("wisemonk search something"), CommandIntent::None);
        assert_eq!(detect_command("wisemonk query test"), CommandIntent::None);
    }

    #[test]
    fn pause_rejections_use_exact_replies() {
        assert_eq!(rejection("wisemonk meditate for 1hr"), "Sorry, I don't understand you.");
        assert_eq!(
            rejection("wisemonk meditate for -5m"),
            "Sorry, going back in time is not what I can do."
        );
        assert_eq!(
            rejection("wisemonk meditate for 200h"),
            "It's hard to meditate for more than an hour at one go you know."
        );
        assert_eq!(
            rejection("wisemonk meditate for 1h"),
            "It's hard to meditate for more than an hour at one go you know."
        );
    }

    #[test]
    fn accepted_pause_carries_the_duration() {
        assert_eq!(
            detect_command("hey wisemonk meditate for 5m"),
            CommandIntent::Pause {
                duration: Duration::from_secs(300)
            }
        );
        assert_eq!(
            detect_command("wisemonk meditate for 59m59s"),
            CommandIntent::Pause {
                duration: Duration::from_secs(3599)
            }
        );
    }

    #[test]
    fn archive_takes_the_rest_of_the_line_as_title() {
        assert_eq!(
            detect_command("wisemonk create topic testing wisemonk"),
            CommandIntent::Archive {
                title: "testing wisemonk".into()
            }
        );
    }

    #[test]
    fn search_extracts_query_and_count() {
        assert_eq!(
            detect_command("wisemonk query rust async runtimes 3"),
            CommandIntent::Search {
                query: "rust async runtimes".into(),
                max_results: 3
            }
        );
        assert_eq!(
            detect_command("wisemonk query anything 99999999999999999999999"),
            CommandIntent::SearchRejected
        );
    }

    #[test]
    fn search_wins_over_other_patterns() {
        let text = "wisemonk query wisemonk meditate for 5m 2";
        assert!(matches!(detect_command(text), CommandIntent::Search { .. }));
        let text = "wisemonk create topic wisemonk meditate for 5m";
        assert!(matches!(detect_command(text), CommandIntent::Archive { .. }));
    }
}
