use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Slack-style user mention, e.g. `<@U13LHF42F>`.
static MENTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<@(U[A-Z0-9]{8})>").expect("mention pattern is valid")
});

/// Width of the name column in transcript lines.
const NAME_COLUMN_WIDTH: usize = 14;

/// Immutable user id → display name map, loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    names: HashMap<String, String>,
}

impl UserDirectory {
    pub fn new(names: HashMap<String, String>) -> Self {
        Self { names }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn resolve(&self, user_id: &str) -> Option<&str> {
        self.names.get(user_id).map(String::as_str)
    }

    /// Replace known `<@Uxxxxxxxx>` mentions with `@name`; unknown ids stay as they are.
    pub fn substitute_mentions(&self, text: &str) -> String {
        MENTION_RE
            .replace_all(text, |caps: &Captures| match self.resolve(&caps[1]) {
                Some(name) => format!("@{name}"),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// One transcript line: padded author name, then the mention-substituted text.
    pub fn format_line(&self, user_id: &str, text: &str) -> String {
        let name = self.resolve(user_id).unwrap_or_default();
        format!(
            "{:<width$}: {}",
            name,
            self.substitute_mentions(text),
            width = NAME_COLUMN_WIDTH
        )
    }
}

impl FromIterator<(String, String)> for UserDirectory {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
