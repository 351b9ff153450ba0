/// Archive topics need at least this many characters in the title.
pub const MIN_TITLE_CHARS: usize = 20;
/// Longest title the archive accepts.
pub const MAX_TITLE_CHARS: usize = 100;

const SHORT_TITLE_PREFIX: &str = "Topic created by wisemonk with title: ";

/// Make free text acceptable as an archive topic title.
///
/// Short titles get a fixed prefix. Longer ones are cut to
/// [`MAX_TITLE_CHARS`] and then back to the last word break, as long as that
/// break leaves at least [`MIN_TITLE_CHARS`] characters.
pub fn sanitize_title(raw: &str) -> String {
    let title = raw.trim();
    if title.chars().count() < MIN_TITLE_CHARS {
        return format!("{SHORT_TITLE_PREFIX}{title}");
    }

    let mut title: String = title.chars().take(MAX_TITLE_CHARS).collect();
    if let Some(idx) = title.rfind(' ') {
        if title[..idx].chars().count() >= MIN_TITLE_CHARS {
            title.truncate(idx);
        }
    }
    title
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_get_a_prefix() {
        assert_eq!(
            sanitize_title("Short title"),
            "Topic created by wisemonk with title: Short title"
        );
        assert_eq!(
            sanitize_title("          Short title"),
            "Topic created by wisemonk with title: Short title"
        );
    }

    #[test]
    fn twenty_characters_is_left_alone() {
        assert_eq!(sanitize_title("This title is 20char"), "This title is 20char");
    }

    #[test]
    fn cuts_at_the_last_word_break() {
        assert_eq!(
            sanitize_title("Long title with word breaks"),
            "Long title with word"
        );
    }

    #[test]
    fn long_titles_are_truncated() {
        let title = "This title has more than 100chars. It should be trimmed\n\tdown. \
                     We should avoid having long titles obviously";
        assert_eq!(
            sanitize_title(title),
            "This title has more than 100chars. It should be trimmed\n\tdown. \
             We should avoid having long titles"
        );
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let title = "é".repeat(120);
        assert_eq!(sanitize_title(&title).chars().count(), MAX_TITLE_CHARS);
    }
}
