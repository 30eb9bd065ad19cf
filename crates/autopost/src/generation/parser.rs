//! Tagged-section parser for drafting responses.
//!
//! A response carries up to three sections, each opened by a label. Labels
//! are only recognized in their fixed order, so a `TOPIC:` that appears inside
//! the post body is treated as post text. A label opens a section at the start
//! of a line in any case, or mid-line when written in capitals.

use regex::Regex;
use std::sync::OnceLock;

/// Opens the alignment rationale section.
pub const ALIGNMENT_LABEL: &str = "ALIGNMENT:";
/// Opens the restated topic section.
pub const TOPIC_LABEL: &str = "TOPIC:";
/// Opens the post text section.
pub const POST_LABEL: &str = "POST:";

/// Minimum trimmed length of an acceptable draft, in characters.
pub const MIN_DRAFT_CHARS: usize = 10;

/// A section of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Alignment,
    Topic,
    Post,
}

impl Section {
    const ORDER: [Section; 3] = [Section::Alignment, Section::Topic, Section::Post];

    /// Label that opens this section.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Alignment => ALIGNMENT_LABEL,
            Self::Topic => TOPIC_LABEL,
            Self::Post => POST_LABEL,
        }
    }

    /// Section named by a label word, in any case.
    fn from_word(word: &str) -> Option<Self> {
        Self::ORDER
            .into_iter()
            .find(|s| s.label().trim_end_matches(':').eq_ignore_ascii_case(word))
    }

    const fn index(self) -> usize {
        match self {
            Self::Alignment => 0,
            Self::Topic => 1,
            Self::Post => 2,
        }
    }
}

/// Sections extracted from one response. Each is independent of the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedResponse {
    pub alignment: Option<String>,
    pub topic: Option<String>,
    pub post: Option<String>,
}

/// Why a draft was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftRejection {
    /// No post section, or it was empty.
    Missing,
    /// Fewer than [`MIN_DRAFT_CHARS`] characters after trimming.
    TooShort,
    /// Contains a question mark.
    ContainsQuestion,
    /// Contains the word "error" in any case.
    ContainsError,
}

impl std::fmt::Display for DraftRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::Missing => "no post section",
            Self::TooShort => "too short",
            Self::ContainsQuestion => "contains a question mark",
            Self::ContainsError => "contains \"error\"",
        };
        f.write_str(reason)
    }
}

/// Label word, optionally wrapped in markdown emphasis, followed by a colon.
fn label_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)(?:^|[^a-z0-9])(?P<label>[*_]*(?P<word>alignment|topic|post)[*_]*[ \t]*:[*_]*)",
        )
        .expect("valid regex")
    })
}

/// Parse a drafting response into its labeled sections.
#[must_use]
pub fn parse_response(text: &str) -> ParsedResponse {
    let mut spans: [Option<(usize, usize)>; 3] = [None; 3];
    // Open section and the offset its content starts at.
    let mut open: Option<(Section, usize)> = None;

    for caps in label_pattern().captures_iter(text) {
        let (Some(whole), Some(word)) = (caps.name("label"), caps.name("word")) else {
            continue;
        };
        let Some(section) = Section::from_word(word.as_str()) else {
            continue;
        };
        if open.is_some_and(|(current, _)| section <= current) {
            continue;
        }
        if !starts_line(text, whole.start()) && !is_upper(word.as_str()) {
            continue;
        }

        if let Some((current, from)) = open {
            spans[current.index()] = Some((from, whole.start()));
        }
        open = Some((section, whole.end()));
    }
    if let Some((current, from)) = open {
        spans[current.index()] = Some((from, text.len()));
    }

    let [alignment, topic, post] = spans.map(|span| {
        span.map(|(from, to)| text[from..to].trim().to_string())
            .filter(|s| !s.is_empty())
    });

    ParsedResponse {
        alignment,
        topic,
        post,
    }
}

/// Whether only whitespace or markdown markers precede `at` on its line.
fn starts_line(text: &str, at: usize) -> bool {
    let line_start = text[..at].rfind('\n').map_or(0, |i| i + 1);
    text[line_start..at]
        .chars()
        .all(|c| c.is_whitespace() || matches!(c, '*' | '#' | '_'))
}

/// Mid-line labels must be written in capitals.
fn is_upper(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_uppercase())
}

/// Check a draft against the acceptance heuristics.
pub fn validate_draft(draft: &str) -> Result<(), DraftRejection> {
    let trimmed = draft.trim();
    if trimmed.chars().count() < MIN_DRAFT_CHARS {
        return Err(DraftRejection::TooShort);
    }
    if trimmed.contains('?') {
        return Err(DraftRejection::ContainsQuestion);
    }
    if trimmed.to_lowercase().contains("error") {
        return Err(DraftRejection::ContainsError);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_sections() {
        let response = "ALIGNMENT: Fits the calm, practical voice.\n\
                        TOPIC: Vector databases\n\
                        POST: Vector databases index embeddings.\n\nThey trade recall for speed.";

        let parsed = parse_response(response);
        assert_eq!(
            parsed.alignment.as_deref(),
            Some("Fits the calm, practical voice.")
        );
        assert_eq!(parsed.topic.as_deref(), Some("Vector databases"));
        assert_eq!(
            parsed.post.as_deref(),
            Some("Vector databases index embeddings.\n\nThey trade recall for speed.")
        );
    }

    #[test]
    fn test_missing_alignment_still_yields_topic_and_post() {
        let parsed = parse_response("TOPIC: Prompt caching\nPOST: Caching prompts cuts latency a lot.");
        assert!(parsed.alignment.is_none());
        assert_eq!(parsed.topic.as_deref(), Some("Prompt caching"));
        assert_eq!(
            parsed.post.as_deref(),
            Some("Caching prompts cuts latency a lot.")
        );
    }

    #[test]
    fn test_missing_topic_keeps_alignment_and_post_separate() {
        let parsed = parse_response("ALIGNMENT: ok\nPOST: Body text that is long enough.");
        assert_eq!(parsed.alignment.as_deref(), Some("ok"));
        assert!(parsed.topic.is_none());
        assert_eq!(parsed.post.as_deref(), Some("Body text that is long enough."));
    }

    #[test]
    fn test_multiline_sections_and_markdown_labels() {
        let response = "**ALIGNMENT:** first line\nsecond line\n\n**TOPIC:** Agents\n\n**POST:**\nLine one.\n\nLine two.";
        let parsed = parse_response(response);
        assert_eq!(parsed.alignment.as_deref(), Some("first line\nsecond line"));
        assert_eq!(parsed.topic.as_deref(), Some("Agents"));
        assert_eq!(parsed.post.as_deref(), Some("Line one.\n\nLine two."));
    }

    #[test]
    fn test_labels_on_a_single_line() {
        let parsed =
            parse_response("ALIGNMENT: fits. TOPIC: Agents POST: Agents are eating the toolchain now.");
        assert_eq!(parsed.alignment.as_deref(), Some("fits."));
        assert_eq!(parsed.topic.as_deref(), Some("Agents"));
        assert_eq!(
            parsed.post.as_deref(),
            Some("Agents are eating the toolchain now.")
        );
    }

    #[test]
    fn test_bold_labels_with_colon_outside() {
        let parsed = parse_response(
            "**ALIGNMENT**: fits\n**TOPIC**: Agents\n__POST__: Agents are eating the toolchain now.",
        );
        assert_eq!(parsed.alignment.as_deref(), Some("fits"));
        assert_eq!(parsed.topic.as_deref(), Some("Agents"));
        assert_eq!(
            parsed.post.as_deref(),
            Some("Agents are eating the toolchain now.")
        );
    }

    #[test]
    fn test_lowercase_words_mid_line_are_not_labels() {
        let parsed = parse_response(
            "Alignment: the topic: fits the voice\nPost: This post: covers agent tooling.",
        );
        assert_eq!(parsed.alignment.as_deref(), Some("the topic: fits the voice"));
        assert!(parsed.topic.is_none());
        assert_eq!(parsed.post.as_deref(), Some("This post: covers agent tooling."));
    }

    #[test]
    fn test_labels_out_of_order_stay_in_body() {
        let response = "POST: The word topic: appears here.\nTOPIC: still body text";
        let parsed = parse_response(response);
        assert!(parsed.topic.is_none());
        assert_eq!(
            parsed.post.as_deref(),
            Some("The word topic: appears here.\nTOPIC: still body text")
        );
    }

    #[test]
    fn test_empty_and_unlabeled_responses() {
        assert_eq!(parse_response(""), ParsedResponse::default());
        assert_eq!(
            parse_response("Just some prose without labels."),
            ParsedResponse::default()
        );
        assert!(parse_response("TOPIC:\nPOST:   ").post.is_none());
    }

    #[test]
    fn test_length_boundary() {
        assert_eq!(validate_draft("123456789"), Err(DraftRejection::TooShort));
        assert_eq!(validate_draft("1234567890"), Ok(()));
        assert_eq!(validate_draft("   123456789   "), Err(DraftRejection::TooShort));
    }

    #[test]
    fn test_question_mark_always_rejected() {
        assert_eq!(
            validate_draft("A long, thoughtful and otherwise excellent post. Right?"),
            Err(DraftRejection::ContainsQuestion)
        );
        assert_eq!(
            validate_draft("?abcdefghijklmnop"),
            Err(DraftRejection::ContainsQuestion)
        );
    }

    #[test]
    fn test_error_substring_rejected_case_insensitively() {
        assert_eq!(
            validate_draft("An ERROR occurred while generating."),
            Err(DraftRejection::ContainsError)
        );
        assert_eq!(
            validate_draft("Terrorform is a terrible name."),
            Err(DraftRejection::ContainsError)
        );
    }
}
