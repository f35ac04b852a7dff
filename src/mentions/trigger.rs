//! Trigger matching and live query detection
//!
//! A trigger regex is matched against the plain text immediately before the
//! caret. When it matches, the user is in the middle of typing a mention:
//! group 1 is the trigger+query sequence that a selected suggestion will
//! replace, group 2 the query used to look suggestions up.

use log::trace;
use regex::Regex;
use std::sync::OnceLock;

use super::config::{MentionConfigs, Trigger};
use crate::error::{Error, Result};
use crate::markup::{end_of_last_mention, map_plain_text_index, MarkupCorrection};
use crate::search::base_letter;
use crate::string_utils::{byte_index_to_char_index, char_len, char_slice, char_slice_to};

/// Options shaping the query part of a literal trigger's regex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerOptions {
    /// Only the trigger itself ends a query; whitespace does not
    pub allow_space_in_query: bool,
    /// Accept accented letters in the query explicitly
    pub ignore_accents: bool,
}

/// An active mention query found before the caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryInfo {
    /// Dialect whose trigger matched
    pub child_index: usize,
    /// Text typed after the trigger
    pub query: String,
    /// Plain-text start of the trigger+query sequence
    pub query_sequence_start: usize,
    /// Plain-text end of the trigger+query sequence
    pub query_sequence_end: usize,
    /// Plain text the query was found in
    pub plain_text_value: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Accented Letters
// ─────────────────────────────────────────────────────────────────────────────

/// Every Latin letter in U+00C0..=U+024F that canonically decomposes into an
/// ASCII letter plus combining marks.
pub fn accented_letters() -> &'static str {
    static LETTERS: OnceLock<String> = OnceLock::new();
    LETTERS.get_or_init(|| {
        ('\u{C0}'..='\u{24F}')
            .filter(|&c| base_letter(c).is_some())
            .collect()
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Regex Construction
// ─────────────────────────────────────────────────────────────────────────────

/// Escape a string for use inside a bracketed character class.
fn escape_class(text: &str) -> String {
    text.chars()
        .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
        .collect()
}

/// Build the regex that detects a trigger+query sequence at the end of a text.
///
/// Literal triggers are escaped and produce
/// `(?:^|\s)(TRIGGER([^\sTRIGGER]*))$`; pattern triggers are returned as-is.
///
/// # Errors
///
/// `Error::InvalidPattern` if the generated pattern fails to compile.
pub fn make_trigger_regex(trigger: &Trigger, options: TriggerOptions) -> Result<Regex> {
    let literal = match trigger {
        Trigger::Pattern(regex) => return Ok(regex.clone()),
        Trigger::Literal(text) => text,
    };

    let excluded = if options.allow_space_in_query {
        escape_class(literal)
    } else {
        format!(r"\s{}", escape_class(literal))
    };
    let query = if options.ignore_accents {
        format!("(?:[^{}]|[{}])*", excluded, accented_letters())
    } else {
        format!("[^{}]*", excluded)
    };
    let pattern = format!(r"(?:^|\s)({}({}))$", regex::escape(literal), query);

    Regex::new(&pattern).map_err(|source| Error::InvalidPattern { pattern, source })
}

// ─────────────────────────────────────────────────────────────────────────────
// Query Scanning
// ─────────────────────────────────────────────────────────────────────────────

/// Find the mention queries active at `caret`.
///
/// No query is reported while the caret sits inside a mention. Only the
/// text between the end of the last mention before the caret and the caret
/// itself is scanned, so a finished mention never re-opens a query.
pub fn scan_queries(
    markup: &str,
    plain_text: &str,
    caret: usize,
    configs: &MentionConfigs,
) -> Vec<QueryInfo> {
    let Some(position_in_markup) = map_plain_text_index(markup, configs, caret, MarkupCorrection::Null)
    else {
        trace!("Caret {} is inside a mention, no query", caret);
        return Vec::new();
    };

    let scan_start = end_of_last_mention(char_slice_to(markup, position_in_markup), configs);
    let substring = char_slice(plain_text, scan_start, caret);

    let mut queries = Vec::new();
    for child_index in 0..configs.len() {
        let Some(regex) = configs.trigger_regex(child_index) else {
            continue;
        };
        let Some(caps) = regex.captures(substring) else {
            continue;
        };
        let (Some(sequence), Some(query)) = (caps.get(1), caps.get(2)) else {
            continue;
        };

        let start = scan_start + byte_index_to_char_index(substring, sequence.start());
        queries.push(QueryInfo {
            child_index,
            query: query.as_str().to_string(),
            query_sequence_start: start,
            query_sequence_end: start + char_len(sequence.as_str()),
            plain_text_value: plain_text.to_string(),
        });
    }
    queries
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mentions::MentionConfig;

    fn user_configs() -> MentionConfigs {
        MentionConfigs::single(MentionConfig::new("@", "@[__display__](__id__)").unwrap()).unwrap()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Regex construction
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_literal_trigger_captures_query() {
        let regex = make_trigger_regex(&"@".into(), TriggerOptions::default()).unwrap();
        let caps = regex.captures("hello @wal").unwrap();
        assert_eq!(&caps[1], "@wal");
        assert_eq!(&caps[2], "wal");
    }

    #[test]
    fn test_trigger_requires_whitespace_or_start() {
        let regex = make_trigger_regex(&"@".into(), TriggerOptions::default()).unwrap();
        assert!(regex.is_match("@"));
        assert!(!regex.is_match("mail@host"));
    }

    #[test]
    fn test_space_ends_query_by_default() {
        let regex = make_trigger_regex(&"@".into(), TriggerOptions::default()).unwrap();
        assert!(!regex.is_match("@walter wh"));

        let options = TriggerOptions {
            allow_space_in_query: true,
            ..TriggerOptions::default()
        };
        let regex = make_trigger_regex(&"@".into(), options).unwrap();
        let caps = regex.captures("hi @walter wh").unwrap();
        assert_eq!(&caps[2], "walter wh");
    }

    #[test]
    fn test_trigger_character_is_escaped() {
        let regex = make_trigger_regex(&"$".into(), TriggerOptions::default()).unwrap();
        let caps = regex.captures("price $abc").unwrap();
        assert_eq!(&caps[2], "abc");

        let regex = make_trigger_regex(&"[[".into(), TriggerOptions::default()).unwrap();
        assert_eq!(&regex.captures("see [[Page").unwrap()[2], "Page");
    }

    #[test]
    fn test_ignore_accents_accepts_accented_queries() {
        let options = TriggerOptions {
            ignore_accents: true,
            ..TriggerOptions::default()
        };
        let regex = make_trigger_regex(&"@".into(), options).unwrap();
        assert_eq!(&regex.captures("@Françoise").unwrap()[2], "Françoise");
        assert!(!regex.is_match("@Fran çoise"));
    }

    #[test]
    fn test_pattern_trigger_used_unchanged() {
        let source = r"(?:^|\s)(:([a-z]+))$";
        let trigger = Trigger::Pattern(Regex::new(source).unwrap());
        let regex = make_trigger_regex(&trigger, TriggerOptions::default()).unwrap();
        assert_eq!(regex.as_str(), source);
    }

    #[test]
    fn test_accented_letters_set() {
        let letters = accented_letters();
        assert!(letters.contains('é'));
        assert!(letters.contains('Ç'));
        assert!(!letters.contains('e'));
        assert!(!letters.contains('ø'));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Query scanning
    // ─────────────────────────────────────────────────────────────────────────

    #[test]
    fn test_scan_finds_query_before_caret() {
        let configs = user_configs();
        let queries = scan_queries("Hi @wal", "Hi @wal", 7, &configs);
        assert_eq!(
            queries,
            vec![QueryInfo {
                child_index: 0,
                query: "wal".to_string(),
                query_sequence_start: 3,
                query_sequence_end: 7,
                plain_text_value: "Hi @wal".to_string(),
            }]
        );
    }

    #[test]
    fn test_scan_with_caret_mid_text() {
        let configs = user_configs();
        let queries = scan_queries("@wal rest", "@wal rest", 3, &configs);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].query, "wa");
        assert_eq!(queries[0].query_sequence_end, 3);
    }

    #[test]
    fn test_scan_skips_caret_inside_mention() {
        let configs = user_configs();
        let markup = "Hi @[Walter](1)";
        assert!(scan_queries(markup, "Hi Walter", 5, &configs).is_empty());
    }

    #[test]
    fn test_scan_starts_after_last_mention() {
        let configs = MentionConfigs::single(
            MentionConfig::new("@", "@[__display__](__id__)")
                .unwrap()
                .allow_space_in_query(true),
        )
        .unwrap();
        let markup = "@[Ada](1) and @bo";
        let plain = "Ada and @bo";
        let queries = scan_queries(markup, plain, 11, &configs);
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].query, "bo");
        assert_eq!(queries[0].query_sequence_start, 8);
    }

    #[test]
    fn test_scan_reports_char_offsets() {
        let configs = user_configs();
        let plain = "Hæ 🎉 @ñu";
        let queries = scan_queries(plain, plain, 8, &configs);
        assert_eq!(queries[0].query_sequence_start, 5);
        assert_eq!(queries[0].query_sequence_end, 8);
    }

    #[test]
    fn test_scan_without_trigger_is_empty() {
        let configs = user_configs();
        assert!(scan_queries("plain words", "plain words", 11, &configs).is_empty());
    }
}
