//! Markup traversal
//!
//! Every other markup operation is built on this walk: it finds the
//! mentions of all dialects in a markup string, settles conflicts between
//! overlapping candidates, and reports the string as an ordered run of text
//! and mention segments carrying both markup and plain-text offsets.
//!
//! Conflict policy: candidates are ordered by start offset, then longer
//! match first, then dialect order. Walking that order, a candidate that
//! starts inside an already accepted mention is dropped.

use log::trace;
use std::cmp::Reverse;

use super::serializer::RawMatch;
use crate::mentions::MentionConfigs;
use crate::string_utils::{char_len, CharCursor};

// ─────────────────────────────────────────────────────────────────────────────
// Segments
// ─────────────────────────────────────────────────────────────────────────────

/// A run of literal text, identical in markup and plain text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSegment<'a> {
    pub text: &'a str,
    /// Character offset in the markup
    pub markup_start: usize,
    /// Character offset in the plain text
    pub plain_start: usize,
    /// Length in characters
    pub len: usize,
}

/// One accepted mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MentionSegment<'a> {
    /// The full markup of the mention
    pub markup: &'a str,
    /// Character offset of the mention in the markup
    pub markup_start: usize,
    /// Length of the markup in characters
    pub markup_len: usize,
    /// Character offset of the display text in the plain text
    pub plain_start: usize,
    pub id: &'a str,
    /// Display text after the dialect's transform
    pub display: String,
    /// Length of `display` in characters
    pub display_len: usize,
    /// Dialect index in the configuration
    pub child_index: usize,
    /// Markup offset where the preceding text segment starts
    pub previous_end: usize,
}

impl MentionSegment<'_> {
    /// Plain-text offset just past the display text.
    pub fn plain_end(&self) -> usize {
        self.plain_start + self.display_len
    }

    /// Markup offset just past the mention.
    pub fn markup_end(&self) -> usize {
        self.markup_start + self.markup_len
    }
}

/// Either kind of segment, in markup order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(TextSegment<'a>),
    Mention(MentionSegment<'a>),
}

// ─────────────────────────────────────────────────────────────────────────────
// Traversal
// ─────────────────────────────────────────────────────────────────────────────

/// Collect the candidates of every dialect in resolution order.
fn sorted_candidates<'a>(markup: &'a str, configs: &MentionConfigs) -> Vec<(RawMatch<'a>, usize)> {
    let mut candidates: Vec<(RawMatch<'a>, usize)> = configs
        .iter()
        .enumerate()
        .flat_map(|(child_index, config)| {
            config
                .serializer()
                .find_raw(markup)
                .into_iter()
                .map(move |m| (m, child_index))
        })
        .collect();

    candidates.sort_by_cached_key(|(m, child_index)| {
        (m.byte_start, Reverse(char_len(m.text)), *child_index)
    });
    candidates
}

fn walk<'a>(markup: &'a str, configs: &MentionConfigs, mut emit: impl FnMut(Segment<'a>)) {
    let mut cursor = CharCursor::default();
    let mut start = 0usize; // next unconsumed byte
    let mut plain = 0usize;
    let mut last_seen: Option<(usize, &str)> = None;

    for (candidate, child_index) in sorted_candidates(markup, configs) {
        if last_seen == Some((candidate.byte_start, candidate.text)) {
            continue;
        }
        last_seen = Some((candidate.byte_start, candidate.text));

        if candidate.byte_start < start {
            trace!(
                "Dropping overlapping match '{}' of dialect {}",
                candidate.text,
                child_index
            );
            continue;
        }
        let Some(config) = configs.get(child_index) else {
            continue;
        };

        let text_start = cursor.char;
        let markup_start = cursor.advance_to(markup, candidate.byte_start);
        let text_len = markup_start - text_start;
        emit(Segment::Text(TextSegment {
            text: &markup[start..candidate.byte_start],
            markup_start: text_start,
            plain_start: plain,
            len: text_len,
        }));
        plain += text_len;

        let display = config.display(candidate.id, candidate.display.unwrap_or(candidate.id));
        let display_len = char_len(&display);
        let markup_end = cursor.advance_to(markup, candidate.byte_end);
        emit(Segment::Mention(MentionSegment {
            markup: candidate.text,
            markup_start,
            markup_len: markup_end - markup_start,
            plain_start: plain,
            id: candidate.id,
            display,
            display_len,
            child_index,
            previous_end: text_start,
        }));
        plain += display_len;
        start = candidate.byte_end;
    }

    if start < markup.len() {
        let text = &markup[start..];
        emit(Segment::Text(TextSegment {
            text,
            markup_start: cursor.char,
            plain_start: plain,
            len: char_len(text),
        }));
    }
}

/// Walk `markup`, calling `on_mention` for every accepted mention and
/// `on_text` for the text around them.
///
/// A text segment (possibly empty) precedes every mention; a trailing text
/// segment is only reported when non-empty.
pub fn iterate_markup<'a>(
    markup: &'a str,
    configs: &MentionConfigs,
    mut on_mention: impl FnMut(&MentionSegment<'a>),
    mut on_text: impl FnMut(&TextSegment<'a>),
) {
    walk(markup, configs, |segment| match &segment {
        Segment::Text(text) => on_text(text),
        Segment::Mention(mention) => on_mention(mention),
    });
}

/// The ordered segments of `markup`.
pub fn segments<'a>(markup: &'a str, configs: &MentionConfigs) -> Vec<Segment<'a>> {
    let mut out = Vec::new();
    walk(markup, configs, |segment| out.push(segment));
    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mentions::MentionConfig;

    fn multi_dialect() -> MentionConfigs {
        MentionConfigs::new(vec![
            MentionConfig::new("@", "@[__display__](user:__id__)").unwrap(),
            MentionConfig::new("email:", "@[__display__](email:__id__)").unwrap(),
        ])
        .unwrap()
    }

    fn mentions_of<'a>(markup: &'a str, configs: &MentionConfigs) -> Vec<MentionSegment<'a>> {
        segments(markup, configs)
            .into_iter()
            .filter_map(|s| match s {
                Segment::Mention(m) => Some(m),
                Segment::Text(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_plain_text_only() {
        let configs = multi_dialect();
        let segs = segments("no mentions here", &configs);
        assert_eq!(
            segs,
            vec![Segment::Text(TextSegment {
                text: "no mentions here",
                markup_start: 0,
                plain_start: 0,
                len: 16,
            })]
        );
    }

    #[test]
    fn test_empty_markup_has_no_segments() {
        assert!(segments("", &multi_dialect()).is_empty());
    }

    #[test]
    fn test_multi_dialect_iteration() {
        let configs = multi_dialect();
        let markup = "Hi @[John Doe](user:johndoe), add @[joe@x.com](email:joe@x.com)";
        let mentions = mentions_of(markup, &configs);

        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].id, "johndoe");
        assert_eq!(mentions[0].child_index, 0);
        assert_eq!(mentions[0].plain_start, 3);
        assert_eq!(mentions[1].id, "joe@x.com");
        assert_eq!(mentions[1].child_index, 1);
        assert_eq!(mentions[1].plain_start, 17);
        assert_eq!(mentions[1].markup_start, 34);
    }

    #[test]
    fn test_empty_text_segment_precedes_adjacent_mentions() {
        let configs = multi_dialect();
        let markup = "@[A](user:1)@[B](user:2)";
        let segs = segments(markup, &configs);
        assert_eq!(segs.len(), 4);
        assert!(matches!(&segs[0], Segment::Text(t) if t.len == 0 && t.plain_start == 0));
        assert!(matches!(&segs[2], Segment::Text(t) if t.len == 0 && t.markup_start == 12));
        match &segs[3] {
            Segment::Mention(m) => {
                assert_eq!(m.plain_start, 1);
                assert_eq!(m.previous_end, 12);
            }
            Segment::Text(_) => panic!("expected mention"),
        }
    }

    #[test]
    fn test_callbacks_receive_every_segment() {
        let configs = multi_dialect();
        let mut texts = Vec::new();
        let mut ids = Vec::new();
        iterate_markup(
            "a @[B](user:2) c",
            &configs,
            |m| ids.push(m.id.to_string()),
            |t| texts.push(t.text.to_string()),
        );
        assert_eq!(ids, vec!["2"]);
        assert_eq!(texts, vec!["a ", " c"]);
    }

    #[test]
    fn test_longer_match_wins_at_same_offset() {
        // Both dialects match at offset 0; the generic one stops earlier
        let configs = MentionConfigs::new(vec![
            MentionConfig::new("#", "#__id__").unwrap(),
            MentionConfig::new("#[", "#[__display__](__id__)").unwrap(),
        ])
        .unwrap();
        let mentions = mentions_of("#[Rust](rust)", &configs);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].child_index, 1);
        assert_eq!(mentions[0].display, "Rust");
    }

    #[test]
    fn test_equal_matches_resolved_by_declaration_order() {
        let configs = MentionConfigs::new(vec![
            MentionConfig::new("@", "@[__display__](__id__)")
                .unwrap()
                .with_display_transform(|_, d| format!("first:{}", d)),
            MentionConfig::new("+", "@[__display__](__id__)")
                .unwrap()
                .with_display_transform(|_, d| format!("second:{}", d)),
        ])
        .unwrap();
        let mentions = mentions_of("@[Ada](1)", &configs);
        assert_eq!(mentions.len(), 1);
        assert_eq!(mentions[0].child_index, 0);
        assert_eq!(mentions[0].display, "first:Ada");
    }

    #[test]
    fn test_overlapping_later_match_dropped() {
        let configs = MentionConfigs::new(vec![
            MentionConfig::new("@", "@[__display__](__id__)").unwrap(),
            MentionConfig::new(":", "(__id__)").unwrap(),
        ])
        .unwrap();
        // "(1)" lies inside the first mention and must not be reported
        let mentions = mentions_of("@[Ada](1) (2)", &configs);
        assert_eq!(mentions.len(), 2);
        assert_eq!(mentions[0].id, "1");
        assert_eq!(mentions[1].id, "2");
        assert_eq!(mentions[1].child_index, 1);
    }

    #[test]
    fn test_display_transform_changes_plain_offsets() {
        let configs = MentionConfigs::single(
            MentionConfig::new("@", "@[__display__](__id__)")
                .unwrap()
                .with_display_transform(|_, d| format!("@{}", d)),
        )
        .unwrap();
        let segs = segments("@[Ada](1) x", &configs);
        match &segs[2] {
            Segment::Text(t) => {
                assert_eq!(t.plain_start, 4);
                assert_eq!(t.markup_start, 9);
            }
            Segment::Mention(_) => panic!("expected text"),
        }
    }

    #[test]
    fn test_offsets_are_characters() {
        let configs = multi_dialect();
        let mentions = mentions_of("Ça 🎉 @[Zoë](user:z)", &configs);
        assert_eq!(mentions[0].markup_start, 5);
        assert_eq!(mentions[0].plain_start, 5);
        assert_eq!(mentions[0].display_len, 3);
        assert_eq!(mentions[0].markup_len, 14);
    }
}
