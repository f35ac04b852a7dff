//! Plain-text to markup offset mapping
//!
//! A mention's display text and its markup differ in length, so an offset in
//! the plain text has to be translated before the markup can be edited. An
//! offset inside a mention's display has no exact markup counterpart; the
//! caller picks how to resolve it with a [`MarkupCorrection`].

use log::trace;

use super::iterator::{segments, Segment};
use crate::mentions::MentionConfigs;
use crate::string_utils::char_len;

/// How to resolve a plain-text offset that falls inside a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupCorrection {
    /// Snap to the markup start of the mention
    Start,
    /// Snap to the markup end of the mention
    End,
    /// Report that there is no counterpart
    Null,
}

/// Map the plain-text character offset `index` to a markup character offset.
///
/// An offset at the start of a mention belongs to the (possibly empty) text
/// before it. Offsets inside a mention resolve per `correction`; with
/// [`MarkupCorrection::Null`] they yield `None`. Offsets past the end of the
/// plain text map to the end of the markup.
pub fn map_plain_text_index(
    markup: &str,
    configs: &MentionConfigs,
    index: usize,
    correction: MarkupCorrection,
) -> Option<usize> {
    for segment in segments(markup, configs) {
        match segment {
            Segment::Text(text) => {
                if text.plain_start + text.len >= index {
                    return Some(text.markup_start + index.saturating_sub(text.plain_start));
                }
            }
            Segment::Mention(mention) => {
                if mention.plain_end() > index {
                    trace!(
                        "Plain index {} falls inside mention '{}' ({:?})",
                        index,
                        mention.id,
                        correction
                    );
                    return match correction {
                        MarkupCorrection::Start => Some(mention.markup_start),
                        MarkupCorrection::End => Some(mention.markup_end()),
                        MarkupCorrection::Null => None,
                    };
                }
            }
        }
    }
    Some(char_len(markup))
}

/// Plain-text start of the mention whose display covers `index`.
pub fn find_start_of_mention_in_plain_text(
    markup: &str,
    configs: &MentionConfigs,
    index: usize,
) -> Option<usize> {
    segments(markup, configs)
        .into_iter()
        .find_map(|segment| match segment {
            Segment::Mention(m) if m.plain_start <= index && index < m.plain_end() => {
                Some(m.plain_start)
            }
            _ => None,
        })
}

/// Plain-text offset just past the last mention, or 0 without mentions.
pub fn end_of_last_mention(markup: &str, configs: &MentionConfigs) -> usize {
    segments(markup, configs)
        .into_iter()
        .rev()
        .find_map(|segment| match segment {
            Segment::Mention(m) => Some(m.plain_end()),
            Segment::Text(_) => None,
        })
        .unwrap_or(0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
