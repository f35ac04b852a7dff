//! Applying plain-text edits to markup
//!
//! The editing surface only knows the plain text. After every edit it
//! reports the new plain text and where the selection was before and after;
//! this module replays that edit onto the markup so that untouched mentions
//! survive and touched mentions disappear as a whole.

use log::{debug, trace};

use super::index_map::{map_plain_text_index, MarkupCorrection};
use super::views::get_plain_text;
use crate::mentions::MentionConfigs;
use crate::string_utils::{byte_index_to_char_index, char_len, char_slice, char_slice_from};

/// Selection bounds around one edit, in plain-text characters.
///
/// Missing "before" bounds are derived from the length change and the
/// selection after the edit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub selection_start_before: Option<usize>,
    pub selection_end_before: Option<usize>,
    pub selection_end_after: usize,
}

impl SelectionChange {
    /// A change where the selection was `start..end` before and the caret
    /// sits at `after` afterwards.
    pub fn new(start: usize, end: usize, after: usize) -> Self {
        Self {
            selection_start_before: Some(start),
            selection_end_before: Some(end),
            selection_end_after: after,
        }
    }
}

/// Replace the characters `start..end` of `s` with `insert`.
///
/// Bounds clamp to the string; an `end` before `start` removes nothing.
pub fn splice_string(s: &str, start: usize, end: usize, insert: &str) -> String {
    let head = char_slice(s, 0, start);
    let tail = char_slice_from(s, end.max(start));
    let mut out = String::with_capacity(head.len() + insert.len() + tail.len());
    out.push_str(head);
    out.push_str(insert);
    out.push_str(tail);
    out
}

/// Splice `insert` into `markup` over the plain-text window `start..end`.
fn splice_plain_window(
    markup: &str,
    configs: &MentionConfigs,
    start: usize,
    end: usize,
    insert: &str,
) -> String {
    let markup_len = char_len(markup);
    let mapped_start = map_plain_text_index(markup, configs, start, MarkupCorrection::Start)
        .unwrap_or(markup_len);
    let mapped_end =
        map_plain_text_index(markup, configs, end, MarkupCorrection::End).unwrap_or(markup_len);
    trace!(
        "Splicing {:?} into markup {}..{} (plain {}..{})",
        insert,
        mapped_start,
        mapped_end,
        start,
        end
    );
    splice_string(markup, mapped_start, mapped_end, insert)
}

/// Index of the first character where `a` and `b` differ.
fn first_difference(a: &str, b: &str) -> usize {
    a.chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Replay a plain-text edit onto `value`.
///
/// `new_plain_text` is the plain text after the edit. A mention whose
/// display overlaps the edited window is removed entirely. When no mention is
/// removed and the spliced markup does not reproduce `new_plain_text` (the
/// platform rewrote text outside the selection, as autocorrect does), the
/// edit is re-derived once from the first differing character and spliced
/// again.
pub fn apply_change_to_value(
    value: &str,
    new_plain_text: &str,
    change: SelectionChange,
    configs: &MentionConfigs,
) -> String {
    let old_plain_text = get_plain_text(value, configs);
    let old_len = char_len(&old_plain_text);
    let new_len = char_len(new_plain_text);
    let length_delta = old_len as isize - new_len as isize;
    let end_after = change.selection_end_after;

    let mut start_before = change
        .selection_start_before
        .unwrap_or_else(|| (end_after as isize + length_delta).max(0) as usize);
    let end_before = change.selection_end_before.unwrap_or(start_before);

    // Zero-length change at the caret with unchanged length: the platform
    // replaced the character before the caret (accent composition)
    let collapsed_at_caret = start_before == end_before && end_before == end_after;
    if collapsed_at_caret && old_len == new_len {
        start_before = start_before.saturating_sub(1);
    }

    let insert = char_slice(new_plain_text, start_before, end_after);
    let splice_start = start_before.min(end_after);
    let splice_end = if collapsed_at_caret {
        // Delete key: the removed characters lie after the caret
        end_before.max((start_before as isize + length_delta).max(0) as usize)
    } else {
        end_before
    };

    let will_remove_mention =
        map_plain_text_index(value, configs, splice_start, MarkupCorrection::Null).is_none()
            || map_plain_text_index(value, configs, splice_end, MarkupCorrection::Null).is_none();

    let new_value = splice_plain_window(value, configs, splice_start, splice_end, insert);
    if will_remove_mention {
        debug!("Edit at {}..{} removes a mention", splice_start, splice_end);
        return new_value;
    }

    let control_plain_text = get_plain_text(&new_value, configs);
    if control_plain_text == new_plain_text {
        return new_value;
    }

    let splice_start = first_difference(new_plain_text, &control_plain_text);
    let unchanged_suffix = char_slice_from(new_plain_text, end_after);
    let (insert, splice_end) = match old_plain_text.rfind(unchanged_suffix) {
        Some(byte) => (
            char_slice(new_plain_text, splice_start, end_after),
            byte_index_to_char_index(&old_plain_text, byte),
        ),
        None => (char_slice_from(new_plain_text, splice_start), old_len),
    };
    debug!(
        "Plain text diverged after splice, re-splicing {:?} at {}..{}",
        insert, splice_start, splice_end
    );
    splice_plain_window(
        value,
        configs,
        splice_start,
        splice_end.max(splice_start),
        insert,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
