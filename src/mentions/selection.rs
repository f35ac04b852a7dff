//! Selection state relative to mentions
//!
//! Renderers use the classification to style a mention differently while
//! the caret touches it or a selection covers it.

use serde::Serialize;

use crate::markup::MentionOccurrence;

/// A plain-text selection, start never after end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    /// Order-normalizing constructor.
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn cursor(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn is_cursor(self) -> bool {
        self.start == self.end
    }

    pub fn clamp(self, len: usize) -> Self {
        Self::new(self.start.min(len), self.end.min(len))
    }
}

/// How a selection relates to one mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionKind {
    /// Caret at the first or last edge of the display text
    Boundary,
    /// Caret strictly inside the display text
    Inside,
    /// Range overlapping part of the display text
    Partial,
    /// Range covering the whole display text
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionClassification {
    pub occurrence: MentionOccurrence,
    pub kind: SelectionKind,
    pub plain_start: usize,
    pub plain_end: usize,
    pub child_index: usize,
}

fn classify(selection: Selection, start: usize, end: usize) -> Option<SelectionKind> {
    if selection.is_cursor() {
        let pos = selection.start;
        if pos > start && pos < end {
            Some(SelectionKind::Inside)
        } else if pos == start || pos == end {
            Some(SelectionKind::Boundary)
        } else {
            None
        }
    } else if selection.start >= end || selection.end <= start {
        None
    } else if selection.start <= start && selection.end >= end {
        Some(SelectionKind::Full)
    } else {
        Some(SelectionKind::Partial)
    }
}

/// Classify the selection `start..end` (either order) against every mention.
///
/// Mentions the selection does not touch are left out; the rest keep their
/// order.
pub fn classify_selection(
    start: usize,
    end: usize,
    mentions: &[MentionOccurrence],
) -> Vec<SelectionClassification> {
    let selection = Selection::new(start, end);
    mentions
        .iter()
        .filter_map(|occurrence| {
            let plain_start = occurrence.plain_text_index;
            let plain_end = occurrence.plain_text_end();
            classify(selection, plain_start, plain_end).map(|kind| SelectionClassification {
                occurrence: occurrence.clone(),
                kind,
                plain_start,
                plain_end,
                child_index: occurrence.child_index,
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
