//! Views derived from markup
//!
//! Plain text, id text and the mention list are always recomputed from the
//! markup in a single traversal and never patched in place.

use serde::Serialize;

use super::iterator::{segments, Segment};
use crate::mentions::MentionConfigs;

/// One mention in a markup string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MentionOccurrence {
    pub id: String,
    /// Display text after the dialect's transform
    pub display: String,
    /// Dialect index
    pub child_index: usize,
    /// Character offset in the markup
    pub index: usize,
    /// Character offset in the plain text
    pub plain_text_index: usize,
}

impl MentionOccurrence {
    /// Plain-text offset just past the display text.
    pub fn plain_text_end(&self) -> usize {
        self.plain_text_index + self.display.chars().count()
    }
}

/// Everything the input shows or reports about one markup value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DerivedViews {
    /// Mentions replaced by their display text
    pub plain_text: String,
    /// Mentions replaced by their id
    pub id_text: String,
    /// Mentions in markup order
    pub mentions: Vec<MentionOccurrence>,
}

impl DerivedViews {
    pub fn build(markup: &str, configs: &MentionConfigs) -> Self {
        let mut views = Self {
            plain_text: String::with_capacity(markup.len()),
            id_text: String::with_capacity(markup.len()),
            mentions: Vec::new(),
        };

        for segment in segments(markup, configs) {
            match segment {
                Segment::Text(text) => {
                    views.plain_text.push_str(text.text);
                    views.id_text.push_str(text.text);
                }
                Segment::Mention(mention) => {
                    views.plain_text.push_str(&mention.display);
                    views.id_text.push_str(mention.id);
                    views.mentions.push(MentionOccurrence {
                        id: mention.id.to_string(),
                        display: mention.display,
                        child_index: mention.child_index,
                        index: mention.markup_start,
                        plain_text_index: mention.plain_start,
                    });
                }
            }
        }
        views
    }
}

/// The text the user sees and edits.
pub fn get_plain_text(markup: &str, configs: &MentionConfigs) -> String {
    DerivedViews::build(markup, configs).plain_text
}

/// The markup with every mention replaced by its id.
pub fn get_id_value(markup: &str, configs: &MentionConfigs) -> String {
    DerivedViews::build(markup, configs).id_text
}

/// The mentions of `markup` in order.
pub fn get_mentions(markup: &str, configs: &MentionConfigs) -> Vec<MentionOccurrence> {
    DerivedViews::build(markup, configs).mentions
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
