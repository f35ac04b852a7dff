//! Markup module for ferrite-mentions
//!
//! This module contains the markup engine: template serialization, the
//! traversal every other operation is built on, offset mapping between
//! plain text and markup, edit replay, and the derived views.

mod change;
mod index_map;
mod iterator;
mod serializer;
mod views;

pub use change::{apply_change_to_value, splice_string, SelectionChange};
pub use index_map::{
    end_of_last_mention, find_start_of_mention_in_plain_text, map_plain_text_index,
    MarkupCorrection,
};
pub use iterator::{iterate_markup, segments, MentionSegment, Segment, TextSegment};
pub use serializer::{
    MarkupMatch, MarkupSerializer, Placeholder, DISPLAY_PLACEHOLDER, ID_PLACEHOLDER,
};
pub use views::{get_id_value, get_mentions, get_plain_text, DerivedViews, MentionOccurrence};
