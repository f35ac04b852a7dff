//! Mentions module for ferrite-mentions
//!
//! This module contains everything above the markup engine: dialect
//! configuration, trigger matching, suggestions, selection classification,
//! clipboard payloads and the headless input state.

mod clipboard;
mod config;
mod selection;
mod state;
mod suggestions;
mod trigger;

pub use clipboard::{copy_payload, markup_range, ClipboardPayload, MARKUP_MIME, PLAIN_TEXT_MIME};
pub use config::{DisplayTransform, MentionConfig, MentionConfigs, Trigger};
pub use selection::{classify_selection, Selection, SelectionClassification, SelectionKind};
pub use state::{ChangeEvent, MentionsInputState};
pub use suggestions::{
    filter_static, DataSource, DialectResults, QueryGeneration, SuggestionItem,
    SuggestionRequest, Suggestions,
};
pub use trigger::{accented_letters, make_trigger_regex, scan_queries, QueryInfo, TriggerOptions};
