//! Clipboard payloads
//!
//! Copying from a mentions input writes two representations: the plain
//! text other applications understand, and the markup slice under a private
//! MIME type so that pasting back into a mentions input keeps the mentions.

use crate::markup::{map_plain_text_index, MarkupCorrection};
use crate::mentions::MentionConfigs;
use crate::string_utils::{char_len, char_slice};

/// MIME type of the plain-text representation.
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// MIME type of the markup representation.
pub const MARKUP_MIME: &str = "text/x-ferrite-mentions";

/// What a copy produces and a paste consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipboardPayload {
    pub plain_text: String,
    /// Markup slice, present when the data came from a mentions input
    pub markup: Option<String>,
}

impl ClipboardPayload {
    /// A payload from another application.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            plain_text: text.into(),
            markup: None,
        }
    }

    /// Read a payload from `(mime, data)` entries, ignoring unknown types.
    pub fn from_entries<M, D>(entries: impl IntoIterator<Item = (M, D)>) -> Self
    where
        M: AsRef<str>,
        D: AsRef<str>,
    {
        let mut payload = Self::default();
        for (mime, data) in entries {
            match mime.as_ref() {
                PLAIN_TEXT_MIME => payload.plain_text = data.as_ref().to_string(),
                MARKUP_MIME => payload.markup = Some(data.as_ref().to_string()),
                _ => {}
            }
        }
        payload
    }

    /// `(mime, data)` entries to hand to the platform clipboard.
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        let mut entries = vec![(PLAIN_TEXT_MIME, self.plain_text.as_str())];
        if let Some(markup) = &self.markup {
            entries.push((MARKUP_MIME, markup.as_str()));
        }
        entries
    }

    /// The text a paste should insert into markup, without carriage returns.
    pub fn paste_text(&self) -> String {
        self.markup
            .as_deref()
            .unwrap_or(&self.plain_text)
            .replace('\r', "")
    }
}

/// Markup character range covering the plain range `start..end`, widened to
/// whole mentions.
pub fn markup_range(markup: &str, configs: &MentionConfigs, start: usize, end: usize) -> (usize, usize) {
    let markup_len = char_len(markup);
    let markup_start =
        map_plain_text_index(markup, configs, start, MarkupCorrection::Start).unwrap_or(markup_len);
    let markup_end =
        map_plain_text_index(markup, configs, end, MarkupCorrection::End).unwrap_or(markup_len);
    (markup_start, markup_end)
}

/// Payload for copying the plain range `start..end` of `markup`.
pub fn copy_payload(
    markup: &str,
    plain_text: &str,
    configs: &MentionConfigs,
    start: usize,
    end: usize,
) -> ClipboardPayload {
    let (markup_start, markup_end) = markup_range(markup, configs, start, end);
    ClipboardPayload {
        plain_text: char_slice(plain_text, start, end).to_string(),
        markup: Some(char_slice(markup, markup_start, markup_end).to_string()),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
