//! Headless mentions input
//!
//! `MentionsInputState` is what a text widget keeps alongside its editing
//! surface: the markup value, the selection, the composition flag, the
//! derived views and the suggestion list. Each input event maps to one
//! method; value changes come back as a [`ChangeEvent`] for the widget's
//! owner. Views are rebuilt from the markup on every value change.

use log::debug;

use super::clipboard::{copy_payload, markup_range, ClipboardPayload};
use super::config::MentionConfigs;
use super::selection::{classify_selection, Selection, SelectionClassification};
use super::suggestions::{SuggestionItem, SuggestionRequest, Suggestions};
use super::trigger::{scan_queries, QueryInfo};
use crate::markup::{
    apply_change_to_value, find_start_of_mention_in_plain_text, get_plain_text,
    map_plain_text_index, splice_string, DerivedViews, MarkupCorrection, MentionOccurrence,
    SelectionChange,
};
use crate::string_utils::char_len;

/// A new value to report to the owner of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// New markup
    pub value: String,
    pub plain_text: String,
    pub mentions: Vec<MentionOccurrence>,
}

/// State of one mentions input.
#[derive(Debug, Clone)]
pub struct MentionsInputState {
    value: String,
    configs: MentionConfigs,
    selection: Selection,
    composing: bool,
    views: DerivedViews,
    suggestions: Suggestions,
    /// Deferred lookups not yet handed to the caller
    pending: Vec<SuggestionRequest>,
}

impl MentionsInputState {
    /// Create an input holding `value`, with the caret at the end.
    pub fn new(value: impl Into<String>, configs: MentionConfigs) -> Self {
        let value = value.into();
        let views = DerivedViews::build(&value, &configs);
        let caret = char_len(&views.plain_text);
        Self {
            value,
            configs,
            selection: Selection::cursor(caret),
            composing: false,
            views,
            suggestions: Suggestions::new(),
            pending: Vec::new(),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// The markup value.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn plain_text(&self) -> &str {
        &self.views.plain_text
    }

    pub fn id_text(&self) -> &str {
        &self.views.id_text
    }

    pub fn mentions(&self) -> &[MentionOccurrence] {
        &self.views.mentions
    }

    pub fn views(&self) -> &DerivedViews {
        &self.views
    }

    pub fn configs(&self) -> &MentionConfigs {
        &self.configs
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn is_composing(&self) -> bool {
        self.composing
    }

    pub fn suggestions(&self) -> &Suggestions {
        &self.suggestions
    }

    /// Suggestion list, for moving the focus.
    pub fn suggestions_mut(&mut self) -> &mut Suggestions {
        &mut self.suggestions
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Value
    // ─────────────────────────────────────────────────────────────────────────

    fn commit(&mut self, value: String) -> ChangeEvent {
        self.views = DerivedViews::build(&value, &self.configs);
        self.value = value;
        ChangeEvent {
            value: self.value.clone(),
            plain_text: self.views.plain_text.clone(),
            mentions: self.views.mentions.clone(),
        }
    }

    /// Replace the value from outside (the owner changed it).
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        if value == self.value {
            return;
        }
        self.commit(value);
        self.selection = self.selection.clamp(char_len(&self.views.plain_text));
        self.clear_suggestions();
    }

    /// Replace the dialects; the views are rebuilt for the current value.
    pub fn set_configs(&mut self, configs: MentionConfigs) {
        self.configs = configs;
        let value = std::mem::take(&mut self.value);
        self.commit(value);
        self.selection = self.selection.clamp(char_len(&self.views.plain_text));
        self.clear_suggestions();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Input Events
    // ─────────────────────────────────────────────────────────────────────────

    /// The editing surface changed its text to `new_plain_text`.
    ///
    /// `selection_after` is the selection the surface reports after the
    /// edit and `inserted_data` the text the platform says was typed. When
    /// the edit removed a mention the caret was touching, the caret moves to
    /// where the mention started, after any typed text.
    pub fn handle_change(
        &mut self,
        new_plain_text: &str,
        selection_after: Selection,
        inserted_data: Option<&str>,
    ) -> Option<ChangeEvent> {
        let before = self.selection;
        let change = SelectionChange::new(before.start, before.end, selection_after.end);
        let new_value = apply_change_to_value(&self.value, new_plain_text, change, &self.configs);

        let mut selection = selection_after;
        if let Some(mention_start) =
            find_start_of_mention_in_plain_text(&self.value, &self.configs, selection_after.start)
        {
            if before.end > mention_start {
                let caret = mention_start + inserted_data.map_or(0, char_len);
                debug!("Edit touched a mention, caret moves to {}", caret);
                selection = Selection::cursor(caret);
            }
        }

        let event = (new_value != self.value).then(|| self.commit(new_value));
        self.selection = selection.clamp(char_len(&self.views.plain_text));

        if self.composing && self.selection.is_cursor() {
            self.refresh_queries();
        }
        event
    }

    /// The editing surface moved the selection.
    ///
    /// A collapsed caret looks for an active query; a range selection closes
    /// the suggestion list. Nothing happens while text is being composed.
    pub fn handle_select(&mut self, start: usize, end: usize) {
        self.selection = Selection::new(start, end);
        if self.composing {
            return;
        }
        if self.selection.is_cursor() {
            self.refresh_queries();
        } else {
            self.clear_suggestions();
        }
    }

    pub fn composition_start(&mut self) {
        self.composing = true;
    }

    pub fn composition_end(&mut self) {
        self.composing = false;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Clipboard
    // ─────────────────────────────────────────────────────────────────────────

    /// Payload for the current selection.
    pub fn copy(&self) -> ClipboardPayload {
        copy_payload(
            &self.value,
            &self.views.plain_text,
            &self.configs,
            self.selection.start,
            self.selection.end,
        )
    }

    /// Copy the selection and remove it, with any mention it touches.
    pub fn cut(&mut self) -> (ClipboardPayload, Option<ChangeEvent>) {
        let payload = self.copy();
        let Selection { start, end } = self.selection;
        if start == end {
            return (payload, None);
        }

        let (markup_start, markup_end) = markup_range(&self.value, &self.configs, start, end);
        let caret = find_start_of_mention_in_plain_text(&self.value, &self.configs, start)
            .unwrap_or(start);
        let new_value = splice_string(&self.value, markup_start, markup_end, "");
        let event = self.commit(new_value);
        self.selection = Selection::cursor(caret);
        self.clear_suggestions();
        (payload, Some(event))
    }

    /// Replace the selection with `payload`, preferring its markup.
    pub fn paste(&mut self, payload: &ClipboardPayload) -> ChangeEvent {
        let Selection { start, end } = self.selection;
        let (markup_start, markup_end) = markup_range(&self.value, &self.configs, start, end);
        let pasted = payload.paste_text();

        let caret = find_start_of_mention_in_plain_text(&self.value, &self.configs, start)
            .unwrap_or(start)
            + char_len(&get_plain_text(&pasted, &self.configs));
        let new_value = splice_string(&self.value, markup_start, markup_end, &pasted);
        let event = self.commit(new_value);
        self.selection = Selection::cursor(caret);
        self.clear_suggestions();
        event
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Suggestions
    // ─────────────────────────────────────────────────────────────────────────

    fn refresh_queries(&mut self) {
        let queries = scan_queries(
            &self.value,
            &self.views.plain_text,
            self.selection.start,
            &self.configs,
        );
        debug!("{} active mention query(ies)", queries.len());
        self.pending = self.suggestions.begin_queries(queries, &self.configs);
    }

    /// Close the suggestion list; outstanding requests become stale.
    pub fn clear_suggestions(&mut self) {
        self.suggestions.clear();
        self.pending.clear();
    }

    /// Deferred lookups the caller has to answer with [`Self::deliver_suggestions`].
    pub fn take_requests(&mut self) -> Vec<SuggestionRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Answer a deferred lookup. Returns `false` for a stale request.
    pub fn deliver_suggestions(
        &mut self,
        request: &SuggestionRequest,
        results: Vec<SuggestionItem>,
    ) -> bool {
        self.suggestions.deliver(request, results)
    }

    /// Replace the query described by `query_info` with a mention of `item`.
    pub fn add_mention(&mut self, item: &SuggestionItem, query_info: &QueryInfo) -> Option<ChangeEvent> {
        let config = self.configs.get(query_info.child_index)?;
        let display = item.display.as_deref();

        let start = map_plain_text_index(
            &self.value,
            &self.configs,
            query_info.query_sequence_start,
            MarkupCorrection::Start,
        )
        .unwrap_or_else(|| char_len(&self.value));
        let end = start + query_info.query_sequence_end.saturating_sub(query_info.query_sequence_start);

        let mut insert = config.serializer().insert(&item.id, display);
        let mut display_value = config.display(&item.id, display.unwrap_or(&item.id));
        if config.append_space_on_add {
            insert.push(' ');
            display_value.push(' ');
        }
        let caret = query_info.query_sequence_start + char_len(&display_value);

        debug!("Adding mention '{}' of dialect {}", item.id, query_info.child_index);
        let new_value = splice_string(&self.value, start, end, &insert);
        let event = self.commit(new_value);
        self.selection = Selection::cursor(caret);
        self.clear_suggestions();
        Some(event)
    }

    /// Add the focused suggestion, if any.
    pub fn select_focused_suggestion(&mut self) -> Option<ChangeEvent> {
        let (item, query_info) = self.suggestions.focused()?;
        let (item, query_info) = (item.clone(), query_info.clone());
        self.add_mention(&item, &query_info)
    }

    /// How the current selection relates to each mention.
    pub fn classify_selection(&self) -> Vec<SelectionClassification> {
        classify_selection(self.selection.start, self.selection.end, &self.views.mentions)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
