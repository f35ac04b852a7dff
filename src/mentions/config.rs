//! Mention dialect configuration
//!
//! One `MentionConfig` describes one kind of mention an input accepts
//! (people behind `@`, tags behind `#`, ...). A `MentionConfigs` is the
//! ordered, validated set used by one input; its order is the dialect
//! order every other part of the crate relies on.

use log::debug;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::suggestions::DataSource;
use super::trigger::{make_trigger_regex, TriggerOptions};
use crate::error::{Error, Result};
use crate::markup::MarkupSerializer;

/// Maps `(id, raw display)` to the text shown in the plain-text view.
pub type DisplayTransform = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// Trigger
// ─────────────────────────────────────────────────────────────────────────────

/// What starts a mention query: a literal string or a full pattern.
///
/// A pattern must capture the trigger+query sequence as group 1 and the
/// query alone as group 2, anchored at the end of the scanned text.
#[derive(Debug, Clone)]
pub enum Trigger {
    Literal(String),
    Pattern(Regex),
}

impl Trigger {
    /// Identity used to reject duplicate triggers.
    fn key(&self) -> (bool, &str) {
        match self {
            Trigger::Literal(text) => (false, text.as_str()),
            Trigger::Pattern(regex) => (true, regex.as_str()),
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Literal(text) => write!(f, "{}", text),
            Trigger::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

impl From<&str> for Trigger {
    fn from(text: &str) -> Self {
        Trigger::Literal(text.to_string())
    }
}

impl From<String> for Trigger {
    fn from(text: String) -> Self {
        Trigger::Literal(text)
    }
}

impl From<Regex> for Trigger {
    fn from(regex: Regex) -> Self {
        Trigger::Pattern(regex)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MentionConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Declaration of one mention dialect.
#[derive(Clone)]
pub struct MentionConfig {
    trigger: Trigger,
    serializer: Arc<MarkupSerializer>,
    display_transform: Option<DisplayTransform>,
    /// Where suggestions for this dialect come from
    pub data: DataSource,
    /// Append a space after a mention inserted from a suggestion
    pub append_space_on_add: bool,
    /// Queries may contain whitespace (only the trigger ends them)
    pub allow_space_in_query: bool,
    /// Match queries and suggestions regardless of accents
    pub ignore_accents: bool,
}

impl MentionConfig {
    /// Declare a dialect from a trigger and a markup template.
    ///
    /// # Errors
    ///
    /// `Error::MissingPlaceholder` for a template without placeholders.
    pub fn new(trigger: impl Into<Trigger>, markup: &str) -> Result<Self> {
        Ok(Self::with_serializer(
            trigger,
            MarkupSerializer::new(markup)?,
        ))
    }

    /// Declare a dialect from an already compiled serializer.
    pub fn with_serializer(trigger: impl Into<Trigger>, serializer: MarkupSerializer) -> Self {
        Self {
            trigger: trigger.into(),
            serializer: Arc::new(serializer),
            display_transform: None,
            data: DataSource::default(),
            append_space_on_add: false,
            allow_space_in_query: false,
            ignore_accents: false,
        }
    }

    /// Find mentions with a caller-supplied regex instead of the compiled template.
    ///
    /// # Errors
    ///
    /// `Error::CaptureGroupMismatch` when the regex does not capture one
    /// group per template placeholder.
    pub fn with_markup_pattern(mut self, regex: Regex) -> Result<Self> {
        let serializer = MarkupSerializer::with_pattern(self.serializer.id(), regex)?;
        self.serializer = Arc::new(serializer);
        Ok(self)
    }

    pub fn with_display_transform<F>(mut self, transform: F) -> Self
    where
        F: Fn(&str, &str) -> String + Send + Sync + 'static,
    {
        self.display_transform = Some(Arc::new(transform));
        self
    }

    pub fn with_data(mut self, data: DataSource) -> Self {
        self.data = data;
        self
    }

    pub fn append_space_on_add(mut self, enabled: bool) -> Self {
        self.append_space_on_add = enabled;
        self
    }

    pub fn allow_space_in_query(mut self, enabled: bool) -> Self {
        self.allow_space_in_query = enabled;
        self
    }

    pub fn ignore_accents(mut self, enabled: bool) -> Self {
        self.ignore_accents = enabled;
        self
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn serializer(&self) -> &MarkupSerializer {
        &self.serializer
    }

    /// The markup template of this dialect.
    pub fn markup(&self) -> &str {
        self.serializer.id()
    }

    /// Resolve the display text shown for a mention of this dialect.
    pub fn display(&self, id: &str, raw_display: &str) -> String {
        match &self.display_transform {
            Some(transform) => transform(id, raw_display),
            None => raw_display.to_string(),
        }
    }

    fn trigger_options(&self) -> TriggerOptions {
        TriggerOptions {
            allow_space_in_query: self.allow_space_in_query,
            ignore_accents: self.ignore_accents,
        }
    }
}

impl fmt::Debug for MentionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MentionConfig")
            .field("trigger", &self.trigger)
            .field("markup", &self.markup())
            .field("display_transform", &self.display_transform.is_some())
            .field("data", &self.data)
            .field("append_space_on_add", &self.append_space_on_add)
            .field("allow_space_in_query", &self.allow_space_in_query)
            .field("ignore_accents", &self.ignore_accents)
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MentionConfigs
// ─────────────────────────────────────────────────────────────────────────────

/// The ordered dialects of one input, with their compiled trigger matchers.
#[derive(Debug, Clone, Default)]
pub struct MentionConfigs {
    entries: Vec<MentionConfig>,
    trigger_regexes: Vec<Regex>,
}

impl MentionConfigs {
    /// Validate and compile a list of dialects.
    ///
    /// Serializers built from the same template (and matcher) are shared.
    ///
    /// # Errors
    ///
    /// `Error::DuplicateTrigger` when two dialects share a trigger, or
    /// `Error::InvalidPattern` when a trigger cannot be compiled.
    pub fn new(entries: Vec<MentionConfig>) -> Result<Self> {
        let mut seen_triggers: HashMap<(bool, String), usize> = HashMap::new();
        let mut serializers: HashMap<(String, String), Arc<MarkupSerializer>> = HashMap::new();
        let mut entries = entries;
        let mut trigger_regexes = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter_mut().enumerate() {
            let (is_pattern, key) = entry.trigger.key();
            if seen_triggers
                .insert((is_pattern, key.to_string()), index)
                .is_some()
            {
                return Err(Error::DuplicateTrigger {
                    trigger: entry.trigger.to_string(),
                });
            }

            let serializer_key = (
                entry.serializer.id().to_string(),
                entry.serializer.regex().as_str().to_string(),
            );
            let shared = serializers
                .entry(serializer_key)
                .or_insert_with(|| Arc::clone(&entry.serializer));
            entry.serializer = Arc::clone(shared);

            trigger_regexes.push(make_trigger_regex(&entry.trigger, entry.trigger_options())?);
        }

        debug!("Configured {} mention dialect(s)", entries.len());
        Ok(Self {
            entries,
            trigger_regexes,
        })
    }

    /// A single dialect, for the common one-trigger input.
    pub fn single(entry: MentionConfig) -> Result<Self> {
        Self::new(vec![entry])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MentionConfig> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MentionConfig> {
        self.entries.iter()
    }

    /// Compiled trigger matcher of dialect `index`.
    pub fn trigger_regex(&self, index: usize) -> Option<&Regex> {
        self.trigger_regexes.get(index)
    }

    /// Whether two dialects share one compiled serializer.
    pub fn shares_serializer(&self, a: usize, b: usize) -> bool {
        match (self.entries.get(a), self.entries.get(b)) {
            (Some(x), Some(y)) => Arc::ptr_eq(&x.serializer, &y.serializer),
            _ => false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_triggers_rejected() {
        let result = MentionConfigs::new(vec![
            MentionConfig::new("@", "@[__display__](user:__id__)").unwrap(),
            MentionConfig::new("@", "@[__display__](email:__id__)").unwrap(),
        ]);
        assert!(matches!(result, Err(Error::DuplicateTrigger { trigger }) if trigger == "@"));
    }

    #[test]
    fn test_literal_and_pattern_triggers_do_not_collide() {
        let pattern = Regex::new(r"(?:^|\s)(@([^\s@]*))$").unwrap();
        let configs = MentionConfigs::new(vec![
            MentionConfig::new("@", "@[__display__](__id__)").unwrap(),
            MentionConfig::new(pattern, "@@[__display__](__id__)").unwrap(),
        ]);
        assert!(configs.is_ok());
    }

    #[test]
    fn test_missing_placeholder_surfaces_at_construction() {
        let result = MentionConfig::new("@", "@[user]");
        assert!(matches!(result, Err(Error::MissingPlaceholder { .. })));
    }

    #[test]
    fn test_serializers_shared_by_template() {
        let configs = MentionConfigs::new(vec![
            MentionConfig::new("@", "[__display__](__id__)").unwrap(),
            MentionConfig::new("#", "[__display__](__id__)").unwrap(),
            MentionConfig::new(":", ":__id__:").unwrap(),
        ])
        .unwrap();
        assert!(configs.shares_serializer(0, 1));
        assert!(!configs.shares_serializer(0, 2));
    }

    #[test]
    fn test_display_transform_applied() {
        let config = MentionConfig::new("@", "@[__display__](__id__)")
            .unwrap()
            .with_display_transform(|id, display| format!("@{} ({})", display, id));
        assert_eq!(config.display("7", "Ada"), "@Ada (7)");

        let plain = MentionConfig::new("@", "@[__display__](__id__)").unwrap();
        assert_eq!(plain.display("7", "Ada"), "Ada");
    }

    #[test]
    fn test_custom_markup_pattern_checked() {
        let result = MentionConfig::new("@", "@[__display__](__id__)")
            .unwrap()
            .with_markup_pattern(Regex::new(r"@(\w+)").unwrap());
        assert!(matches!(result, Err(Error::CaptureGroupMismatch { .. })));
    }

    #[test]
    fn test_trigger_regexes_compiled_per_dialect() {
        let configs = MentionConfigs::new(vec![
            MentionConfig::new("@", "@[__display__](__id__)").unwrap(),
            MentionConfig::new("#", "#[__display__](__id__)").unwrap(),
        ])
        .unwrap();
        assert_eq!(configs.len(), 2);
        assert!(configs.trigger_regex(0).unwrap().is_match("hi @ad"));
        assert!(configs.trigger_regex(1).unwrap().is_match("#ta"));
        assert!(configs.trigger_regex(2).is_none());
    }
}
