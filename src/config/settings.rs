//! Declarative mention settings
//!
//! `MentionSettings` is the serializable description of an input's mention
//! dialects, loaded from JSON. It is turned into validated
//! [`MentionConfigs`] with [`MentionSettings::to_configs`].

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::mentions::{DataSource, MentionConfig, MentionConfigs, SuggestionItem, Trigger};

/// Default trigger of the built-in dialect.
pub const DEFAULT_TRIGGER: &str = "@";

/// Default markup template of the built-in dialect.
pub const DEFAULT_MARKUP: &str = "@[__display__](__id__)";

// ─────────────────────────────────────────────────────────────────────────────
// Dialect Settings
// ─────────────────────────────────────────────────────────────────────────────

/// One mention dialect as written in the settings file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectSettings {
    /// Literal trigger, ignored when `trigger_pattern` is set
    pub trigger: String,
    /// Full trigger regex (group 1 = trigger+query, group 2 = query)
    pub trigger_pattern: Option<String>,
    /// Markup template with `__id__` and/or `__display__`
    pub markup: String,
    /// Regex replacing the one compiled from `markup`
    pub regex: Option<String>,
    /// Prefix added to the display text in the plain-text view (e.g. "@")
    pub display_prefix: Option<String>,
    pub append_space_on_add: bool,
    /// Overrides the input-level setting
    pub allow_space_in_query: Option<bool>,
    /// Overrides the input-level setting
    pub ignore_accents: Option<bool>,
    /// Static suggestions; absent means results are supplied at runtime
    pub data: Option<Vec<SuggestionItem>>,
}

impl Default for DialectSettings {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            trigger_pattern: None,
            markup: DEFAULT_MARKUP.to_string(),
            regex: None,
            display_prefix: None,
            append_space_on_add: false,
            allow_space_in_query: None,
            ignore_accents: None,
            data: None,
        }
    }
}

impl DialectSettings {
    fn has_trigger(&self) -> bool {
        !self.trigger.is_empty() || self.trigger_pattern.as_deref().is_some_and(|p| !p.is_empty())
    }

    fn to_config(&self, input: &MentionSettings) -> Result<MentionConfig> {
        let trigger = match self.trigger_pattern.as_deref().filter(|p| !p.is_empty()) {
            Some(pattern) => Trigger::Pattern(compile(pattern)?),
            None => Trigger::Literal(self.trigger.clone()),
        };

        let mut config = MentionConfig::new(trigger, &self.markup)?;
        if let Some(regex) = &self.regex {
            config = config.with_markup_pattern(compile(regex)?)?;
        }
        if let Some(prefix) = self.display_prefix.clone() {
            config = config.with_display_transform(move |_, display| format!("{}{}", prefix, display));
        }

        let data = match &self.data {
            Some(items) => DataSource::Static(items.clone()),
            None => DataSource::Deferred,
        };
        Ok(config
            .with_data(data)
            .append_space_on_add(self.append_space_on_add)
            .allow_space_in_query(self.allow_space_in_query.unwrap_or(input.allow_space_in_query))
            .ignore_accents(self.ignore_accents.unwrap_or(input.ignore_accents)))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Mention Settings
// ─────────────────────────────────────────────────────────────────────────────

/// Mention settings of one input.
///
/// All fields have defaults, so a partial file still loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionSettings {
    /// Queries may contain whitespace
    pub allow_space_in_query: bool,
    /// Match suggestions regardless of accents
    pub ignore_accents: bool,
    /// Dialects in matching order
    pub dialects: Vec<DialectSettings>,
}

impl Default for MentionSettings {
    fn default() -> Self {
        Self {
            allow_space_in_query: false,
            ignore_accents: false,
            dialects: vec![DialectSettings::default()],
        }
    }
}

impl MentionSettings {
    /// Drop dialects that cannot work: no markup or no trigger.
    ///
    /// An input left without dialects gets the default one back.
    pub fn sanitize(&mut self) {
        self.dialects.retain(|dialect| {
            let usable = !dialect.markup.trim().is_empty() && dialect.has_trigger();
            if !usable {
                warn!(
                    "Ignoring mention dialect with trigger '{}' and markup '{}'",
                    dialect.trigger, dialect.markup
                );
            }
            usable
        });

        if self.dialects.is_empty() {
            warn!("No usable mention dialects configured, using the default");
            self.dialects.push(DialectSettings::default());
        }
    }

    /// Parse JSON settings and sanitize them.
    pub fn from_json_sanitized(json: &str) -> serde_json::Result<Self> {
        let mut settings: Self = serde_json::from_str(json)?;
        settings.sanitize();
        Ok(settings)
    }

    /// Build the validated dialects.
    ///
    /// # Errors
    ///
    /// Any configuration error of the dialects: bad templates, bad regexes,
    /// duplicate triggers.
    pub fn to_configs(&self) -> Result<MentionConfigs> {
        let entries = self
            .dialects
            .iter()
            .map(|dialect| dialect.to_config(self))
            .collect::<Result<Vec<_>>>()?;
        MentionConfigs::new(entries)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::get_plain_text;

    #[test]
    fn test_default_settings_build_default_dialect() {
        let configs = MentionSettings::default().to_configs().unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs.get(0).unwrap().markup(), DEFAULT_MARKUP);
        assert_eq!(get_plain_text("hi @[Ada](1)", &configs), "hi Ada");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = MentionSettings::from_json_sanitized(r#"{"ignore_accents": true}"#).unwrap();
        assert!(settings.ignore_accents);
        assert_eq!(settings.dialects, vec![DialectSettings::default()]);
    }

    #[test]
    fn test_sanitize_drops_unusable_dialects() {
        let mut settings = MentionSettings {
            dialects: vec![
                DialectSettings {
                    markup: String::new(),
                    ..DialectSettings::default()
                },
                DialectSettings {
                    trigger: String::new(),
                    ..DialectSettings::default()
                },
                DialectSettings {
                    trigger: "#".to_string(),
                    markup: "#[__display__](__id__)".to_string(),
                    ..DialectSettings::default()
                },
            ],
            ..MentionSettings::default()
        };
        settings.sanitize();
        assert_eq!(settings.dialects.len(), 1);
        assert_eq!(settings.dialects[0].trigger, "#");
    }

    #[test]
    fn test_sanitize_restores_default_when_empty() {
        let mut settings = MentionSettings {
            dialects: Vec::new(),
            ..MentionSettings::default()
        };
        settings.sanitize();
        assert_eq!(settings.dialects, vec![DialectSettings::default()]);
    }

    #[test]
    fn test_dialect_options_reach_configs() {
        let json = r#"{
            "allow_space_in_query": true,
            "dialects": [
                {
                    "trigger": "@",
                    "markup": "@[__display__](user:__id__)",
                    "display_prefix": "@",
                    "append_space_on_add": true,
                    "ignore_accents": true,
                    "data": [{"id": "1", "display": "Ada"}, {"id": "bob"}]
                },
                {
                    "trigger_pattern": "(?:^|\\s)(:([a-z]+))$",
                    "markup": ":__id__:",
                    "allow_space_in_query": false
                }
            ]
        }"#;
        let settings = MentionSettings::from_json_sanitized(json).unwrap();
        let configs = settings.to_configs().unwrap();

        let people = configs.get(0).unwrap();
        assert!(people.append_space_on_add);
        assert!(people.allow_space_in_query);
        assert!(people.ignore_accents);
        assert_eq!(people.display("1", "Ada"), "@Ada");
        assert!(matches!(&people.data, DataSource::Static(items) if items.len() == 2));

        let emoji = configs.get(1).unwrap();
        assert!(matches!(emoji.trigger(), Trigger::Pattern(_)));
        assert!(!emoji.allow_space_in_query);
        assert_eq!(emoji.data, DataSource::Deferred);
    }

    #[test]
    fn test_configuration_errors_propagate() {
        let settings = MentionSettings {
            dialects: vec![DialectSettings::default(), DialectSettings::default()],
            ..MentionSettings::default()
        };
        assert!(matches!(
            settings.to_configs(),
            Err(Error::DuplicateTrigger { .. })
        ));

        let settings = MentionSettings {
            dialects: vec![DialectSettings {
                regex: Some("([unclosed".to_string()),
                ..DialectSettings::default()
            }],
            ..MentionSettings::default()
        };
        let err = settings.to_configs().unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_settings_round_trip_through_json() {
        let settings = MentionSettings {
            ignore_accents: true,
            ..MentionSettings::default()
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert_eq!(MentionSettings::from_json_sanitized(&json).unwrap(), settings);
    }
}
