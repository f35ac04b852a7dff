//! Markup serializer
//!
//! A markup template such as `@[__display__](__id__)` describes how one
//! mention dialect is written into the markup string. The serializer
//! compiles the template once into a regex for finding mentions and keeps
//! the template split into parts for writing them.

use log::trace;
use regex::Regex;

use crate::error::{Error, Result};
use crate::string_utils::CharCursor;

/// Placeholder replaced by the mention id.
pub const ID_PLACEHOLDER: &str = "__id__";

/// Placeholder replaced by the mention display text.
pub const DISPLAY_PLACEHOLDER: &str = "__display__";

// ─────────────────────────────────────────────────────────────────────────────
// Template Parsing
// ─────────────────────────────────────────────────────────────────────────────

/// The two placeholders a markup template may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Id,
    Display,
}

impl Placeholder {
    fn token(self) -> &'static str {
        match self {
            Placeholder::Id => ID_PLACEHOLDER,
            Placeholder::Display => DISPLAY_PLACEHOLDER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TemplatePart {
    Literal(String),
    Placeholder(Placeholder),
}

/// Split a template at the first occurrence of each placeholder.
fn parse_template(template: &str) -> Vec<TemplatePart> {
    let mut positions: Vec<(usize, Placeholder)> = [Placeholder::Id, Placeholder::Display]
        .into_iter()
        .filter_map(|p| template.find(p.token()).map(|pos| (pos, p)))
        .collect();
    positions.sort_by_key(|&(pos, _)| pos);

    let mut parts = Vec::new();
    let mut cursor = 0;
    for (pos, placeholder) in positions {
        // `__id____display__` style overlaps cannot both be honored
        if pos < cursor {
            continue;
        }
        if pos > cursor {
            parts.push(TemplatePart::Literal(template[cursor..pos].to_string()));
        }
        parts.push(TemplatePart::Placeholder(placeholder));
        cursor = pos + placeholder.token().len();
    }
    if cursor < template.len() {
        parts.push(TemplatePart::Literal(template[cursor..].to_string()));
    }
    parts
}

/// Build the matching regex source for a parsed template.
///
/// Each placeholder becomes a lazy group that stops at the literal character
/// following it in the template; a trailing placeholder takes any text.
fn template_pattern(parts: &[TemplatePart]) -> String {
    let mut pattern = String::new();
    for (i, part) in parts.iter().enumerate() {
        match part {
            TemplatePart::Literal(text) => pattern.push_str(&regex::escape(text)),
            TemplatePart::Placeholder(_) => {
                let next_char = match parts.get(i + 1) {
                    Some(TemplatePart::Literal(text)) => text.chars().next(),
                    _ => None,
                };
                match next_char {
                    Some(c) => {
                        pattern.push_str("([^");
                        pattern.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
                        pattern.push_str("]+?)");
                    }
                    None => pattern.push_str(r"([\s\S]+?)"),
                }
            }
        }
    }
    pattern
}

// ─────────────────────────────────────────────────────────────────────────────
// Matches
// ─────────────────────────────────────────────────────────────────────────────

/// One mention found in a markup string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupMatch {
    /// The full matched markup text
    pub text: String,
    /// Character offset of the match in the markup string
    pub start: usize,
    /// Extracted mention id
    pub id: String,
    /// Extracted display text, `None` when the template has no display placeholder
    pub display: Option<String>,
}

/// Byte-addressed match used by the iterator before offsets are converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawMatch<'a> {
    pub byte_start: usize,
    pub byte_end: usize,
    pub text: &'a str,
    pub id: &'a str,
    pub display: Option<&'a str>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Serializer
// ─────────────────────────────────────────────────────────────────────────────

/// Compiled form of one markup template.
#[derive(Debug, Clone)]
pub struct MarkupSerializer {
    template: String,
    parts: Vec<TemplatePart>,
    regex: Regex,
    /// 1-based capture group holding the id
    id_group: usize,
    /// 1-based capture group holding the display, if the template has one
    display_group: Option<usize>,
}

impl MarkupSerializer {
    /// Compile a markup template.
    ///
    /// # Errors
    ///
    /// `Error::MissingPlaceholder` when the template contains neither placeholder.
    pub fn new(template: &str) -> Result<Self> {
        let parts = Self::checked_parts(template)?;
        let pattern = template_pattern(&parts);
        trace!("Compiled markup '{}' to pattern '{}'", template, pattern);
        let regex = Regex::new(&pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        Ok(Self::assemble(template, parts, regex))
    }

    /// Use a caller-supplied regex for finding mentions while the template
    /// is still used for writing them.
    ///
    /// The regex must have exactly one capturing group per placeholder, in
    /// the order the placeholders appear in the template.
    ///
    /// # Errors
    ///
    /// `Error::MissingPlaceholder` for a template without placeholders and
    /// `Error::CaptureGroupMismatch` when the group count is wrong.
    pub fn with_pattern(template: &str, regex: Regex) -> Result<Self> {
        let serializer = Self::assemble(template, Self::checked_parts(template)?, regex);
        let expected = serializer.placeholder_count();
        let found = serializer.regex.captures_len() - 1;
        if found != expected {
            return Err(Error::CaptureGroupMismatch {
                template: template.to_string(),
                expected,
                found,
            });
        }
        Ok(serializer)
    }

    fn checked_parts(template: &str) -> Result<Vec<TemplatePart>> {
        let parts = parse_template(template);
        if !parts
            .iter()
            .any(|p| matches!(p, TemplatePart::Placeholder(_)))
        {
            return Err(Error::MissingPlaceholder {
                template: template.to_string(),
            });
        }
        Ok(parts)
    }

    fn assemble(template: &str, parts: Vec<TemplatePart>, regex: Regex) -> Self {
        let order: Vec<Placeholder> = parts
            .iter()
            .filter_map(|p| match p {
                TemplatePart::Placeholder(placeholder) => Some(*placeholder),
                TemplatePart::Literal(_) => None,
            })
            .collect();
        let group_of = |wanted: Placeholder| order.iter().position(|&p| p == wanted).map(|i| i + 1);

        // With a single placeholder the one group serves as both id and display
        let display_group = group_of(Placeholder::Display);
        let id_group = group_of(Placeholder::Id).or(display_group).unwrap_or(1);

        Self {
            template: template.to_string(),
            parts,
            regex,
            id_group,
            display_group,
        }
    }

    /// Dialect identity: the template string itself.
    pub fn id(&self) -> &str {
        &self.template
    }

    /// The compiled matcher.
    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Whether the template writes the display text.
    pub fn has_display(&self) -> bool {
        self.display_group.is_some()
    }

    /// Number of placeholders in the template (1 or 2).
    pub fn placeholder_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, TemplatePart::Placeholder(_)))
            .count()
    }

    /// Write a mention. A missing display falls back to the id.
    ///
    /// # Example
    /// ```ignore
    /// let s = MarkupSerializer::new("@[__display__](__id__)")?;
    /// assert_eq!(s.insert("42", Some("Ada")), "@[Ada](42)");
    /// ```
    pub fn insert(&self, id: &str, display: Option<&str>) -> String {
        let mut out = String::with_capacity(self.template.len() + id.len());
        for part in &self.parts {
            match part {
                TemplatePart::Literal(text) => out.push_str(text),
                TemplatePart::Placeholder(Placeholder::Id) => out.push_str(id),
                TemplatePart::Placeholder(Placeholder::Display) => {
                    out.push_str(display.unwrap_or(id))
                }
            }
        }
        out
    }

    /// Find every non-overlapping mention of this dialect in `buffer`.
    pub fn find_all(&self, buffer: &str) -> Vec<MarkupMatch> {
        let mut cursor = CharCursor::default();
        self.find_raw(buffer)
            .into_iter()
            .map(|raw| MarkupMatch {
                text: raw.text.to_string(),
                start: cursor.advance_to(buffer, raw.byte_start),
                id: raw.id.to_string(),
                display: raw.display.map(str::to_string),
            })
            .collect()
    }

    pub(crate) fn find_raw<'a>(&self, buffer: &'a str) -> Vec<RawMatch<'a>> {
        self.regex
            .captures_iter(buffer)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                if whole.as_str().is_empty() {
                    return None;
                }
                Some(RawMatch {
                    byte_start: whole.start(),
                    byte_end: whole.end(),
                    text: whole.as_str(),
                    id: caps.get(self.id_group).map_or("", |m| m.as_str()),
                    display: self
                        .display_group
                        .and_then(|group| caps.get(group))
                        .map(|m| m.as_str()),
                })
            })
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
