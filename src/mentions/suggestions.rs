//! Suggestion lookup and navigation
//!
//! Every active query becomes a [`SuggestionRequest`] stamped with the
//! current [`QueryGeneration`]. Static data is answered on the spot; deferred
//! data is answered later by the caller through the same
//! [`Suggestions::deliver`] path. A delivery for an older generation is
//! dropped, so a slow lookup can never overwrite the results of a newer one.

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::config::MentionConfigs;
use super::trigger::QueryInfo;
use crate::search::get_substring_index;

// ─────────────────────────────────────────────────────────────────────────────
// Data
// ─────────────────────────────────────────────────────────────────────────────

/// One entity that can be mentioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl SuggestionItem {
    pub fn new(id: impl Into<String>, display: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: Some(display.into()),
        }
    }

    /// An item shown by its id.
    pub fn from_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display: None,
        }
    }

    /// The text a query is matched against.
    pub fn label(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.id)
    }
}

/// Where a dialect's suggestions come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A fixed list, filtered against the query in-process
    Static(Vec<SuggestionItem>),
    /// Results arrive later through [`Suggestions::deliver`]
    Deferred,
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Static(Vec::new())
    }
}

/// Items of `items` whose label contains `query`, case-insensitively.
pub fn filter_static(items: &[SuggestionItem], query: &str, ignore_accents: bool) -> Vec<SuggestionItem> {
    items
        .iter()
        .filter(|item| get_substring_index(item.label(), query, ignore_accents, true).is_some())
        .cloned()
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Monotonic stamp identifying one round of queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QueryGeneration(u64);

impl QueryGeneration {
    fn next(self) -> Self {
        QueryGeneration(self.0.wrapping_add(1))
    }
}

/// A lookup the caller has to answer for a deferred data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub generation: QueryGeneration,
    pub query_info: QueryInfo,
}

/// Results of one dialect for the current query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialectResults {
    pub query_info: QueryInfo,
    pub results: Vec<SuggestionItem>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Suggestions
// ─────────────────────────────────────────────────────────────────────────────

/// Current suggestion results of one input, with keyboard focus.
#[derive(Debug, Clone, Default)]
pub struct Suggestions {
    generation: QueryGeneration,
    /// Keyed by dialect index so iteration follows dialect order
    entries: BTreeMap<usize, DialectResults>,
    focus_index: usize,
}

impl Suggestions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> QueryGeneration {
        self.generation
    }

    /// Start a new round for `queries`, invalidating every earlier request.
    ///
    /// Static sources are answered immediately. The returned requests are
    /// the ones the caller still has to answer.
    pub fn begin_queries(
        &mut self,
        queries: Vec<QueryInfo>,
        configs: &MentionConfigs,
    ) -> Vec<SuggestionRequest> {
        self.clear();

        let mut pending = Vec::new();
        for query_info in queries {
            let Some(config) = configs.get(query_info.child_index) else {
                continue;
            };
            let request = SuggestionRequest {
                generation: self.generation,
                query_info,
            };
            match &config.data {
                DataSource::Static(items) => {
                    let results =
                        filter_static(items, &request.query_info.query, config.ignore_accents);
                    self.deliver(&request, results);
                }
                DataSource::Deferred => pending.push(request),
            }
        }
        pending
    }

    /// Store the results of `request`.
    ///
    /// Returns `false` and keeps the current results when the request
    /// belongs to an older generation.
    pub fn deliver(&mut self, request: &SuggestionRequest, results: Vec<SuggestionItem>) -> bool {
        if request.generation != self.generation {
            debug!(
                "Discarding stale suggestions for {:?} (current {:?})",
                request.generation, self.generation
            );
            return false;
        }

        self.entries.insert(
            request.query_info.child_index,
            DialectResults {
                query_info: request.query_info.clone(),
                results,
            },
        );
        let count = self.count();
        if self.focus_index >= count {
            self.focus_index = count.saturating_sub(1);
        }
        true
    }

    /// Drop all results. Outstanding requests become stale.
    pub fn clear(&mut self) {
        self.generation = self.generation.next();
        self.entries.clear();
        self.focus_index = 0;
    }

    /// Total number of suggestions across dialects.
    pub fn count(&self) -> usize {
        self.entries.values().map(|e| e.results.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Results per dialect, in dialect order.
    pub fn dialects(&self) -> impl Iterator<Item = &DialectResults> {
        self.entries.values()
    }

    /// Suggestion at position `index` of the flattened list, with its query.
    pub fn get(&self, index: usize) -> Option<(&SuggestionItem, &QueryInfo)> {
        let mut remaining = index;
        for entry in self.entries.values() {
            if remaining < entry.results.len() {
                return Some((&entry.results[remaining], &entry.query_info));
            }
            remaining -= entry.results.len();
        }
        None
    }

    pub fn focus_index(&self) -> usize {
        self.focus_index
    }

    pub fn focused(&self) -> Option<(&SuggestionItem, &QueryInfo)> {
        self.get(self.focus_index)
    }

    /// Move focus down, wrapping to the top.
    pub fn focus_next(&mut self) -> Option<usize> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        self.focus_index = (self.focus_index + 1) % count;
        Some(self.focus_index)
    }

    /// Move focus up, wrapping to the bottom.
    pub fn focus_previous(&mut self) -> Option<usize> {
        let count = self.count();
        if count == 0 {
            return None;
        }
        self.focus_index = if self.focus_index == 0 {
            count - 1
        } else {
            self.focus_index - 1
        };
        Some(self.focus_index)
    }

    pub fn set_focus(&mut self, index: usize) {
        self.focus_index = index.min(self.count().saturating_sub(1));
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
