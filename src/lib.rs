//! ferrite-mentions
//!
//! Engine of a text input with inline mentions. The input edits plain text
//! while the value is kept as markup such as `Hi @[Ada](42)`; this crate
//! keeps the two in step.
//!
//! - [`markup`]: parsing, offset mapping, edit replay and derived views
//! - [`mentions`]: dialects, triggers, suggestions, selection, clipboard and
//!   the headless input state
//! - [`search`]: case- and accent-insensitive substring search
//! - [`config`]: JSON settings and their persistence

pub mod config;
pub mod error;
pub mod markup;
pub mod mentions;
pub mod search;
pub mod string_utils;

pub use error::{Error, Result};
