//! Configuration module for ferrite-mentions
//!
//! This module handles the declarative mention settings, including
//! serialization/deserialization to/from JSON and persistent storage in
//! platform-specific directories.

mod persistence;
mod settings;

pub use persistence::*;
pub use settings::*;
