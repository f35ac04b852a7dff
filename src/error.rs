//! Centralized error handling for ferrite-mentions
//!
//! This module provides a unified error type that covers all error scenarios
//! in the crate: mention configuration mistakes made by the integrating
//! application, and settings file I/O.
//!
//! Runtime conditions caused by user input (a caret inside a mention, an
//! autocorrected edit, a stale suggestion result) are never errors; the
//! functions that meet them return `Option` or recover internally.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the crate.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Mention Configuration Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Markup template contains neither `__id__` nor `__display__`
    MissingPlaceholder { template: String },

    /// A caller-supplied regex does not capture one group per placeholder
    CaptureGroupMismatch {
        template: String,
        expected: usize,
        found: usize,
    },

    /// Two mention dialects of one input share the same trigger
    DuplicateTrigger { trigger: String },

    /// A trigger or markup pattern failed to compile
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Settings I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to load a settings file
    ConfigLoad {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to save a settings file
    ConfigSave {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to parse settings (invalid JSON/format)
    ConfigParse {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,
}

impl Error {
    /// Whether this error signals a programming mistake in the mention
    /// configuration rather than an environment problem.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::MissingPlaceholder { .. }
                | Error::CaptureGroupMismatch { .. }
                | Error::DuplicateTrigger { .. }
                | Error::InvalidPattern { .. }
        )
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::ConfigParse {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::MissingPlaceholder { template } => write!(
                f,
                "Markup template '{}' must contain '__id__' and/or '__display__'",
                template
            ),
            Error::CaptureGroupMismatch {
                template,
                expected,
                found,
            } => write!(
                f,
                "Regex for markup '{}' has {} capturing group(s), expected {}",
                template, found, expected
            ),
            Error::DuplicateTrigger { trigger } => {
                write!(f, "Trigger '{}' is declared more than once", trigger)
            }
            Error::InvalidPattern { pattern, source } => {
                write!(f, "Invalid pattern '{}': {}", pattern, source)
            }

            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::ConfigLoad { path, source } => {
                write!(
                    f,
                    "Failed to load settings from '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigSave { path, source } => {
                write!(
                    f,
                    "Failed to save settings to '{}': {}",
                    path.display(),
                    source
                )
            }
            Error::ConfigParse { message, .. } => {
                write!(f, "Invalid settings format: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidPattern { source, .. } => Some(source),
            Error::Io(err) => Some(err),
            Error::ConfigLoad { source, .. } => Some(source.as_ref()),
            Error::ConfigSave { source, .. } => Some(source.as_ref()),
            Error::ConfigParse { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn std::error::Error + 'static)),
            Error::MissingPlaceholder { .. }
            | Error::CaptureGroupMismatch { .. }
            | Error::DuplicateTrigger { .. }
            | Error::ConfigDirNotFound => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn test_missing_placeholder_display() {
        let err = Error::MissingPlaceholder {
            template: "@[name]".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("@[name]"));
        assert!(msg.contains("__id__"));
    }

    #[test]
    fn test_capture_group_mismatch_display() {
        let err = Error::CaptureGroupMismatch {
            template: "@[__display__](__id__)".to_string(),
            expected: 2,
            found: 1,
        };
        assert_eq!(
            err.to_string(),
            "Regex for markup '@[__display__](__id__)' has 1 capturing group(s), expected 2"
        );
    }

    #[test]
    fn test_duplicate_trigger_display() {
        let err = Error::DuplicateTrigger {
            trigger: "@".to_string(),
        };
        assert_eq!(err.to_string(), "Trigger '@' is declared more than once");
    }

    #[test]
    fn test_configuration_error_classification() {
        let err = Error::DuplicateTrigger {
            trigger: "#".to_string(),
        };
        assert!(err.is_configuration_error());
        assert!(!Error::ConfigDirNotFound.is_configuration_error());
    }

    #[test]
    fn test_invalid_pattern_has_source() {
        let regex_err = regex::Regex::new("(").unwrap_err();
        let err = Error::InvalidPattern {
            pattern: "(".to_string(),
            source: regex_err,
        };
        assert!(err.source().is_some());
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_io_error_creation() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test error");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_result: std::result::Result<String, _> = serde_json::from_str("invalid json");
        let err = Error::from(json_result.unwrap_err());
        assert!(matches!(err, Error::ConfigParse { .. }));
    }

    #[test]
    fn test_error_source_none_for_simple_variants() {
        let err = Error::MissingPlaceholder {
            template: "x".to_string(),
        };
        assert!(err.source().is_none());
        assert!(Error::ConfigDirNotFound.source().is_none());
    }

    #[test]
    fn test_unwrap_or_warn_default() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.unwrap_or_warn_default(0, "test context"), 42);

        let err: Result<i32> = Err(Error::ConfigDirNotFound);
        assert_eq!(err.unwrap_or_warn_default(7, "test context"), 7);
    }
}
