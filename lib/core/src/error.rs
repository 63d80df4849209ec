//! Error handling foundation for oauthgate.
//!
//! Provides the `Result` alias over rootcause's `Report`, plus the one error
//! type every component can hit while it is being built: invalid
//! configuration. Request-time errors live with the component that raises
//! them.

use rootcause::Report;
use std::fmt;

/// A Result type alias using rootcause's Report for error handling.
///
/// Each layer adds its own context via `.context()` as errors propagate.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

/// A configuration value was rejected while constructing a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// Dotted name of the offending setting, e.g. `sessions.key`.
    pub field: String,
    /// Why the value was rejected.
    pub reason: String,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration for '{}': {}", self.field, self.reason)
    }
}

impl std::error::Error for ConfigError {}
