//! Error types for the companion core library.
//!
//! Per-tick behavior never fails; these errors only surface while loading
//! configuration or doing world bookkeeping around the behavior.

use thiserror::Error;

/// Top-level error type for all companion operations.
#[derive(Error, Debug)]
pub enum CompanionError {
    /// Configuration could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration parsed but holds a value the behavior cannot use.
    #[error("Invalid configuration value for `{field}`: {reason}")]
    InvalidConfig {
        /// The offending option, using its wire name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Entity not found in the world.
    #[error("Entity not found: {0}")]
    EntityNotFound(crate::EntityId),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, CompanionError>;
