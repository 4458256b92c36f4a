//! Error types for the electrolysis bubble field.
//!
//! This module provides error types for configuration validation, drawable
//! allocation, cable layout and configuration file loading.

use std::fmt;

/// Errors raised when a [`BubbleConfig`](crate::BubbleConfig) is rejected.
///
/// Validation only ever happens at construction time. A field that was built
/// successfully never reports a configuration error afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A tunable is outside its accepted range.
    InvalidConfiguration {
        /// Name of the offending field.
        field: &'static str,
        /// Human readable constraint that was violated.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidConfiguration { field, reason } => {
                write!(f, "Invalid bubble configuration: `{}` {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors a [`DrawableFactory`](crate::DrawableFactory) may report.
///
/// The bubble field treats every variant the same way: the bubble that asked
/// for the drawable is simply not spawned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawableError {
    /// The renderer has no room for another primitive.
    Exhausted {
        /// Number of primitives the renderer was allowed to hold.
        budget: usize,
    },
    /// Renderer-specific failure.
    Backend(String),
}

impl fmt::Display for DrawableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawableError::Exhausted { budget } => {
                write!(f, "Drawable budget of {} primitives exhausted", budget)
            }
            DrawableError::Backend(msg) => {
                write!(f, "Renderer failed to allocate drawable: {}", msg)
            }
        }
    }
}

impl std::error::Error for DrawableError {}

/// Errors that can occur when laying out a cable.
#[derive(Debug, Clone, PartialEq)]
pub enum CableError {
    /// Fewer than two segments were requested (a cable needs a plug and a clip).
    TooFewSegments(usize),
    /// Start and end points coincide, so the cable has no direction.
    ZeroLength,
    /// Radius must be positive and finite.
    InvalidRadius(f32),
}

impl fmt::Display for CableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CableError::TooFewSegments(n) => {
                write!(f, "A cable needs at least 2 segments, got {}", n)
            }
            CableError::ZeroLength => write!(f, "Cable start and end points coincide"),
            CableError::InvalidRadius(r) => write!(f, "Cable radius must be positive, got {}", r),
        }
    }
}

impl std::error::Error for CableError {}

/// Errors that can occur when loading or saving a configuration file.
#[derive(Debug)]
pub enum LoadError {
    /// Failed to read or write the file.
    Io(std::io::Error),
    /// The file is not valid JSON for the expected type.
    Json(serde_json::Error),
    /// The file parsed but describes an invalid configuration.
    Config(ConfigError),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "Failed to access config file: {}", e),
            LoadError::Json(e) => write!(f, "Failed to parse config file: {}", e),
            LoadError::Config(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::Json(e) => Some(e),
            LoadError::Config(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(e: std::io::Error) -> Self {
        LoadError::Io(e)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(e: serde_json::Error) -> Self {
        LoadError::Json(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Config(e)
    }
}
