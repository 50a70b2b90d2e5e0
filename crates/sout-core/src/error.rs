//! Core error types for sout.
//!
//! This module provides the single error enum [`SoutError`] shared by the
//! parser, the renderer, the configuration layer and the command line tool.
//! Every variant that can be traced back to a spot in a template carries a
//! [`Position`], and is displayed as `"<row>:<col> <message>"`.

use thiserror::Error;

use crate::position::Position;

/// The primary error type for sout.
///
/// A parse either produces a complete template or exactly one
/// [`SoutError::Parse`]; a render either succeeds or fails with exactly one
/// error. There is no recovery.
///
/// # Examples
///
/// ```
/// use sout_core::{Position, SoutError};
///
/// let err = SoutError::render_at("Null value.", Position::new(1, 2));
/// assert_eq!(err.to_string(), "1:2 Null value.");
///
/// let err = SoutError::render("Null value.");
/// assert_eq!(err.to_string(), "Null value.");
/// ```
#[derive(Error, Debug)]
pub enum SoutError {
    // ── Templates ────────────────────────────────────────────────────

    /// The template text is not well-formed.
    #[error("{position} {message}")]
    Parse {
        /// What went wrong.
        message: String,
        /// Where the parser was when it gave up.
        position: Position,
    },

    /// Rendering a template against a model failed.
    ///
    /// Name resolution failures, illegal part counts, `null` values and
    /// unrenderable values all end up here.
    #[error("{}{message}", located(.position))]
    Render {
        /// What went wrong.
        message: String,
        /// The position of the node being rendered, when known.
        position: Option<Position>,
    },

    /// Writing to the output sink failed.
    #[error("{}failed to write output: {source}", located(.position))]
    Sink {
        /// The position of the node being written, when known.
        position: Option<Position>,
        /// The underlying I/O failure.
        source: std::io::Error,
    },

    /// A scope variable was updated before it was defined.
    #[error("Variable {0} not found.")]
    UndefinedVariable(String),

    /// The requested template could not be found by any loader.
    #[error("Template does not exist: {0}")]
    TemplateDoesNotExist(String),

    // ── Configuration ────────────────────────────────────────────────

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ── Serialization ────────────────────────────────────────────────

    /// A model could not be converted into a template value.
    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── IO ───────────────────────────────────────────────────────────

    /// An I/O error occurred outside of rendering.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Formats an optional position as a `"<row>:<col> "` prefix.
fn located(position: &Option<Position>) -> String {
    position.map(|p| format!("{p} ")).unwrap_or_default()
}

impl SoutError {
    /// Creates a parse error at the given position.
    pub fn parse(message: impl Into<String>, position: Position) -> Self {
        Self::Parse {
            message: message.into(),
            position,
        }
    }

    /// Creates a render error that is not (yet) tied to a position.
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
            position: None,
        }
    }

    /// Creates a render error at the given position.
    pub fn render_at(message: impl Into<String>, position: Position) -> Self {
        Self::Render {
            message: message.into(),
            position: Some(position),
        }
    }

    /// Wraps a failed write to the output sink.
    pub const fn sink(source: std::io::Error, position: Position) -> Self {
        Self::Sink {
            position: Some(position),
            source,
        }
    }

    /// Returns the template position attached to this error, if any.
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Parse { position, .. } => Some(*position),
            Self::Render { position, .. } | Self::Sink { position, .. } => *position,
            _ => None,
        }
    }

    /// Attaches `position` to a render or sink error that has none yet.
    ///
    /// Errors that already carry a position keep it: the innermost node that
    /// failed is the most precise location.
    #[must_use]
    pub fn with_position(self, at: Position) -> Self {
        match self {
            Self::Render {
                message,
                position: None,
            } => Self::Render {
                message,
                position: Some(at),
            },
            Self::Sink {
                source,
                position: None,
            } => Self::Sink {
                source,
                position: Some(at),
            },
            Self::UndefinedVariable(name) => Self::Render {
                message: format!("Variable {name} not found."),
                position: Some(at),
            },
            other => other,
        }
    }

    /// Returns `true` for errors raised while parsing template text.
    pub const fn is_parse_error(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// A convenience type alias for `Result<T, SoutError>`.
pub type SoutResult<T> = Result<T, SoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = SoutError::parse("Unexpected open { in name.", Position::new(2, 5));
        assert_eq!(err.to_string(), "2:5 Unexpected open { in name.");
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_render_error_without_position() {
        let err = SoutError::render("Null value.");
        assert_eq!(err.to_string(), "Null value.");
        assert_eq!(err.position(), None);
    }

    #[test]
    fn test_with_position_fills_missing_position() {
        let err = SoutError::render("Null value.").with_position(Position::new(1, 3));
        assert_eq!(err.position(), Some(Position::new(1, 3)));
        assert_eq!(err.to_string(), "1:3 Null value.");
    }

    #[test]
    fn test_with_position_keeps_inner_position() {
        let err = SoutError::render_at("inner", Position::new(4, 1))
            .with_position(Position::new(1, 1));
        assert_eq!(err.position(), Some(Position::new(4, 1)));
    }

    #[test]
    fn test_undefined_variable_becomes_located_render_error() {
        let err = SoutError::UndefinedVariable("count".into()).with_position(Position::new(1, 9));
        assert_eq!(err.to_string(), "1:9 Variable count not found.");
    }

    #[test]
    fn test_sink_error_display() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = SoutError::sink(io, Position::new(1, 1));
        assert_eq!(err.to_string(), "1:1 failed to write output: pipe closed");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SoutError = io_err.into();
        assert!(err.to_string().contains("file missing"));
        assert_eq!(err.position(), None);
    }
}
