//! Settings for sout.
//!
//! This module provides the [`Settings`] struct, which holds everything that
//! can be configured from a file or the environment, and [`Delimiters`], the
//! four characters that make up the template syntax.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SoutError;

/// The four characters that drive the template grammar.
///
/// # Examples
///
/// ```
/// use sout_core::settings::Delimiters;
///
/// let delimiters = Delimiters::default();
/// assert_eq!(delimiters.open, '{');
/// assert_eq!(delimiters.separator, '|');
/// assert_eq!(delimiters.close, '}');
/// assert_eq!(delimiters.escape, '\\');
/// assert!(delimiters.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delimiters {
    /// Opens a name or a nesting, like `{` or `<`.
    pub open: char,
    /// Separates the parts of a nesting, like `|`.
    pub separator: char,
    /// Closes a name or a nesting, like `}` or `>`.
    pub close: char,
    /// Makes the next delimiter character literal, like `\`.
    pub escape: char,
}

impl Delimiters {
    /// Creates a new set of delimiters.
    pub const fn new(open: char, separator: char, close: char, escape: char) -> Self {
        Self {
            open,
            separator,
            close,
            escape,
        }
    }

    /// Checks that the four characters are pairwise distinct.
    ///
    /// # Errors
    ///
    /// Returns [`SoutError::Configuration`] when two roles share a character.
    pub fn validate(&self) -> Result<(), SoutError> {
        let roles = [
            ("open", self.open),
            ("separator", self.separator),
            ("close", self.close),
            ("escape", self.escape),
        ];
        for (i, (role, c)) in roles.iter().enumerate() {
            if let Some((other, _)) = roles[i + 1..].iter().find(|(_, d)| d == c) {
                return Err(SoutError::Configuration(format!(
                    "Delimiter '{c}' is used both as {role} and as {other}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new('{', '|', '}', '\\')
    }
}

/// The complete set of settings.
///
/// # Examples
///
/// ```
/// use sout_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(!settings.debug);
/// assert_eq!(settings.log_level, "info");
/// assert!(settings.promote_scalars);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Whether debug mode is enabled (pretty, verbose logging).
    pub debug: bool,
    /// The tracing filter directive, e.g. `info` or `sout_template=trace`.
    pub log_level: String,
    /// The template syntax.
    pub delimiters: Delimiters,
    /// Whether a single non-sequence value may be looped over as a
    /// one-element sequence.
    pub promote_scalars: bool,
    /// Directories searched for template files.
    pub template_dirs: Vec<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            log_level: "info".to_string(),
            delimiters: Delimiters::default(),
            promote_scalars: true,
            template_dirs: Vec::new(),
        }
    }
}
