//! # sout-core
//!
//! Core types for the sout templating engine. This crate has no engine logic
//! and provides the foundation shared by the other crates.
//!
//! ## Modules
//!
//! - [`position`] - Source coordinates inside template text
//! - [`error`] - The error type and result alias
//! - [`settings`] - Delimiters and other configurable settings
//! - [`settings_loader`] - Loading settings from TOML, JSON and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod position;
pub mod settings;
pub mod settings_loader;

// Re-export the most commonly used types at the crate root.
pub use error::{SoutError, SoutResult};
pub use position::Position;
pub use settings::{Delimiters, Settings};
