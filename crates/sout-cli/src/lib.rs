//! # sout-cli
//!
//! The `sout` command line tool.
//!
//! - `sout render TEMPLATE [--model FILE|-] [--var KEY=VALUE]... [--null-as-empty]`
//!   renders a template against a JSON model.
//! - `sout check TEMPLATE... [--tree]` parses templates and reports syntax
//!   errors.
//!
//! Settings come from `--config` (or defaults), then `SOUT_*` environment
//! variables, then the global flags (`--dir`, `--open`, `--separator`,
//! `--close`, `--escape`, `--no-promote-scalars`, `--debug`, `--log-level`).
//!
//! ## Quick Start
//!
//! ```rust
//! use sout_cli::default_registry;
//!
//! let registry = default_registry();
//! assert_eq!(registry.list_commands(), vec!["check", "render"]);
//! ```

pub mod command;
pub mod commands;
pub mod input;

use std::ffi::OsString;
use std::io::Write;

use sout_core::logging::setup_logging;
use sout_core::{SoutError, SoutResult};

pub use command::{CliCommand, CommandRegistry};

/// Returns a registry holding the built-in commands.
pub fn default_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();
    commands::register_builtin_commands(&mut registry);
    registry
}

/// Resolves settings from `matches`, sets up logging, and runs the selected
/// subcommand.
///
/// # Errors
///
/// Returns the first error from settings resolution or the command.
pub fn execute(
    registry: &CommandRegistry,
    matches: &clap::ArgMatches,
    out: &mut dyn Write,
) -> SoutResult<()> {
    let (_, sub_matches) = matches
        .subcommand()
        .ok_or_else(|| SoutError::Configuration("No subcommand specified".to_string()))?;
    let settings = input::load_settings(sub_matches)?;
    setup_logging(&settings);
    registry.execute(matches, &settings, out)
}

/// Parses `args` (program name first) and runs the built-in commands.
///
/// # Errors
///
/// Returns [`SoutError::Configuration`] for invalid arguments, and
/// otherwise whatever [`execute`] returns.
pub fn run<I, T>(args: I, out: &mut dyn Write) -> SoutResult<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let registry = default_registry();
    let matches = registry
        .build_cli()
        .try_get_matches_from(args)
        .map_err(|e| SoutError::Configuration(e.to_string()))?;
    execute(&registry, &matches, out)
}
