//! Command framework for the `sout` tool.
//!
//! This module provides the [`CliCommand`] trait for defining subcommands and
//! [`CommandRegistry`] for registering them and dispatching to them.
//!
//! ## Defining a Custom Command
//!
//! ```rust
//! use std::io::Write;
//! use sout_cli::command::{CliCommand, CommandRegistry};
//! use sout_core::{Settings, SoutError, SoutResult};
//!
//! struct Greet;
//!
//! impl CliCommand for Greet {
//!     fn name(&self) -> &'static str { "greet" }
//!     fn help(&self) -> &'static str { "Say hello" }
//!
//!     fn handle(
//!         &self,
//!         _matches: &clap::ArgMatches,
//!         _settings: &Settings,
//!         out: &mut dyn Write,
//!     ) -> SoutResult<()> {
//!         writeln!(out, "hello").map_err(SoutError::from)
//!     }
//! }
//!
//! let mut registry = CommandRegistry::new();
//! registry.register(Box::new(Greet));
//! let matches = registry.build_cli().try_get_matches_from(["sout", "greet"]).unwrap();
//! let mut out = Vec::new();
//! registry.execute(&matches, &Default::default(), &mut out).unwrap();
//! assert_eq!(out, b"hello\n");
//! ```

use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction};
use sout_core::{Settings, SoutError, SoutResult};

/// A subcommand that can be registered and invoked through the CLI.
pub trait CliCommand: Send + Sync {
    /// Returns the name this command is invoked by.
    fn name(&self) -> &'static str;

    /// Returns a short help description for this command.
    fn help(&self) -> &'static str;

    /// Adds command-specific arguments. The default adds none.
    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd
    }

    /// Runs the command, writing its normal output to `out`.
    fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> SoutResult<()>;
}

/// A registry of subcommands.
pub struct CommandRegistry {
    commands: HashMap<&'static str, Box<dyn CliCommand>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandRegistry {
    /// Creates a new empty command registry.
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registers a command, replacing any command with the same name.
    pub fn register(&mut self, command: Box<dyn CliCommand>) {
        self.commands.insert(command.name(), command);
    }

    /// Returns the command with the given name, if registered.
    pub fn get(&self, name: &str) -> Option<&dyn CliCommand> {
        self.commands.get(name).map(AsRef::as_ref)
    }

    /// Returns a sorted list of all registered command names.
    pub fn list_commands(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Builds the top-level clap `Command` with every registered subcommand
    /// and the global settings arguments.
    pub fn build_cli(&self) -> clap::Command {
        let mut app = clap::Command::new("sout")
            .about("Render and check sout templates")
            .version(env!("CARGO_PKG_VERSION"))
            .subcommand_required(true)
            .arg_required_else_help(true);
        app = global_arguments(app);

        let mut entries: Vec<_> = self.commands.iter().collect();
        entries.sort_by_key(|(name, _)| **name);
        for (name, cmd) in entries {
            let subcmd = clap::Command::new(*name).about(cmd.help());
            app = app.subcommand(cmd.add_arguments(subcmd));
        }

        app
    }

    /// Dispatches to the subcommand named in `matches`.
    ///
    /// # Errors
    ///
    /// Returns [`SoutError::Configuration`] when no known subcommand was
    /// given, and otherwise whatever the command returns.
    pub fn execute(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> SoutResult<()> {
        let (name, sub_matches) = matches
            .subcommand()
            .ok_or_else(|| SoutError::Configuration("No subcommand specified".to_string()))?;

        let cmd = self
            .get(name)
            .ok_or_else(|| SoutError::Configuration(format!("Unknown command: {name}")))?;

        cmd.handle(sub_matches, settings, out)
    }
}

/// Arguments shared by every subcommand; they override file and environment
/// settings.
fn global_arguments(app: clap::Command) -> clap::Command {
    let delimiter = |name: &'static str, help: &'static str| {
        Arg::new(name)
            .long(name)
            .value_name("CHAR")
            .value_parser(value_parser!(char))
            .global(true)
            .help(help)
    };
    app.arg(
        Arg::new("config")
            .long("config")
            .short('c')
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .global(true)
            .help("Settings file (TOML, or JSON by extension)"),
    )
    .arg(
        Arg::new("dir")
            .long("dir")
            .short('d')
            .value_name("DIR")
            .value_parser(value_parser!(PathBuf))
            .action(ArgAction::Append)
            .global(true)
            .help("Look templates up by name in this directory (repeatable)"),
    )
    .arg(delimiter("open", "Character that opens a name"))
    .arg(delimiter("separator", "Character that separates parts"))
    .arg(delimiter("close", "Character that closes a name"))
    .arg(delimiter("escape", "Character that escapes a delimiter"))
    .arg(
        Arg::new("no-promote-scalars")
            .long("no-promote-scalars")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Do not loop over single values as one-element sequences"),
    )
    .arg(
        Arg::new("debug")
            .long("debug")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Human-readable, verbose logging"),
    )
    .arg(
        Arg::new("log-level")
            .long("log-level")
            .value_name("FILTER")
            .global(true)
            .help("Tracing filter, e.g. `debug` or `sout_template=trace`"),
    )
}
