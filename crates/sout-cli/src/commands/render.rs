//! The `render` command.
//!
//! Loads a template, reads a JSON model and writes the rendered text to
//! stdout or a file. Nothing is written when rendering fails.

use std::io::Write;
use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction};
use sout_core::{Settings, SoutError, SoutResult};
use sout_template::extensions::{NullAsEmpty, NullAsEmptySequence};
use sout_template::Configuration;
use tracing::info;

use crate::command::CliCommand;
use crate::input::{parse_variable, read_model, read_template};

/// Renders a template against a JSON model.
pub struct RenderCommand;

/// Builds the engine configuration for a render.
pub fn configuration(settings: &Settings, null_as_empty: bool) -> Configuration {
    let configuration = Configuration::from_settings(settings);
    if null_as_empty {
        configuration
            .with_type_renderer(NullAsEmpty)
            .with_iterator_factory(NullAsEmptySequence)
    } else {
        configuration
    }
}

impl CliCommand for RenderCommand {
    fn name(&self) -> &'static str {
        "render"
    }

    fn help(&self) -> &'static str {
        "Render a template against a JSON model"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            Arg::new("template")
                .required(true)
                .value_name("TEMPLATE")
                .help("Template path, or name when --dir is given"),
        )
        .arg(
            Arg::new("model")
                .long("model")
                .short('m')
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("JSON model file, `-` for stdin; the model is null without one"),
        )
        .arg(
            Arg::new("var")
                .long("var")
                .value_name("KEY=VALUE")
                .action(ArgAction::Append)
                .help("Define a variable in the root scope (repeatable)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Write to this file instead of stdout"),
        )
        .arg(
            Arg::new("null-as-empty")
                .long("null-as-empty")
                .action(ArgAction::SetTrue)
                .help("Render null as nothing and loop over null as an empty sequence"),
        )
    }

    fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> SoutResult<()> {
        let name = matches
            .get_one::<String>("template")
            .ok_or_else(|| SoutError::Configuration("No template given".to_string()))?;
        let configuration = configuration(settings, matches.get_flag("null-as-empty"));
        let template = read_template(name, settings, &configuration)?;
        let model = read_model(matches.get_one::<PathBuf>("model").map(PathBuf::as_path))?;
        let variables = matches
            .get_many::<String>("var")
            .into_iter()
            .flatten()
            .map(|definition| parse_variable(definition))
            .collect::<SoutResult<Vec<_>>>()?;

        let mut rendered = Vec::new();
        template.render_with_variables(&model, variables, &mut rendered)?;

        match matches.get_one::<PathBuf>("output") {
            Some(path) => {
                std::fs::write(path, &rendered)?;
                info!(template = %name, output = %path.display(), bytes = rendered.len(), "rendered");
            }
            None => out.write_all(&rendered)?,
        }
        Ok(())
    }
}
