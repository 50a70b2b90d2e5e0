//! The `check` command.
//!
//! Parses templates without rendering them and reports, for each one, either
//! its node tree size or the parse error with its position.

use std::io::Write;

use clap::{Arg, ArgAction};
use sout_core::{Settings, SoutError, SoutResult};
use sout_template::Configuration;
use tracing::{info, warn};

use crate::command::CliCommand;
use crate::input::read_template;

/// Parses templates and reports problems.
pub struct CheckCommand;

/// The outcome of checking one template.
#[derive(Debug)]
pub struct CheckReport {
    /// The template path or name as given.
    pub name: String,
    /// The parsed tree in bracket notation, or the error.
    pub outcome: Result<CheckedTemplate, SoutError>,
}

/// A template that parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedTemplate {
    /// Number of nodes in the tree, parts included.
    pub nodes: usize,
    /// The tree in `❰name❚part❱` notation.
    pub tree: String,
}

/// Parses every named template.
pub fn check_templates<'a>(
    names: impl IntoIterator<Item = &'a str>,
    settings: &Settings,
) -> Vec<CheckReport> {
    let configuration = Configuration::from_settings(settings);
    names
        .into_iter()
        .map(|name| CheckReport {
            name: name.to_string(),
            outcome: read_template(name, settings, &configuration).map(|template| {
                CheckedTemplate {
                    nodes: template.root().node_count(),
                    tree: template.to_string(),
                }
            }),
        })
        .collect()
}

impl CliCommand for CheckCommand {
    fn name(&self) -> &'static str {
        "check"
    }

    fn help(&self) -> &'static str {
        "Parse templates and report syntax errors"
    }

    fn add_arguments(&self, cmd: clap::Command) -> clap::Command {
        cmd.arg(
            Arg::new("templates")
                .required(true)
                .num_args(1..)
                .value_name("TEMPLATE")
                .help("Template paths, or names when --dir is given"),
        )
        .arg(
            Arg::new("tree")
                .long("tree")
                .action(ArgAction::SetTrue)
                .help("Print the parsed tree of each template"),
        )
    }

    fn handle(
        &self,
        matches: &clap::ArgMatches,
        settings: &Settings,
        out: &mut dyn Write,
    ) -> SoutResult<()> {
        let names = matches
            .get_many::<String>("templates")
            .into_iter()
            .flatten()
            .map(String::as_str);
        let reports = check_templates(names, settings);
        let show_tree = matches.get_flag("tree");

        let mut errors = 0;
        for report in &reports {
            match &report.outcome {
                Ok(checked) if show_tree => writeln!(out, "{}: {}", report.name, checked.tree)?,
                Ok(checked) => writeln!(out, "{}: ok ({} nodes)", report.name, checked.nodes)?,
                Err(e) => {
                    errors += 1;
                    warn!(template = %report.name, error = %e, "check failed");
                    writeln!(out, "{}: {e}", report.name)?;
                }
            }
        }

        info!(
            "Checked {} template(s), {} with errors",
            reports.len(),
            errors
        );

        if errors > 0 {
            return Err(SoutError::Configuration(format!(
                "Template check found {errors} error(s)"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_reports_each_template() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.sout"), "Hello {name}").unwrap();
        std::fs::write(dir.path().join("bad.sout"), "Hello {name").unwrap();
        let settings = Settings {
            template_dirs: vec![dir.path().to_path_buf()],
            ..Settings::default()
        };

        let reports = check_templates(["good.sout", "bad.sout", "missing.sout"], &settings);
        assert_eq!(reports.len(), 3);
        assert_eq!(
            reports[0].outcome.as_ref().unwrap(),
            &CheckedTemplate {
                nodes: 2,
                tree: "Hello ❰name❱".to_string()
            }
        );
        let err = reports[1].outcome.as_ref().unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(err.to_string(), "1:11 Name `name` was not closed before end of file.");
        assert!(matches!(
            reports[2].outcome,
            Err(SoutError::TemplateDoesNotExist(_))
        ));
    }
}
