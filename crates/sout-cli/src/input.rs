//! Turning command line arguments into settings, templates and models.

use std::io::Read;
use std::path::{Path, PathBuf};

use sout_core::{settings_loader, Settings, SoutError, SoutResult};
use sout_template::{load_template, Configuration, FileSystemLoader, Template, Value};
use tracing::debug;

/// Resolves settings: the `--config` file (or defaults), then `SOUT_*`
/// environment overrides, then command line flags.
///
/// # Errors
///
/// Returns an error if the settings file cannot be read or the resulting
/// delimiters are not distinct.
pub fn load_settings(matches: &clap::ArgMatches) -> SoutResult<Settings> {
    let mut settings = match matches.get_one::<PathBuf>("config") {
        Some(path) => settings_loader::from_file_with_env(path)?,
        None => settings_loader::from_env()?,
    };

    if matches.get_flag("debug") {
        settings.debug = true;
    }
    if let Some(level) = matches.get_one::<String>("log-level") {
        settings.log_level.clone_from(level);
    }
    let delimiters = &mut settings.delimiters;
    for (flag, slot) in [
        ("open", &mut delimiters.open),
        ("separator", &mut delimiters.separator),
        ("close", &mut delimiters.close),
        ("escape", &mut delimiters.escape),
    ] {
        if let Some(c) = matches.get_one::<char>(flag) {
            *slot = *c;
        }
    }
    if matches.get_flag("no-promote-scalars") {
        settings.promote_scalars = false;
    }
    if let Some(dirs) = matches.get_many::<PathBuf>("dir") {
        settings.template_dirs.extend(dirs.cloned());
    }

    settings.delimiters.validate()?;
    Ok(settings)
}

/// Loads and parses a template.
///
/// With template directories configured, `name` is looked up in them;
/// otherwise it is a path to read.
///
/// # Errors
///
/// Returns [`SoutError::TemplateDoesNotExist`] when the template cannot be
/// read and [`SoutError::Parse`] when it is malformed.
pub fn read_template(
    name: &str,
    settings: &Settings,
    configuration: &Configuration,
) -> SoutResult<Template> {
    if !settings.template_dirs.is_empty() {
        let loader = FileSystemLoader::new(settings.template_dirs.clone());
        return load_template(&loader, name, configuration);
    }
    debug!(path = name, "reading template file");
    let text = std::fs::read_to_string(name).map_err(|e| {
        SoutError::TemplateDoesNotExist(format!("Error reading template '{name}': {e}"))
    })?;
    Ok(Template::parse(&text, configuration)?.with_name(name))
}

/// Reads a JSON model from a file, or from stdin when `path` is `-`.
/// Without a path the model is null.
///
/// # Errors
///
/// Returns an error if the input cannot be read or is not valid JSON.
pub fn read_model(path: Option<&Path>) -> SoutResult<Value> {
    let Some(path) = path else {
        return Ok(Value::Null);
    };
    let text = if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        text
    } else {
        std::fs::read_to_string(path)?
    };
    parse_model(&text)
}

/// Parses JSON text into a model value.
///
/// # Errors
///
/// Returns [`SoutError::Serialization`] if the text is not valid JSON.
pub fn parse_model(text: &str) -> SoutResult<Value> {
    let json: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| SoutError::Serialization(format!("Invalid JSON model: {e}")))?;
    Ok(Value::from(json))
}

/// Splits a `key=value` variable definition.
///
/// # Errors
///
/// Returns [`SoutError::Configuration`] when there is no `=`.
pub fn parse_variable(definition: &str) -> SoutResult<(String, Value)> {
    let (key, value) = definition.split_once('=').ok_or_else(|| {
        SoutError::Configuration(format!("Variable '{definition}' is not of the form KEY=VALUE"))
    })?;
    Ok((key.to_string(), Value::from(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(args: &[&str]) -> clap::ArgMatches {
        let mut registry = crate::command::CommandRegistry::new();
        crate::commands::register_builtin_commands(&mut registry);
        let matches = registry
            .build_cli()
            .try_get_matches_from(args.iter().copied())
            .unwrap();
        matches.subcommand().unwrap().1.clone()
    }

    #[test]
    fn test_flags_override_defaults() {
        let settings = load_settings(&matches(&[
            "sout", "check", "t", "--open", "<", "--close", ">", "--no-promote-scalars",
        ]))
        .unwrap();
        assert_eq!(settings.delimiters.open, '<');
        assert_eq!(settings.delimiters.close, '>');
        assert_eq!(settings.delimiters.separator, '|');
        assert!(!settings.promote_scalars);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sout.toml");
        std::fs::write(&path, "log_level = \"warn\"\n[delimiters]\nopen = \"[\"\nclose = \"]\"\n").unwrap();
        let config = path.to_str().unwrap();
        let settings = load_settings(&matches(&["sout", "check", "t", "--config", config, "--close", ")"])).unwrap();
        assert_eq!(settings.log_level, "warn");
        assert_eq!(settings.delimiters.open, '[');
        assert_eq!(settings.delimiters.close, ')');
    }

    #[test]
    fn test_clashing_delimiters_are_rejected() {
        let result = load_settings(&matches(&["sout", "check", "t", "--open", "|"]));
        assert!(matches!(result, Err(SoutError::Configuration(_))));
    }

    #[test]
    fn test_read_template_from_path_and_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("t.sout"), "Hi {name}").unwrap();
        let configuration = Configuration::default();

        let path = dir.path().join("t.sout");
        let by_path = read_template(path.to_str().unwrap(), &Settings::default(), &configuration).unwrap();
        assert_eq!(by_path.to_string(), "Hi ❰name❱");

        let settings = Settings {
            template_dirs: vec![dir.path().to_path_buf()],
            ..Settings::default()
        };
        let by_name = read_template("t.sout", &settings, &configuration).unwrap();
        assert_eq!(by_name.name(), Some("t.sout"));
    }

    #[test]
    fn test_read_missing_template() {
        let result = read_template("/nonexistent/t.sout", &Settings::default(), &Configuration::default());
        assert!(matches!(result, Err(SoutError::TemplateDoesNotExist(_))));
    }

    #[test]
    fn test_parse_model() {
        let model = parse_model(r#"{"name": "Piet", "friends": ["Hans"]}"#).unwrap();
        assert_eq!(model.to_string(), "{friends: [Hans], name: Piet}");
        assert!(matches!(parse_model("{"), Err(SoutError::Serialization(_))));
        assert_eq!(read_model(None).unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_variable() {
        let (key, value) = parse_variable("greeting=hi=there").unwrap();
        assert_eq!(key, "greeting");
        assert_eq!(value, Value::from("hi=there"));
        assert!(parse_variable("novalue").is_err());
    }
}
