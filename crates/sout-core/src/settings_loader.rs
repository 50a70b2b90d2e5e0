//! Settings loading from configuration files.
//!
//! This module provides functions to load [`Settings`] from TOML files, JSON
//! files, and to apply environment variable overrides.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `SOUT_DEBUG` | `debug` |
//! | `SOUT_LOG_LEVEL` | `log_level` |
//! | `SOUT_OPEN` | `delimiters.open` |
//! | `SOUT_SEPARATOR` | `delimiters.separator` |
//! | `SOUT_CLOSE` | `delimiters.close` |
//! | `SOUT_ESCAPE` | `delimiters.escape` |
//! | `SOUT_PROMOTE_SCALARS` | `promote_scalars` |
//! | `SOUT_TEMPLATE_DIRS` | `template_dirs` (colon-separated) |
//!
//! ## Examples
//!
//! ```
//! use sout_core::settings_loader;
//!
//! let settings = settings_loader::from_toml_str(r#"
//!     [delimiters]
//!     open = "<"
//!     close = ">"
//! "#).unwrap();
//! assert_eq!(settings.delimiters.open, '<');
//! assert_eq!(settings.delimiters.separator, '|');
//! ```

use std::path::{Path, PathBuf};

use crate::error::SoutError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// Any fields not present in the TOML keep their default values, including
/// single fields of nested tables such as `[delimiters]`.
///
/// # Errors
///
/// Returns an error if the TOML is malformed, cannot be deserialized, or
/// describes invalid delimiters.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, SoutError> {
    // Convert to JSON and merge over the serialized defaults, so partial
    // tables keep the defaults of the keys they leave out.
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| SoutError::Configuration(format!("Failed to parse TOML: {e}")))?;
    merge_over_defaults(toml_to_json(toml_value), "TOML")
}

/// Loads settings from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, SoutError> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the TOML is malformed.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, SoutError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Loads settings from a JSON string.
///
/// # Errors
///
/// Returns an error if the JSON is malformed or cannot be deserialized.
pub fn from_json_str(json_str: &str) -> Result<Settings, SoutError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| SoutError::Configuration(format!("Failed to parse JSON: {e}")))?;
    merge_over_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, SoutError> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from a JSON file and then applies environment variable overrides.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the JSON is malformed.
pub fn from_json_file_with_env(path: impl AsRef<Path>) -> Result<Settings, SoutError> {
    let mut settings = from_json_file(path)?;
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Loads settings from a file, picking the format from its extension.
///
/// Files ending in `.json` are read as JSON, everything else as TOML.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn from_file_with_env(path: impl AsRef<Path>) -> Result<Settings, SoutError> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        from_json_file_with_env(path)
    } else {
        from_toml_file_with_env(path)
    }
}

/// Loads settings from just environment variables (starting from defaults).
///
/// # Errors
///
/// Returns an error if an override holds an invalid delimiter.
pub fn from_env() -> Result<Settings, SoutError> {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings)?;
    Ok(settings)
}

/// Applies environment variable overrides to a settings struct.
///
/// Supported environment variables:
///
/// - `SOUT_DEBUG` -> `debug` (values: "true"/"1"/"yes" => true, anything else => false)
/// - `SOUT_LOG_LEVEL` -> `log_level`
/// - `SOUT_OPEN`, `SOUT_SEPARATOR`, `SOUT_CLOSE`, `SOUT_ESCAPE` -> `delimiters`
///   (each must be exactly one character)
/// - `SOUT_PROMOTE_SCALARS` -> `promote_scalars`
/// - `SOUT_TEMPLATE_DIRS` -> `template_dirs` (colon-separated)
///
/// # Errors
///
/// Returns an error if a delimiter override is not exactly one character,
/// or if the resulting delimiters are not distinct.
pub fn apply_env_overrides(settings: &mut Settings) -> Result<(), SoutError> {
    if let Ok(val) = std::env::var("SOUT_DEBUG") {
        settings.debug = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("SOUT_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("SOUT_OPEN") {
        settings.delimiters.open = single_char("SOUT_OPEN", &val)?;
    }

    if let Ok(val) = std::env::var("SOUT_SEPARATOR") {
        settings.delimiters.separator = single_char("SOUT_SEPARATOR", &val)?;
    }

    if let Ok(val) = std::env::var("SOUT_CLOSE") {
        settings.delimiters.close = single_char("SOUT_CLOSE", &val)?;
    }

    if let Ok(val) = std::env::var("SOUT_ESCAPE") {
        settings.delimiters.escape = single_char("SOUT_ESCAPE", &val)?;
    }

    if let Ok(val) = std::env::var("SOUT_PROMOTE_SCALARS") {
        settings.promote_scalars = parse_flag(&val);
    }

    if let Ok(val) = std::env::var("SOUT_TEMPLATE_DIRS") {
        settings.template_dirs = val
            .split(':')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
    }

    settings.delimiters.validate()
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, SoutError> {
    std::fs::read_to_string(path).map_err(|e| {
        SoutError::Configuration(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_over_defaults(value: serde_json::Value, format: &str) -> Result<Settings, SoutError> {
    let default_json = serde_json::to_value(Settings::default()).map_err(|e| {
        SoutError::Configuration(format!("Failed to serialize default settings: {e}"))
    })?;

    let merged = merge_json(default_json, value);
    let settings: Settings = serde_json::from_value(merged).map_err(|e| {
        SoutError::Configuration(format!("Failed to deserialize settings from {format}: {e}"))
    })?;
    settings.delimiters.validate()?;
    Ok(settings)
}

fn parse_flag(val: &str) -> bool {
    matches!(val.to_lowercase().as_str(), "true" | "1" | "yes")
}

fn single_char(var: &str, val: &str) -> Result<char, SoutError> {
    let mut chars = val.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(SoutError::Configuration(format!(
            "{var} must be exactly one character, got '{val}'"
        ))),
    }
}

/// Converts a TOML value to a `serde_json::Value`.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    match value {
        toml::Value::String(s) => serde_json::Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => serde_json::Value::Bool(b),
        toml::Value::Datetime(dt) => serde_json::Value::String(dt.to_string()),
        toml::Value::Array(arr) => {
            serde_json::Value::Array(arr.into_iter().map(toml_to_json).collect())
        }
        toml::Value::Table(table) => {
            let map: serde_json::Map<String, serde_json::Value> = table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect();
            serde_json::Value::Object(map)
        }
    }
}

/// Deep-merges two JSON values. The `override_val` takes precedence.
fn merge_json(base: serde_json::Value, override_val: serde_json::Value) -> serde_json::Value {
    match (base, override_val) {
        (serde_json::Value::Object(mut base_map), serde_json::Value::Object(override_map)) => {
            for (key, override_v) in override_map {
                let merged = if let Some(base_v) = base_map.remove(&key) {
                    merge_json(base_v, override_v)
                } else {
                    override_v
                };
                base_map.insert(key, merged);
            }
            serde_json::Value::Object(base_map)
        }
        (_, override_val) => override_val,
    }
}
