//! Template loaders.
//!
//! Template loaders find and read template text by name. The
//! [`TemplateLoader`] trait defines the interface, with implementations for
//! directories on disk, in-memory strings, and an ordered chain of both.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use sout_core::{SoutError, SoutResult};
use tracing::debug;

use crate::template::{Configuration, Template};

/// Loads template text by name.
pub trait TemplateLoader: Send + Sync {
    /// Loads the template text with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`SoutError::TemplateDoesNotExist`] if the template cannot be
    /// found.
    fn load(&self, name: &str) -> SoutResult<String>;
}

/// Loads templates from one or more directories on the filesystem.
///
/// Searches each directory in order and returns the first match. Names that
/// would escape a directory (absolute paths, `..`) are never found.
#[derive(Debug, Clone)]
pub struct FileSystemLoader {
    dirs: Vec<PathBuf>,
}

impl FileSystemLoader {
    /// Creates a new `FileSystemLoader` with the given search directories.
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Returns the search directories.
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

fn is_relative_inside(name: &Path) -> bool {
    name.components()
        .all(|component| matches!(component, Component::Normal(_) | Component::CurDir))
}

impl TemplateLoader for FileSystemLoader {
    fn load(&self, name: &str) -> SoutResult<String> {
        if !is_relative_inside(Path::new(name)) {
            return Err(SoutError::TemplateDoesNotExist(format!(
                "Template '{name}' is outside the template directories"
            )));
        }
        for dir in &self.dirs {
            let path = dir.join(name);
            if path.is_file() {
                debug!(path = %path.display(), "loading template");
                return std::fs::read_to_string(&path).map_err(|e| {
                    SoutError::TemplateDoesNotExist(format!(
                        "Error reading template '{}': {}",
                        path.display(),
                        e
                    ))
                });
            }
        }

        Err(SoutError::TemplateDoesNotExist(format!(
            "Template '{name}' not found in directories: {:?}",
            self.dirs
        )))
    }
}

/// Loads templates from an in-memory map of name to template text.
#[derive(Debug, Default)]
pub struct StringLoader {
    templates: RwLock<HashMap<String, String>>,
}

impl StringLoader {
    /// Creates a new empty `StringLoader`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a `StringLoader` from a map of template names to text.
    pub fn from_map(templates: HashMap<String, String>) -> Self {
        Self {
            templates: RwLock::new(templates),
        }
    }

    /// Adds or replaces a template.
    pub fn add(&self, name: impl Into<String>, text: impl Into<String>) {
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), text.into());
    }
}

impl TemplateLoader for StringLoader {
    fn load(&self, name: &str) -> SoutResult<String> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| {
                SoutError::TemplateDoesNotExist(format!("Template '{name}' not found in StringLoader"))
            })
    }
}

/// Tries a list of loaders in order.
#[derive(Default)]
pub struct ChainLoader {
    loaders: Vec<Box<dyn TemplateLoader>>,
}

impl ChainLoader {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a loader to the chain.
    #[must_use]
    pub fn with(mut self, loader: impl TemplateLoader + 'static) -> Self {
        self.loaders.push(Box::new(loader));
        self
    }
}

impl TemplateLoader for ChainLoader {
    fn load(&self, name: &str) -> SoutResult<String> {
        for loader in &self.loaders {
            match loader.load(name) {
                Ok(text) => return Ok(text),
                Err(SoutError::TemplateDoesNotExist(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Err(SoutError::TemplateDoesNotExist(format!(
            "Template '{name}' could not be found"
        )))
    }
}

/// Loads and parses a template by name. The template is named after
/// `name` in log events.
pub fn load_template(
    loader: &dyn TemplateLoader,
    name: &str,
    configuration: &Configuration,
) -> SoutResult<Template> {
    let text = loader.load(name)?;
    Ok(Template::parse(&text, configuration)?.with_name(name))
}
