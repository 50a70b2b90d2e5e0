//! Ready-made hooks.
//!
//! None of these are active by default; add them to a
//! [`Configuration`](crate::template::Configuration) as needed.

use std::any::Any;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use sout_core::{Delimiters, Position, SoutError, SoutResult};

use crate::hooks::{CustomIteratorFactory, CustomNameRenderer, CustomTypeRenderer, NameContext, TypeContext};
use crate::parser::{self, Container};
use crate::scope::Scope;
use crate::value::{Model, Value, ValueIter};

/// Prints a running count for names that start with a prefix.
///
/// The count lives in the scope, so every nesting occurrence starts its own
/// count and every render starts from scratch. Different names count
/// independently.
///
/// # Examples
///
/// ```
/// use sout_template::extensions::CounterRenderer;
/// use sout_template::template::{Configuration, Template};
/// use sout_template::value::Value;
///
/// let configuration = Configuration::new().with_name_renderer(CounterRenderer::default());
/// let template = Template::parse("{names|{counter}. {}|, }", &configuration).unwrap();
/// let model = Value::map([("names", Value::list(["Hans", "Henk"]))]);
/// assert_eq!(template.render_to_string(&model).unwrap(), "1. Hans, 2. Henk");
/// ```
#[derive(Debug, Clone)]
pub struct CounterRenderer {
    prefix: String,
    start: i64,
}

impl CounterRenderer {
    /// Counts names starting with `prefix`, beginning at `start`.
    pub fn new(prefix: impl Into<String>, start: i64) -> Self {
        Self {
            prefix: prefix.into(),
            start,
        }
    }
}

impl Default for CounterRenderer {
    fn default() -> Self {
        Self::new("counter", 1)
    }
}

impl CustomNameRenderer for CounterRenderer {
    fn render(&self, ctx: &NameContext<'_>, out: &mut dyn Write) -> SoutResult<bool> {
        if !ctx.parts.is_empty() || !ctx.name.starts_with(&self.prefix) {
            return Ok(false);
        }
        let count = ctx
            .scope
            .get_or_define(ctx.name, Value::Integer(self.start))
            .as_integer()
            .unwrap_or(self.start);
        ctx.scope
            .update(ctx.name, Value::Integer(count.saturating_add(1)))?;
        write!(out, "{count}").map_err(|e| SoutError::sink(e, ctx.position))?;
        Ok(true)
    }
}

/// Renders other templates by name: templates inside templates.
///
/// A name that matches a registered template is replaced by that template,
/// rendered against the current model and scope. Any parts are ignored.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use sout_core::Delimiters;
/// use sout_template::extensions::TemplateRegistry;
/// use sout_template::template::{Configuration, Template};
/// use sout_template::value::Value;
///
/// let registry = Arc::new(TemplateRegistry::new());
/// registry.register("oei", "oei {name} oeiii", &Delimiters::default()).unwrap();
///
/// let configuration = Configuration::new().with_shared_name_renderer(registry);
/// let template = Template::parse("Hello {oei}", &configuration).unwrap();
/// let model = Value::map([("name", "Piet")]);
/// assert_eq!(template.render_to_string(&model).unwrap(), "Hello oei Piet oeiii");
/// ```
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: RwLock<HashMap<String, Arc<Container>>>,
}

impl TemplateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `text` and registers it under `name`, replacing any previous
    /// template of that name.
    pub fn register(
        &self,
        name: impl Into<String>,
        text: &str,
        delimiters: &Delimiters,
    ) -> SoutResult<()> {
        delimiters.validate()?;
        let root = parser::parse(text, delimiters)?;
        self.insert(name, root);
        Ok(())
    }

    /// Registers an already parsed tree under `name`.
    pub fn insert(&self, name: impl Into<String>, root: Container) {
        self.templates
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.into(), Arc::new(root));
    }

    /// Returns `true` if a template is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    fn get(&self, name: &str) -> Option<Arc<Container>> {
        self.templates
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }
}

impl CustomNameRenderer for TemplateRegistry {
    fn render(&self, ctx: &NameContext<'_>, out: &mut dyn Write) -> SoutResult<bool> {
        // The lock is released before rendering, so registered templates may
        // refer to each other.
        let Some(root) = self.get(ctx.name) else {
            return Ok(false);
        };
        ctx.renderer
            .render_container(&root, ctx.model, ctx.scope, out)?;
        Ok(true)
    }
}

/// Formats `chrono` dates and times with a `strftime` pattern.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sout_template::extensions::DateRenderer;
/// use sout_template::template::{Configuration, Template};
/// use sout_template::value::Value;
///
/// let dates = DateRenderer::new("%d-%m-%Y").unwrap();
/// let configuration = Configuration::new().with_type_renderer(dates);
/// let template = Template::parse("Date zero is {}", &configuration).unwrap();
/// let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
/// assert_eq!(template.render_to_string(&Value::from(epoch)).unwrap(), "Date zero is 01-01-1970");
/// ```
#[derive(Debug, Clone)]
pub struct DateRenderer {
    format: String,
}

impl DateRenderer {
    /// Creates a renderer for `format`.
    ///
    /// # Errors
    ///
    /// Returns [`SoutError::Configuration`] when `format` is not a valid
    /// `strftime` pattern.
    pub fn new(format: impl Into<String>) -> SoutResult<Self> {
        let format = format.into();
        if StrftimeItems::new(&format).any(|item| matches!(item, Item::Error)) {
            return Err(SoutError::Configuration(format!(
                "Invalid date format '{format}'"
            )));
        }
        Ok(Self { format })
    }

    fn write_formatted(&self, value: &Value, out: &mut dyn Write, position: Position) -> SoutResult<bool> {
        let written = if let Some(date) = value.downcast_ref::<NaiveDate>() {
            write!(out, "{}", date.format(&self.format))
        } else if let Some(stamp) = value.downcast_ref::<NaiveDateTime>() {
            write!(out, "{}", stamp.format(&self.format))
        } else if let Some(stamp) = value.downcast_ref::<DateTime<Utc>>() {
            write!(out, "{}", stamp.format(&self.format))
        } else {
            return Ok(false);
        };
        written.map_err(|e| SoutError::sink(e, position))?;
        Ok(true)
    }
}

impl CustomTypeRenderer for DateRenderer {
    fn render(&self, ctx: &TypeContext<'_>, out: &mut dyn Write) -> SoutResult<bool> {
        if !ctx.parts.is_empty() {
            return Ok(false);
        }
        self.write_formatted(ctx.value, out, ctx.position)
    }

    fn name(&self) -> &'static str {
        "date"
    }
}

/// Renders a name that resolves to null as nothing, instead of failing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAsEmpty;

impl CustomTypeRenderer for NullAsEmpty {
    fn render(&self, ctx: &TypeContext<'_>, _out: &mut dyn Write) -> SoutResult<bool> {
        Ok(ctx.parts.is_empty() && ctx.value.is_null())
    }

    fn name(&self) -> &'static str {
        "null-as-empty"
    }
}

/// Loops over null as if it were an empty sequence, instead of failing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAsEmptySequence;

impl CustomIteratorFactory for NullAsEmptySequence {
    fn to_iterator(
        &self,
        value: &Value,
        _scope: &Scope<'_>,
        _position: Position,
    ) -> SoutResult<Option<ValueIter>> {
        Ok(value.is_null().then(ValueIter::empty))
    }
}

// -- chrono values as models --

impl Model for NaiveDate {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "year" => Some(Value::from(self.year())),
            "month" => Some(Value::from(self.month())),
            "day" => Some(Value::from(self.day())),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Model for NaiveDateTime {
    fn field(&self, name: &str) -> Option<Value> {
        match name {
            "year" => Some(Value::from(self.year())),
            "month" => Some(Value::from(self.month())),
            "day" => Some(Value::from(self.day())),
            "hour" => Some(Value::from(self.hour())),
            "minute" => Some(Value::from(self.minute())),
            "second" => Some(Value::from(self.second())),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Model for DateTime<Utc> {
    fn field(&self, name: &str) -> Option<Value> {
        self.naive_utc().field(name)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<NaiveDate> for Value {
    fn from(date: NaiveDate) -> Self {
        Self::object(date)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(stamp: NaiveDateTime) -> Self {
        Self::object(stamp)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(stamp: DateTime<Utc>) -> Self {
        Self::object(stamp)
    }
}
