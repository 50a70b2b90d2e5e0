//! Templates and their configuration.
//!
//! A [`Configuration`] holds the delimiters and the ordered hook lists. A
//! [`Template`] is parsed once against a configuration and can then be
//! rendered any number of times, from any number of threads.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use sout_core::logging::render_span;
use sout_core::{Delimiters, Settings, SoutError, SoutResult};
use tracing::debug;

use crate::hooks::{CustomIteratorFactory, CustomNameRenderer, CustomNameResolver, CustomTypeRenderer};
use crate::parser::{self, Container};
use crate::renderer::Renderer;
use crate::scope::Scope;
use crate::value::Value;

/// Delimiters plus the hooks that customise rendering.
///
/// Hooks of one kind are consulted in the order they were added.
///
/// # Examples
///
/// ```
/// use sout_core::Delimiters;
/// use sout_template::template::{Configuration, Template};
/// use sout_template::value::Value;
///
/// let configuration = Configuration::new()
///     .with_delimiters(Delimiters::new('<', '|', '>', '\\'));
/// let template = Template::parse("Hi <name>!", &configuration).unwrap();
/// let model = Value::map([("name", "Ada")]);
/// assert_eq!(template.render_to_string(&model).unwrap(), "Hi Ada!");
/// ```
#[derive(Clone)]
pub struct Configuration {
    pub(crate) delimiters: Delimiters,
    pub(crate) promote_scalars: bool,
    pub(crate) name_renderers: Vec<Arc<dyn CustomNameRenderer>>,
    pub(crate) type_renderers: Vec<Arc<dyn CustomTypeRenderer>>,
    pub(crate) name_resolvers: Vec<Arc<dyn CustomNameResolver>>,
    pub(crate) iterator_factories: Vec<Arc<dyn CustomIteratorFactory>>,
}

impl Configuration {
    /// Creates a configuration with the default delimiters and no hooks.
    pub fn new() -> Self {
        Self {
            delimiters: Delimiters::default(),
            promote_scalars: true,
            name_renderers: Vec::new(),
            type_renderers: Vec::new(),
            name_resolvers: Vec::new(),
            iterator_factories: Vec::new(),
        }
    }

    /// Creates a configuration from loaded settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new()
            .with_delimiters(settings.delimiters)
            .promote_scalars(settings.promote_scalars)
    }

    /// Replaces the delimiters.
    #[must_use]
    pub fn with_delimiters(mut self, delimiters: Delimiters) -> Self {
        self.delimiters = delimiters;
        self
    }

    /// Sets whether a single value may be looped over as a one-element
    /// sequence. When off, a nesting over such a value falls through to the
    /// pass-through handler.
    #[must_use]
    pub fn promote_scalars(mut self, promote: bool) -> Self {
        self.promote_scalars = promote;
        self
    }

    /// Appends a name renderer.
    #[must_use]
    pub fn with_name_renderer(self, hook: impl CustomNameRenderer + 'static) -> Self {
        self.with_shared_name_renderer(Arc::new(hook))
    }

    /// Appends a name renderer that is also used elsewhere.
    #[must_use]
    pub fn with_shared_name_renderer(mut self, hook: Arc<dyn CustomNameRenderer>) -> Self {
        self.name_renderers.push(hook);
        self
    }

    /// Appends a type renderer.
    #[must_use]
    pub fn with_type_renderer(self, hook: impl CustomTypeRenderer + 'static) -> Self {
        self.with_shared_type_renderer(Arc::new(hook))
    }

    /// Appends a type renderer that is also used elsewhere.
    #[must_use]
    pub fn with_shared_type_renderer(mut self, hook: Arc<dyn CustomTypeRenderer>) -> Self {
        self.type_renderers.push(hook);
        self
    }

    /// Appends a name resolver.
    #[must_use]
    pub fn with_name_resolver(mut self, hook: impl CustomNameResolver + 'static) -> Self {
        self.name_resolvers.push(Arc::new(hook));
        self
    }

    /// Appends an iterator factory.
    #[must_use]
    pub fn with_iterator_factory(mut self, hook: impl CustomIteratorFactory + 'static) -> Self {
        self.iterator_factories.push(Arc::new(hook));
        self
    }

    /// Returns the delimiters.
    pub const fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("delimiters", &self.delimiters)
            .field("promote_scalars", &self.promote_scalars)
            .field("name_renderers", &self.name_renderers.len())
            .field("type_renderers", &self.type_renderers.len())
            .field("name_resolvers", &self.name_resolvers.len())
            .field("iterator_factories", &self.iterator_factories.len())
            .finish()
    }
}

/// A parsed template, ready to render.
///
/// # Examples
///
/// ```
/// use sout_template::template::{Configuration, Template};
/// use sout_template::value::Value;
///
/// let template = Template::parse(
///     "{names|Dear |{}| and |,}",
///     &Configuration::default(),
/// ).unwrap();
/// let model = Value::map([("names", Value::list(["Hans", "Henk"]))]);
/// assert_eq!(template.render_to_string(&model).unwrap(), "Dear Hans and Henk,");
/// ```
#[derive(Debug)]
pub struct Template {
    name: Option<String>,
    root: Container,
    renderer: Renderer,
}

impl Template {
    /// Parses `text` with the delimiters and hooks of `configuration`.
    ///
    /// # Errors
    ///
    /// Returns [`SoutError::Configuration`] for clashing delimiters and
    /// [`SoutError::Parse`] for malformed text.
    pub fn parse(text: &str, configuration: &Configuration) -> SoutResult<Self> {
        configuration.delimiters.validate()?;
        let root = parser::parse(text, &configuration.delimiters)?;
        debug!(nodes = root.node_count(), "parsed template");
        Ok(Self::from_container(root, configuration))
    }

    /// Wraps an already parsed tree.
    pub fn from_container(root: Container, configuration: &Configuration) -> Self {
        Self {
            name: None,
            root,
            renderer: Renderer::new(configuration),
        }
    }

    /// Names the template, for log events.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the name given with [`with_name`](Self::with_name).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the parsed tree.
    pub const fn root(&self) -> &Container {
        &self.root
    }

    /// Renders against `model` into `out`, starting from an empty scope.
    pub fn render(&self, model: &Value, out: &mut dyn Write) -> SoutResult<()> {
        self.render_in_scope(model, &Scope::new(), out)
    }

    /// Renders against `model` into `out`, with `variables` defined in the
    /// root scope.
    pub fn render_with_variables<K, V>(
        &self,
        model: &Value,
        variables: impl IntoIterator<Item = (K, V)>,
        out: &mut dyn Write,
    ) -> SoutResult<()>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.render_in_scope(model, &Scope::with_variables(variables), out)
    }

    /// Renders against `model` into `out`, using `scope` as the root scope.
    pub fn render_in_scope(
        &self,
        model: &Value,
        scope: &Scope<'_>,
        out: &mut dyn Write,
    ) -> SoutResult<()> {
        let span = render_span(self.name().unwrap_or("<inline>"));
        let _guard = span.enter();
        let result = self.renderer.render_container(&self.root, model, scope, out);
        if let Err(e) = &result {
            debug!(error = %e, "render failed");
        }
        result
    }

    /// Renders against `model` and returns the output.
    pub fn render_to_string(&self, model: &Value) -> SoutResult<String> {
        let mut out = Vec::new();
        self.render(model, &mut out)?;
        String::from_utf8(out)
            .map_err(|e| SoutError::render(format!("rendered output is not UTF-8: {e}")))
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_template_is_send_and_sync() {
        assert_send_sync::<Template>();
        assert_send_sync::<Configuration>();
    }

    #[test]
    fn test_parse_rejects_clashing_delimiters() {
        let configuration = Configuration::new().with_delimiters(Delimiters::new('{', '{', '}', '\\'));
        let err = Template::parse("x", &configuration).unwrap_err();
        assert!(matches!(err, SoutError::Configuration(_)));
    }

    #[test]
    fn test_render_twice() {
        let template = Template::parse("{a}-{a}", &Configuration::default()).unwrap();
        let model = Value::map([("a", 1)]);
        assert_eq!(template.render_to_string(&model).unwrap(), "1-1");
        assert_eq!(template.render_to_string(&model).unwrap(), "1-1");
    }

    #[test]
    fn test_render_with_variables_seeds_root_scope() {
        struct Greeting;
        impl CustomNameRenderer for Greeting {
            fn render(&self, ctx: &crate::hooks::NameContext<'_>, out: &mut dyn Write) -> SoutResult<bool> {
                if ctx.name != "greeting" {
                    return Ok(false);
                }
                let value = ctx.scope.get("greeting").unwrap_or(Value::Null);
                write!(out, "{value}").map_err(|e| SoutError::sink(e, ctx.position))?;
                Ok(true)
            }
        }
        let configuration = Configuration::new().with_name_renderer(Greeting);
        let template = Template::parse("{greeting}, {name}", &configuration).unwrap();
        let mut out = Vec::new();
        template
            .render_with_variables(&Value::map([("name", "Ada")]), [("greeting", "Hello")], &mut out)
            .unwrap();
        assert_eq!(out, b"Hello, Ada");
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings {
            delimiters: Delimiters::new('[', ':', ']', '!'),
            ..Settings::default()
        };
        let configuration = Configuration::from_settings(&settings);
        let template = Template::parse("[xs:[]:, ]", &configuration).unwrap();
        let model = Value::map([("xs", Value::list([1, 2]))]);
        assert_eq!(template.render_to_string(&model).unwrap(), "1, 2");
    }

    #[test]
    fn test_display_and_name() {
        let template = Template::parse("a{b|c}", &Configuration::default())
            .unwrap()
            .with_name("t");
        assert_eq!(template.to_string(), "a❰b❚c❱");
        assert_eq!(template.name(), Some("t"));
        assert_eq!(template.root().children.len(), 2);
    }
}
