//! The rendering engine.
//!
//! A [`Renderer`] walks a parsed [`Container`] and writes output to a sink.
//! Text is copied. A name or nesting goes through a fixed dispatch chain:
//!
//! 1. custom name renderers, by name, before resolution;
//! 2. name resolution against the current model;
//! 3. custom type renderers, by value;
//! 4. for a name, the value's text, or an error for null;
//! 5. for a nesting, the built-in boolean, collection and pass-through
//!    handlers;
//! 6. otherwise an error.
//!
//! Errors raised while handling a node carry the node's position, unless a
//! node deeper down already attached its own.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use sout_core::{Position, SoutError, SoutResult};
use tracing::trace;

use crate::handlers::{BooleanRenderer, CollectionRenderer, PassThroughRenderer};
use crate::hooks::{
    CustomNameRenderer, CustomTypeRenderer, NameContext, Renderable, TypeContext,
};
use crate::iterator::IteratorFactory;
use crate::parser::{Container, Node};
use crate::resolver::NameResolver;
use crate::scope::Scope;
use crate::template::Configuration;
use crate::value::Value;

/// Renders parsed templates using the hooks of one [`Configuration`].
pub struct Renderer {
    name_renderers: Vec<Arc<dyn CustomNameRenderer>>,
    type_renderers: Vec<Arc<dyn CustomTypeRenderer>>,
    builtins: Vec<Arc<dyn CustomTypeRenderer>>,
    resolver: NameResolver,
}

impl Renderer {
    /// Builds a renderer from the hooks in `configuration`.
    pub fn new(configuration: &Configuration) -> Self {
        let iterators = IteratorFactory::new(
            configuration.iterator_factories.clone(),
            configuration.promote_scalars,
        );
        Self {
            name_renderers: configuration.name_renderers.clone(),
            type_renderers: configuration.type_renderers.clone(),
            builtins: vec![
                Arc::new(BooleanRenderer),
                Arc::new(CollectionRenderer::new(iterators)),
                Arc::new(PassThroughRenderer),
            ],
            resolver: NameResolver::new(configuration.name_resolvers.clone()),
        }
    }

    /// Renders every node of `container` in order.
    pub fn render_container(
        &self,
        container: &Container,
        model: &Value,
        scope: &Scope<'_>,
        out: &mut dyn Write,
    ) -> SoutResult<()> {
        for node in &container.children {
            self.render_node(node, model, scope, out)?;
        }
        Ok(())
    }

    /// Renders a single node.
    pub fn render_node(
        &self,
        node: &Node,
        model: &Value,
        scope: &Scope<'_>,
        out: &mut dyn Write,
    ) -> SoutResult<()> {
        match node {
            Node::Text { text, position } => out
                .write_all(text.as_bytes())
                .map_err(|e| SoutError::sink(e, *position)),
            Node::Name { path, position } => self
                .render_name(path, *position, model, scope, out)
                .map_err(|e| e.with_position(*position)),
            Node::Nesting {
                path,
                parts,
                position,
            } => self
                .render_nesting(path, parts, *position, model, scope, out)
                .map_err(|e| e.with_position(*position)),
        }
    }

    /// Resolves `path` against `model`, turning a failure into a render
    /// error at `position`.
    pub fn resolve(&self, model: &Value, path: &str, position: Position) -> SoutResult<Value> {
        self.resolver
            .resolve(model, path)
            .map_err(|failure| SoutError::render_at(failure.message, position))
    }

    fn render_name(
        &self,
        path: &str,
        position: Position,
        model: &Value,
        scope: &Scope<'_>,
        out: &mut dyn Write,
    ) -> SoutResult<()> {
        let named = NameContext {
            name: path,
            parts: &[],
            model,
            scope,
            position,
            renderer: self,
        };
        if self.claim_by_name(&named, out)? {
            return Ok(());
        }

        let value = self.resolve(model, path, position)?;
        let typed = TypeContext {
            name: path,
            parts: &[],
            value: &value,
            scope,
            parent_model: model,
            parent_scope: scope,
            position,
        };
        for hook in &self.type_renderers {
            if hook.render(&typed, out)? {
                trace!(name = path, hook = hook.name(), "name claimed by type renderer");
                return Ok(());
            }
        }

        if value.is_null() {
            let message = if path.trim().is_empty() {
                "null value".to_string()
            } else {
                format!("null value for `{path}`")
            };
            return Err(SoutError::render_at(message, position));
        }
        write!(out, "{value}").map_err(|e| SoutError::sink(e, position))
    }

    fn render_nesting(
        &self,
        path: &str,
        parts: &[Container],
        position: Position,
        model: &Value,
        scope: &Scope<'_>,
        out: &mut dyn Write,
    ) -> SoutResult<()> {
        let parts: Vec<Renderable<'_>> = parts
            .iter()
            .map(|part| Renderable::new(part, self))
            .collect();
        let named = NameContext {
            name: path,
            parts: &parts,
            model,
            scope,
            position,
            renderer: self,
        };
        if self.claim_by_name(&named, out)? {
            return Ok(());
        }

        let value = self.resolve(model, path, position)?;
        let nested = scope.child();
        let typed = TypeContext {
            name: path,
            parts: &parts,
            value: &value,
            scope: &nested,
            parent_model: model,
            parent_scope: scope,
            position,
        };
        for hook in self.type_renderers.iter().chain(&self.builtins) {
            if hook.render(&typed, out)? {
                trace!(
                    name = path,
                    kind = value.kind(),
                    hook = hook.name(),
                    "nesting rendered"
                );
                return Ok(());
            }
        }
        Err(SoutError::render_at(
            format!("don't know how to render `{path}`"),
            position,
        ))
    }

    fn claim_by_name(&self, ctx: &NameContext<'_>, out: &mut dyn Write) -> SoutResult<bool> {
        for hook in &self.name_renderers {
            if hook.render(ctx, out)? {
                trace!(name = ctx.name, "claimed by name renderer");
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Debug for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Renderer")
            .field("name_renderers", &self.name_renderers.len())
            .field("type_renderers", &self.type_renderers.len())
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}
