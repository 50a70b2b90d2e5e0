//! Extension points.
//!
//! Rendering can be customised at four seams, each an ordered list of hooks
//! on the [`Configuration`](crate::template::Configuration). Within a list
//! the first hook that claims a node wins.
//!
//! | Hook                        | Runs                        | Claims by                |
//! |-----------------------------|-----------------------------|--------------------------|
//! | [`CustomNameRenderer`]      | before the name is resolved | returning `Ok(true)`     |
//! | [`CustomNameResolver`]      | per path segment            | returning `Some(value)`  |
//! | [`CustomTypeRenderer`]      | after the name is resolved  | returning `Ok(true)`     |
//! | [`CustomIteratorFactory`]   | when a value is looped over | returning `Ok(Some(..))` |

use std::fmt;
use std::io::Write;

use sout_core::{Position, SoutResult};

use crate::parser::Container;
use crate::renderer::Renderer;
use crate::scope::Scope;
use crate::value::{Value, ValueIter};

/// One part of a nesting, ready to be rendered against any model.
///
/// Hooks receive the parts of the node they handle as renderables and decide
/// themselves what to render each part against, and how often.
#[derive(Clone, Copy)]
pub struct Renderable<'a> {
    container: &'a Container,
    renderer: &'a Renderer,
}

impl<'a> Renderable<'a> {
    /// Binds a part to the renderer that will render it.
    pub const fn new(container: &'a Container, renderer: &'a Renderer) -> Self {
        Self {
            container,
            renderer,
        }
    }

    /// Renders this part against `model`, with `scope` as the current scope.
    pub fn render(&self, model: &Value, scope: &Scope<'_>, out: &mut dyn Write) -> SoutResult<()> {
        self.renderer.render_container(self.container, model, scope, out)
    }

    /// Returns the parsed part.
    pub const fn container(&self) -> &'a Container {
        self.container
    }
}

impl fmt::Debug for Renderable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Renderable")
            .field(&self.container.to_string())
            .finish()
    }
}

/// What a [`CustomNameRenderer`] gets to see.
#[derive(Debug)]
pub struct NameContext<'a> {
    /// The path exactly as written in the template.
    pub name: &'a str,
    /// The parts of the nesting; empty for a plain name.
    pub parts: &'a [Renderable<'a>],
    /// The model the node is rendered against.
    pub model: &'a Value,
    /// The current scope.
    pub scope: &'a Scope<'a>,
    /// Where the node is.
    pub position: Position,
    /// The renderer, for hooks that render template trees of their own.
    pub renderer: &'a Renderer,
}

/// Takes over a node by its name, before any resolution happens.
pub trait CustomNameRenderer: Send + Sync {
    /// Renders the node and returns `Ok(true)`, or returns `Ok(false)` to
    /// leave it to the next hook.
    fn render(&self, ctx: &NameContext<'_>, out: &mut dyn Write) -> SoutResult<bool>;
}

/// Resolves one path segment against a target value.
///
/// Runs after the null check and before the built-in lookups, so it can add
/// properties to any kind of value.
pub trait CustomNameResolver: Send + Sync {
    /// Returns the value of `name` on `target`, or `None` to decline.
    fn resolve(&self, target: &Value, name: &str) -> Option<Value>;
}

impl<F> CustomNameResolver for F
where
    F: Fn(&Value, &str) -> Option<Value> + Send + Sync,
{
    fn resolve(&self, target: &Value, name: &str) -> Option<Value> {
        self(target, name)
    }
}

/// What a [`CustomTypeRenderer`] gets to see.
#[derive(Debug)]
pub struct TypeContext<'a> {
    /// The path exactly as written in the template.
    pub name: &'a str,
    /// The parts of the nesting; empty for a plain name.
    pub parts: &'a [Renderable<'a>],
    /// The resolved value.
    pub value: &'a Value,
    /// The scope for this node. For a nesting this is a fresh child scope,
    /// shared by every iteration; for a name it is the current scope.
    pub scope: &'a Scope<'a>,
    /// The model the node itself was resolved against.
    pub parent_model: &'a Value,
    /// The scope the node itself was found in.
    pub parent_scope: &'a Scope<'a>,
    /// Where the node is.
    pub position: Position,
}

/// Takes over a node based on the value its name resolved to.
///
/// The built-in boolean, collection and pass-through handlers implement
/// this trait too; custom type renderers run before them.
pub trait CustomTypeRenderer: Send + Sync {
    /// Renders the node and returns `Ok(true)`, or returns `Ok(false)` to
    /// leave it to the next hook.
    fn render(&self, ctx: &TypeContext<'_>, out: &mut dyn Write) -> SoutResult<bool>;

    /// A name for log events.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Turns a value into a sequence to loop over.
pub trait CustomIteratorFactory: Send + Sync {
    /// Returns the elements of `value`, or `Ok(None)` to decline.
    fn to_iterator(
        &self,
        value: &Value,
        scope: &Scope<'_>,
        position: Position,
    ) -> SoutResult<Option<ValueIter>>;
}

impl<F> CustomIteratorFactory for F
where
    F: Fn(&Value, &Scope<'_>, Position) -> SoutResult<Option<ValueIter>> + Send + Sync,
{
    fn to_iterator(
        &self,
        value: &Value,
        scope: &Scope<'_>,
        position: Position,
    ) -> SoutResult<Option<ValueIter>> {
        self(value, scope, position)
    }
}
