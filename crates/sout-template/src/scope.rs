//! Render-time variable scopes.
//!
//! A [`Scope`] is a map of variables with an optional parent. One root scope
//! is created per render call, and one child per nesting occurrence. The
//! child is shared by every iteration of that nesting, which is what lets a
//! counter keep counting across a loop and start over in the next one.

use std::cell::RefCell;
use std::collections::HashMap;

use sout_core::{SoutError, SoutResult};

use crate::value::Value;

/// A map of variables that hooks can use to keep state during a render.
///
/// Scopes live on the stack of the render call and are never shared between
/// threads. Lookups search the scope itself, then its ancestors.
///
/// # Examples
///
/// ```
/// use sout_template::scope::Scope;
/// use sout_template::value::Value;
///
/// let root = Scope::new();
/// root.set("greeting", Value::from("hi"));
///
/// let child = root.child();
/// assert_eq!(child.get("greeting"), Some(Value::from("hi")));
///
/// // Defined in the child, invisible to the root.
/// child.get_or_define("count", Value::from(0));
/// assert!(root.get("count").is_none());
/// ```
#[derive(Debug, Default)]
pub struct Scope<'p> {
    parent: Option<&'p Scope<'p>>,
    variables: RefCell<HashMap<String, Value>>,
}

impl Scope<'static> {
    /// Creates a root scope with no variables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a root scope seeded with `variables`.
    pub fn with_variables<K, V>(variables: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let scope = Self::new();
        scope.variables.borrow_mut().extend(
            variables
                .into_iter()
                .map(|(name, value)| (name.into(), value.into())),
        );
        scope
    }
}

impl<'p> Scope<'p> {
    /// Creates an empty scope whose parent is `self`.
    pub fn child(&self) -> Scope<'_> {
        Scope {
            parent: Some(self),
            variables: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the parent scope, or `None` for a root scope.
    pub const fn parent(&self) -> Option<&'p Scope<'p>> {
        self.parent
    }

    /// Returns the outermost ancestor, which is the scope of the render call.
    pub fn global(&self) -> &Self {
        let mut current = self;
        while let Some(parent) = current.parent {
            current = parent;
        }
        current
    }

    /// Looks up `name` in this scope and its ancestors.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.defining_scope(name)
            .and_then(|scope| scope.variables.borrow().get(name).cloned())
    }

    /// Returns `true` if `name` is visible from this scope.
    pub fn contains(&self, name: &str) -> bool {
        self.defining_scope(name).is_some()
    }

    /// Looks up `name`; when no scope in the chain defines it, defines it in
    /// this scope with `default` and returns `default`.
    pub fn get_or_define(&self, name: &str, default: Value) -> Value {
        if let Some(value) = self.get(name) {
            return value;
        }
        self.variables
            .borrow_mut()
            .insert(name.to_string(), default.clone());
        default
    }

    /// Replaces `name` in whichever scope of the chain defines it, returning
    /// the previous value.
    ///
    /// # Errors
    ///
    /// Returns [`SoutError::UndefinedVariable`] when no scope defines `name`.
    pub fn update(&self, name: &str, value: Value) -> SoutResult<Value> {
        let scope = self
            .defining_scope(name)
            .ok_or_else(|| SoutError::UndefinedVariable(name.to_string()))?;
        let previous = scope.variables.borrow_mut().insert(name.to_string(), value);
        Ok(previous.unwrap_or(Value::Null))
    }

    /// Defines or overwrites `name` in this scope, shadowing ancestors.
    pub fn set(&self, name: impl Into<String>, value: Value) {
        self.variables.borrow_mut().insert(name.into(), value);
    }

    fn defining_scope(&self, name: &str) -> Option<&Self> {
        if self.variables.borrow().contains_key(name) {
            Some(self)
        } else {
            self.parent.and_then(|parent| parent.defining_scope(name))
        }
    }
}
