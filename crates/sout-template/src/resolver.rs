//! Name resolution.
//!
//! A path like `a.b.c` is resolved one segment at a time, each against the
//! value produced by the previous one. A blank path (or segment) resolves to
//! the target itself, so `{}` renders the current model.

use std::fmt;
use std::sync::Arc;

use crate::hooks::CustomNameResolver;
use crate::value::{Model, Value};

/// Why a name could not be resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    /// A description naming the segment that failed.
    pub message: String,
}

impl ResolutionFailure {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ResolutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ResolutionFailure {}

/// Resolves dotted paths against values.
///
/// For each segment, in order:
///
/// 1. a blank segment yields the target itself;
/// 2. a null target fails;
/// 3. custom resolvers are asked, in registration order;
/// 4. a map yields its entry for the segment;
/// 5. a function is called with the segment;
/// 6. a model is probed for a field, then a `getX` accessor, then an `isX`
///    accessor, then a method called `x`, each walking from the most
///    derived level upward.
///
/// # Examples
///
/// ```
/// use sout_template::resolver::NameResolver;
/// use sout_template::value::Value;
///
/// let resolver = NameResolver::default();
/// let model = Value::map([("person", Value::map([("name", "Ada")]))]);
/// assert_eq!(resolver.resolve(&model, "person.name"), Ok(Value::from("Ada")));
/// assert!(resolver.resolve(&model, "person.age").is_err());
/// ```
#[derive(Clone, Default)]
pub struct NameResolver {
    custom: Vec<Arc<dyn CustomNameResolver>>,
}

impl NameResolver {
    /// Creates a resolver that consults `custom` before the built-in lookups.
    pub fn new(custom: Vec<Arc<dyn CustomNameResolver>>) -> Self {
        Self { custom }
    }

    /// Resolves a possibly dotted `path` against `target`.
    pub fn resolve(&self, target: &Value, path: &str) -> Result<Value, ResolutionFailure> {
        let mut segments = path.split('.');
        let first = segments.next().unwrap_or_default();
        let mut current = self.resolve_segment(target, first)?;
        for segment in segments {
            current = self.resolve_segment(&current, segment)?;
        }
        Ok(current)
    }

    fn resolve_segment(&self, target: &Value, name: &str) -> Result<Value, ResolutionFailure> {
        if name.trim().is_empty() {
            return Ok(target.clone());
        }
        if target.is_null() {
            return Err(ResolutionFailure::new(format!(
                "`{name}` not found on null object."
            )));
        }
        if let Some(value) = self.custom.iter().find_map(|r| r.resolve(target, name)) {
            return Ok(value);
        }
        match target {
            Value::Map(map) => map.get(name).cloned().ok_or_else(|| {
                ResolutionFailure::new(format!("`{name}` not found in map {target}."))
            }),
            Value::Function(f) => Ok(f.call(name)),
            Value::Object(model) => probe(model.as_ref(), name).ok_or_else(|| {
                ResolutionFailure::new(format!("`{name}` not found on {target}."))
            }),
            _ => Err(ResolutionFailure::new(format!(
                "`{name}` not found on {target}."
            ))),
        }
    }
}

impl fmt::Debug for NameResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameResolver")
            .field("custom", &self.custom.len())
            .finish()
    }
}

/// Looks `name` up on a model: field, then getter, then isser, then the
/// method itself.
fn probe(model: &dyn Model, name: &str) -> Option<Value> {
    let suffix = capitalize(name);
    let getter = format!("get{suffix}");
    let isser = format!("is{suffix}");
    lineage(model)
        .find_map(|level| level.field(name))
        .or_else(|| lineage(model).find_map(|level| level.method(&getter)))
        .or_else(|| lineage(model).find_map(|level| level.method(&isser)))
        .or_else(|| lineage(model).find_map(|level| level.method(name)))
}

/// The model and its ancestors, most derived first.
fn lineage<'a>(model: &'a dyn Model) -> impl Iterator<Item = &'a dyn Model> + 'a {
    std::iter::successors(Some(model), |level: &&'a dyn Model| (*level).parent())
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;

    /// A two-level model: `Child` overrides `getName` from `Base` and adds
    /// an `age` field.
    #[derive(Debug)]
    struct Base;

    impl fmt::Display for Base {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Base")
        }
    }

    impl Model for Base {
        fn field(&self, name: &str) -> Option<Value> {
            (name == "kind").then(|| Value::from("base"))
        }

        fn method(&self, name: &str) -> Option<Value> {
            match name {
                "getName" => Some(Value::from("base name")),
                "getTitle" => Some(Value::from("base title")),
                "isActive" => Some(Value::Bool(true)),
                _ => None,
            }
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[derive(Debug)]
    struct Child {
        base: Base,
    }

    impl fmt::Display for Child {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Child")
        }
    }

    impl Model for Child {
        fn field(&self, name: &str) -> Option<Value> {
            (name == "age").then(|| Value::from(3))
        }

        fn method(&self, name: &str) -> Option<Value> {
            (name == "getName").then(|| Value::from("child name"))
        }

        fn parent(&self) -> Option<&dyn Model> {
            Some(&self.base)
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn child() -> Value {
        Value::object(Child { base: Base })
    }

    #[test]
    fn test_blank_path_is_identity() {
        let resolver = NameResolver::default();
        let model = Value::from("x");
        assert_eq!(resolver.resolve(&model, ""), Ok(Value::from("x")));
        assert_eq!(resolver.resolve(&model, "  "), Ok(Value::from("x")));
        assert_eq!(resolver.resolve(&Value::Null, ""), Ok(Value::Null));
    }

    #[test]
    fn test_null_target_fails() {
        let resolver = NameResolver::default();
        let err = resolver.resolve(&Value::Null, "name").unwrap_err();
        assert_eq!(err.message, "`name` not found on null object.");
    }

    #[test]
    fn test_map_lookup() {
        let resolver = NameResolver::default();
        let model = Value::map([("a", 1)]);
        assert_eq!(resolver.resolve(&model, "a"), Ok(Value::from(1)));
        let err = resolver.resolve(&model, "b").unwrap_err();
        assert_eq!(err.message, "`b` not found in map {a: 1}.");
    }

    #[test]
    fn test_function_lookup() {
        let resolver = NameResolver::default();
        let model = Value::function(|name| Value::from(name.len()));
        assert_eq!(resolver.resolve(&model, "four"), Ok(Value::from(4)));
    }

    #[test]
    fn test_model_most_derived_first() {
        let resolver = NameResolver::default();
        let model = child();
        assert_eq!(resolver.resolve(&model, "name"), Ok(Value::from("child name")));
        assert_eq!(resolver.resolve(&model, "title"), Ok(Value::from("base title")));
        assert_eq!(resolver.resolve(&model, "age"), Ok(Value::from(3)));
        assert_eq!(resolver.resolve(&model, "kind"), Ok(Value::from("base")));
        assert_eq!(resolver.resolve(&model, "active"), Ok(Value::Bool(true)));
    }

    #[test]
    fn test_field_beats_getter() {
        #[derive(Debug)]
        struct Both;
        impl fmt::Display for Both {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("Both")
            }
        }
        impl Model for Both {
            fn field(&self, name: &str) -> Option<Value> {
                (name == "x").then(|| Value::from("field"))
            }
            fn method(&self, name: &str) -> Option<Value> {
                (name == "getX").then(|| Value::from("getter"))
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
        let resolver = NameResolver::default();
        assert_eq!(
            resolver.resolve(&Value::object(Both), "x"),
            Ok(Value::from("field"))
        );
    }

    #[test]
    fn test_plain_method_comes_last() {
        #[derive(Debug)]
        struct Sized3;
        impl fmt::Display for Sized3 {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("Sized3")
            }
        }
        impl Model for Sized3 {
            fn method(&self, name: &str) -> Option<Value> {
                match name {
                    "size" => Some(Value::from(3)),
                    "isEmpty" => Some(Value::Bool(false)),
                    "empty" => Some(Value::Bool(true)),
                    _ => None,
                }
            }
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
        let resolver = NameResolver::default();
        let model = Value::object(Sized3);
        assert_eq!(resolver.resolve(&model, "size"), Ok(Value::from(3)));
        assert_eq!(resolver.resolve(&model, "empty"), Ok(Value::Bool(false)));
    }

    #[test]
    fn test_model_missing_property() {
        let resolver = NameResolver::default();
        let err = resolver.resolve(&child(), "missing").unwrap_err();
        assert_eq!(err.message, "`missing` not found on Child.");
    }

    #[test]
    fn test_scalar_target_fails() {
        let resolver = NameResolver::default();
        let err = resolver.resolve(&Value::from(5), "x").unwrap_err();
        assert_eq!(err.message, "`x` not found on 5.");
    }

    #[test]
    fn test_dotted_path_stops_at_first_failure() {
        let resolver = NameResolver::default();
        let model = Value::map([("a", Value::map([("b", Value::Null)]))]);
        assert_eq!(resolver.resolve(&model, "a.b"), Ok(Value::Null));
        let err = resolver.resolve(&model, "a.b.c").unwrap_err();
        assert_eq!(err.message, "`c` not found on null object.");
    }

    #[test]
    fn test_custom_resolver_runs_first() {
        let length = |target: &Value, name: &str| match (target, name) {
            (Value::String(s), "length") => Some(Value::from(s.chars().count())),
            _ => None,
        };
        let resolver = NameResolver::new(vec![Arc::new(length) as Arc<dyn CustomNameResolver>]);
        let model = Value::map([("word", "hello")]);
        assert_eq!(resolver.resolve(&model, "word.length"), Ok(Value::from(5)));
        // Declining falls through to the built-in lookups.
        assert_eq!(resolver.resolve(&model, "word"), Ok(Value::from("hello")));
    }

    #[test]
    fn test_custom_resolver_does_not_see_null() {
        let always = |_: &Value, _: &str| Some(Value::from("claimed"));
        let resolver = NameResolver::new(vec![Arc::new(always) as Arc<dyn CustomNameResolver>]);
        assert!(resolver.resolve(&Value::Null, "x").is_err());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("name"), "Name");
        assert_eq!(capitalize("éclair"), "Éclair");
        assert_eq!(capitalize(""), "");
    }
}
