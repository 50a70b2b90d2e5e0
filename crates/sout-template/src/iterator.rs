//! Turning values into sequences.

use std::fmt;
use std::sync::Arc;

use sout_core::{Position, SoutError, SoutResult};

use crate::hooks::CustomIteratorFactory;
use crate::scope::Scope;
use crate::value::{Value, ValueIter};

/// Decides what a nesting loops over.
///
/// Custom factories are asked first. Then lists yield their elements, live
/// iterators yield what is left in them, and models that are sequences
/// yield their elements. Any other non-null value is promoted to a
/// one-element sequence, unless promotion is turned off, in which case the
/// factory declines. Looping over null is an error.
///
/// # Examples
///
/// ```
/// use sout_core::Position;
/// use sout_template::iterator::IteratorFactory;
/// use sout_template::scope::Scope;
/// use sout_template::value::Value;
///
/// let factory = IteratorFactory::default();
/// let scope = Scope::new();
/// let items = factory
///     .to_iterator(&Value::list([1, 2]), &scope, Position::START)
///     .unwrap()
///     .unwrap();
/// assert_eq!(items.count(), 2);
///
/// let single = factory
///     .to_iterator(&Value::from("one"), &scope, Position::START)
///     .unwrap()
///     .unwrap();
/// assert_eq!(single.collect::<Vec<_>>(), vec![Value::from("one")]);
/// ```
#[derive(Clone)]
pub struct IteratorFactory {
    custom: Vec<Arc<dyn CustomIteratorFactory>>,
    promote_scalars: bool,
}

impl IteratorFactory {
    /// Creates a factory that consults `custom` before the built-in rules.
    pub fn new(custom: Vec<Arc<dyn CustomIteratorFactory>>, promote_scalars: bool) -> Self {
        Self {
            custom,
            promote_scalars,
        }
    }

    /// Returns the sequence for `value`, or `None` when nothing can loop
    /// over it.
    ///
    /// # Errors
    ///
    /// Fails for null values that no custom factory claims. A live iterator
    /// that was already looped over yields nothing.
    pub fn to_iterator(
        &self,
        value: &Value,
        scope: &Scope<'_>,
        position: Position,
    ) -> SoutResult<Option<ValueIter>> {
        for factory in &self.custom {
            if let Some(iter) = factory.to_iterator(value, scope, position)? {
                return Ok(Some(iter));
            }
        }
        match value {
            Value::Null => Err(SoutError::render_at("trying to loop over null", position)),
            Value::List(items) => Ok(Some(ValueIter::new(items.clone()))),
            Value::Iterator(once) => Ok(Some(once.take())),
            Value::Object(model) => match model.iter() {
                Some(iter) => Ok(Some(iter)),
                None => Ok(self.promote(value)),
            },
            _ => Ok(self.promote(value)),
        }
    }

    fn promote(&self, value: &Value) -> Option<ValueIter> {
        self.promote_scalars
            .then(|| ValueIter::new(std::iter::once(value.clone())))
    }
}

impl Default for IteratorFactory {
    fn default() -> Self {
        Self::new(Vec::new(), true)
    }
}

impl fmt::Debug for IteratorFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IteratorFactory")
            .field("custom", &self.custom.len())
            .field("promote_scalars", &self.promote_scalars)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use super::*;
    use crate::value::Model;

    #[derive(Debug)]
    struct Countdown(i64);

    impl fmt::Display for Countdown {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Countdown({})", self.0)
        }
    }

    impl Model for Countdown {
        fn iter(&self) -> Option<ValueIter> {
            Some(ValueIter::new((1..=self.0).rev()))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    fn collect(factory: &IteratorFactory, value: &Value) -> Option<Vec<Value>> {
        factory
            .to_iterator(value, &Scope::new(), Position::START)
            .unwrap()
            .map(Iterator::collect)
    }

    #[test]
    fn test_list_elements() {
        let factory = IteratorFactory::default();
        let items = collect(&factory, &Value::list(["a", "b"])).unwrap();
        assert_eq!(items, vec![Value::from("a"), Value::from("b")]);
    }

    #[test]
    fn test_empty_list() {
        let factory = IteratorFactory::default();
        assert_eq!(collect(&factory, &Value::List(Vec::new())), Some(Vec::new()));
    }

    #[test]
    fn test_model_sequence() {
        let factory = IteratorFactory::default();
        let items = collect(&factory, &Value::object(Countdown(3))).unwrap();
        assert_eq!(items, vec![Value::from(3), Value::from(2), Value::from(1)]);
    }

    #[test]
    fn test_scalar_promotion() {
        let factory = IteratorFactory::default();
        assert_eq!(collect(&factory, &Value::from(7)), Some(vec![Value::from(7)]));
        let map = Value::map([("a", 1)]);
        assert_eq!(collect(&factory, &map), Some(vec![map.clone()]));
    }

    #[test]
    fn test_promotion_disabled_declines() {
        let factory = IteratorFactory::new(Vec::new(), false);
        assert!(collect(&factory, &Value::from("x")).is_none());
        assert!(collect(&factory, &Value::list([1])).is_some());
    }

    #[test]
    fn test_null_is_an_error() {
        let factory = IteratorFactory::default();
        let err = factory
            .to_iterator(&Value::Null, &Scope::new(), Position::new(2, 5))
            .unwrap_err();
        assert_eq!(err.to_string(), "2:5 trying to loop over null");
    }

    #[test]
    fn test_live_iterator_is_single_use() {
        let factory = IteratorFactory::default();
        let value = Value::iterator(vec!["x", "y"]);
        assert_eq!(collect(&factory, &value).map(|v| v.len()), Some(2));
        assert_eq!(collect(&factory, &value), Some(Vec::new()));
    }

    #[test]
    fn test_custom_factory_first() {
        fn empty_for_null(
            value: &Value,
            _: &Scope<'_>,
            _: Position,
        ) -> SoutResult<Option<ValueIter>> {
            Ok(value.is_null().then(ValueIter::empty))
        }
        let custom: Vec<Arc<dyn CustomIteratorFactory>> = vec![Arc::new(empty_for_null)];
        let factory = IteratorFactory::new(custom, true);
        assert_eq!(collect(&factory, &Value::Null), Some(Vec::new()));
        assert_eq!(collect(&factory, &Value::from(1)), Some(vec![Value::from(1)]));
    }
}
