//! Template values and the model abstraction.
//!
//! Provides [`Value`], the dynamic value that names resolve to and that
//! nestings loop over, and the [`Model`] trait that lets application types
//! expose fields, accessors and sequences to templates.

use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use sout_core::{SoutError, SoutResult};

/// An application object that templates can look into.
///
/// Name resolution asks a model for a property in a fixed order: a public
/// [`field`](Model::field) with the exact name, then a `getX` accessor, then
/// an `isX` accessor, then a method with the exact name, the last three through
/// [`method`](Model::method). Each step
/// walks the [`parent`](Model::parent) chain from the model itself upward,
/// so the most derived declaration wins.
///
/// # Examples
///
/// ```
/// use std::any::Any;
/// use std::fmt;
/// use sout_template::value::{Model, Value};
///
/// #[derive(Debug)]
/// struct Person {
///     name: String,
/// }
///
/// impl fmt::Display for Person {
///     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
///         write!(f, "Person({})", self.name)
///     }
/// }
///
/// impl Model for Person {
///     fn method(&self, name: &str) -> Option<Value> {
///         match name {
///             "getName" => Some(Value::from(self.name.as_str())),
///             _ => None,
///         }
///     }
///
///     fn as_any(&self) -> &dyn Any {
///         self
///     }
/// }
///
/// let person = Person { name: "Ada".to_string() };
/// assert_eq!(person.method("getName"), Some(Value::from("Ada")));
/// ```
pub trait Model: fmt::Debug + fmt::Display + Send + Sync {
    /// Returns the public field called `name`, declared on this level only.
    fn field(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Calls the zero-argument method called `name` (e.g. `getName`,
    /// `isActive` or `size`), declared on this level only.
    fn method(&self, _name: &str) -> Option<Value> {
        None
    }

    /// Returns the next, less derived, level of this model.
    fn parent(&self) -> Option<&dyn Model> {
        None
    }

    /// Returns the elements of this model when it is a sequence.
    fn iter(&self) -> Option<ValueIter> {
        None
    }

    /// Returns `self` as [`Any`] so hooks can recognise concrete types.
    fn as_any(&self) -> &dyn Any;
}

/// A name-indexed function: resolving `x` on it calls it with `"x"`.
#[derive(Clone)]
pub struct Function(Arc<dyn Fn(&str) -> Value + Send + Sync>);

impl Function {
    /// Wraps a closure.
    pub fn new(f: impl Fn(&str) -> Value + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Applies the function to `name`.
    pub fn call(&self, name: &str) -> Value {
        (self.0)(name)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function(..)")
    }
}

/// A boxed iterator of values, as handed to the collection renderer.
pub struct ValueIter {
    inner: Box<dyn Iterator<Item = Value> + Send>,
}

impl ValueIter {
    /// Wraps anything that yields values.
    pub fn new<I>(iter: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: Send + 'static,
        I::Item: Into<Value> + 'static,
    {
        Self {
            inner: Box::new(iter.into_iter().map(Into::into)),
        }
    }

    /// An iterator that yields nothing.
    pub fn empty() -> Self {
        Self {
            inner: Box::new(std::iter::empty()),
        }
    }
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        self.inner.next()
    }
}

impl fmt::Debug for ValueIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValueIter(..)")
    }
}

/// A live iterator stored in a model. It can be looped over once; clones
/// share the same underlying iterator, and later loops see it exhausted.
#[derive(Clone)]
pub struct OnceIter(Arc<Mutex<Option<ValueIter>>>);

impl OnceIter {
    /// Wraps an iterator.
    pub fn new(iter: ValueIter) -> Self {
        Self(Arc::new(Mutex::new(Some(iter))))
    }

    /// Takes the iterator out. Once taken, every later call yields an
    /// exhausted iterator, the way a spent cursor would.
    pub fn take(&self) -> ValueIter {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .unwrap_or_else(ValueIter::empty)
    }
}

impl fmt::Debug for OnceIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OnceIter(..)")
    }
}

/// A dynamic value in a template model.
#[derive(Debug, Clone)]
pub enum Value {
    /// The absence of a value.
    Null,
    /// A boolean, rendered by the boolean handler when used as a nesting.
    Bool(bool),
    /// A 64-bit integer.
    Integer(i64),
    /// A 64-bit floating point number.
    Float(f64),
    /// A single character.
    Char(char),
    /// A string.
    String(String),
    /// An ordered sequence.
    List(Vec<Value>),
    /// A string-keyed map. Keys are sorted so output is deterministic.
    Map(BTreeMap<String, Value>),
    /// A name-indexed function.
    Function(Function),
    /// An application object.
    Object(Arc<dyn Model>),
    /// A live, single-use iterator.
    Iterator(OnceIter),
}

impl Value {
    /// Wraps an application object.
    pub fn object(model: impl Model + 'static) -> Self {
        Self::Object(Arc::new(model))
    }

    /// Wraps a name-indexed function.
    pub fn function(f: impl Fn(&str) -> Self + Send + Sync + 'static) -> Self {
        Self::Function(Function::new(f))
    }

    /// Wraps a live iterator that can be looped over once.
    pub fn iterator<I>(iter: I) -> Self
    where
        I: IntoIterator,
        I::IntoIter: Send + 'static,
        I::Item: Into<Self> + 'static,
    {
        Self::Iterator(OnceIter::new(ValueIter::new(iter)))
    }

    /// Builds a map from key/value pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use sout_template::value::Value;
    ///
    /// let person = Value::map([("name", "Ada")]);
    /// assert_eq!(person.to_string(), "{name: Ada}");
    /// ```
    pub fn map<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Builds a list from anything that yields values.
    pub fn list<V: Into<Self>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Converts any serializable type into a value through its JSON form.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde::Serialize;
    /// use sout_template::value::Value;
    ///
    /// #[derive(Serialize)]
    /// struct Order {
    ///     id: u32,
    ///     items: Vec<&'static str>,
    /// }
    ///
    /// let order = Value::from_serialize(&Order { id: 7, items: vec!["tea"] }).unwrap();
    /// assert_eq!(order.to_string(), "{id: 7, items: [tea]}");
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(model: &T) -> SoutResult<Self> {
        serde_json::to_value(model)
            .map(Self::from)
            .map_err(|e| SoutError::Serialization(e.to_string()))
    }

    /// Returns `true` for [`Value::Null`].
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`Value::Integer`].
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the string contents if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the model if this is a [`Value::Object`].
    pub fn as_model(&self) -> Option<&dyn Model> {
        match self {
            Self::Object(model) => Some(model.as_ref()),
            _ => None,
        }
    }

    /// Returns the concrete object behind a [`Value::Object`].
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.as_model()?.as_any().downcast_ref::<T>()
    }

    /// A short name for the kind of value, used in log events.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Function(_) => "function",
            Self::Object(_) => "object",
            Self::Iterator(_) => "iterator",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(x) => {
                // Integer-valued floats keep their decimal point.
                if x.fract() == 0.0 && x.is_finite() {
                    write!(f, "{x:.1}")
                } else {
                    write!(f, "{x}")
                }
            }
            Self::Char(c) => write!(f, "{c}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Self::Function(_) => f.write_str("<function>"),
            Self::Object(model) => write!(f, "{model}"),
            Self::Iterator(_) => f.write_str("<iterator>"),
        }
    }
}

impl PartialEq for Value {
    #[allow(clippy::cast_precision_loss)]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Integer(a), Self::Float(b)) | (Self::Float(b), Self::Integer(a)) => {
                (*a as f64) == *b
            }
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Arc::ptr_eq(&a.0, &b.0),
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Iterator(a), Self::Iterator(b)) => Arc::ptr_eq(&a.0, &b.0),
            _ => false,
        }
    }
}

// -- From implementations --

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Self::Char(c)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i8> for Value {
    fn from(i: i8) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u8> for Value {
    fn from(i: u8) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i16> for Value {
    fn from(i: i16) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<u64> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(i: u64) -> Self {
        i64::try_from(i).map_or(Self::Float(i as f64), Self::Integer)
    }
}

impl From<usize> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(i: usize) -> Self {
        i64::try_from(i).map_or(Self::Float(i as f64), Self::Integer)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Self::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>, const N: usize> From<[T; N]> for Value {
    fn from(items: [T; N]) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Clone + Into<Self>> From<&[T]> for Value {
    fn from(items: &[T]) -> Self {
        Self::List(items.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<HashMap<String, T>> for Value {
    fn from(m: HashMap<String, T>) -> Self {
        Self::Map(m.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Self>> From<BTreeMap<String, T>> for Value {
    fn from(m: BTreeMap<String, T>) -> Self {
        Self::Map(m.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(o: Option<T>) -> Self {
        o.map_or(Self::Null, Into::into)
    }
}

impl<M: Model + 'static> From<Arc<M>> for Value {
    fn from(model: Arc<M>) -> Self {
        Self::Object(model)
    }
}

impl From<Function> for Value {
    fn from(f: Function) -> Self {
        Self::Function(f)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    Self::Float(f)
                } else {
                    Self::Null
                }
            }
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(arr) => Self::List(arr.into_iter().map(Self::from).collect()),
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Point {
        x: i64,
    }

    impl fmt::Display for Point {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "Point({})", self.x)
        }
    }

    impl Model for Point {
        fn field(&self, name: &str) -> Option<Value> {
            (name == "x").then(|| Value::Integer(self.x))
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_display_scalars() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Bool(true).to_string(), "true");
        assert_eq!(Value::Integer(-3).to_string(), "-3");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::Char('x').to_string(), "x");
    }

    #[test]
    fn test_display_collections() {
        let list = Value::list(["Hans", "Henk"]);
        assert_eq!(list.to_string(), "[Hans, Henk]");
        let map = Value::map([("b", 2), ("a", 1)]);
        assert_eq!(map.to_string(), "{a: 1, b: 2}");
    }

    #[test]
    fn test_object_display_and_downcast() {
        let value = Value::object(Point { x: 4 });
        assert_eq!(value.to_string(), "Point(4)");
        assert_eq!(value.downcast_ref::<Point>().map(|p| p.x), Some(4));
        assert!(value.downcast_ref::<String>().is_none());
        assert_eq!(value.kind(), "object");
    }

    #[test]
    fn test_object_equality_is_identity() {
        let a = Value::object(Point { x: 1 });
        let b = Value::object(Point { x: 1 });
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_function_call() {
        let upper = Value::function(|name| Value::from(name.to_uppercase()));
        let Value::Function(f) = upper else {
            panic!("expected a function");
        };
        assert_eq!(f.call("abc"), Value::from("ABC"));
    }

    #[test]
    fn test_once_iter_consumed_once() {
        let value = Value::iterator(vec![1, 2, 3]);
        let Value::Iterator(once) = value.clone() else {
            panic!("expected an iterator");
        };
        let items: Vec<Value> = once.take().collect();
        assert_eq!(items, vec![Value::from(1), Value::from(2), Value::from(3)]);

        // The clone shares the same iterator, which is now spent.
        let Value::Iterator(again) = value else {
            panic!("expected an iterator");
        };
        assert_eq!(again.take().count(), 0);
        assert_eq!(again.take().count(), 0);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"name": "Ada", "tags": ["x", 1], "ok": true, "none": null});
        let value = Value::from(json);
        let Value::Map(map) = value else {
            panic!("expected a map");
        };
        assert_eq!(map["name"], Value::from("Ada"));
        assert_eq!(map["tags"], Value::list([Value::from("x"), Value::from(1)]));
        assert_eq!(map["ok"], Value::Bool(true));
        assert!(map["none"].is_null());
    }

    #[test]
    fn test_small_integer_arrays_become_lists() {
        assert_eq!(Value::from(vec![1u8, 2, 3]), Value::list([1, 2, 3]));
        assert_eq!(Value::from([1i16, -2]), Value::list([1, -2]));
        assert_eq!(Value::from(&[7u16, 8][..]), Value::list([7, 8]));
        assert_eq!(Value::from(-5i8), Value::Integer(-5));
    }

    #[test]
    fn test_from_option_and_numbers() {
        assert!(Value::from(None::<i32>).is_null());
        assert_eq!(Value::from(Some(5)), Value::Integer(5));
        assert_eq!(Value::from(u64::MAX).kind(), "float");
        assert_eq!(Value::Integer(2), Value::Float(2.0));
    }
}
