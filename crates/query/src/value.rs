//! Dynamic values accepted by the resolver and its helpers.
//!
//! A closed enum stands in for "anything a caller can pass": scalars, arrays, property
//! bags, host nodes, previously built collections and ready handlers.

use std::fmt;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use html::{Document, NodeKey};
use indexmap::IndexMap;
use regex::Regex;

use crate::collection::Collection;

/// A ready handler. Cloning shares the same closure.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn(&mut Document)>);

impl Callback {
    pub fn new(f: impl Fn(&mut Document) + 'static) -> Self {
        Callback(Rc::new(f))
    }

    pub fn call(&self, doc: &mut Document) {
        (self.0)(doc)
    }

    pub fn ptr_eq(&self, other: &Callback) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// What an object was constructed from; decides `is_plain_object`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ObjectKind {
    /// Literal mapping whose prototype is the base object prototype.
    #[default]
    Plain,
    /// Mapping created without any prototype.
    NullPrototype,
    /// Instance of a named class.
    Instance(String),
}

/// Insertion-ordered key/value mapping.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Object {
    kind: ObjectKind,
    entries: IndexMap<String, Value>,
}

impl Object {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn null_prototype() -> Self {
        Object {
            kind: ObjectKind::NullPrototype,
            entries: IndexMap::new(),
        }
    }

    pub fn instance(class_name: impl Into<String>) -> Self {
        Object {
            kind: ObjectKind::Instance(class_name.into()),
            entries: IndexMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut Value)> {
        self.entries.iter_mut().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Object {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut object = Object::new();
        for (k, v) in iter {
            object.insert(k, v);
        }
        object
    }
}

#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Function(Callback),
    Array(Vec<Value>),
    Object(Object),
    Date(SystemTime),
    RegExp(Regex),
    Error(String),
    Node(NodeKey),
    Collection(Rc<Collection>),
    /// The global browsing context.
    Window,
}

impl Value {
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// `false` for `undefined`, `null`, `false`, `0`, `NaN` and `""`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Runtime class name as reported by the platform's object-to-string hook; `None` for
    /// the nullish values, which have no class.
    pub fn class_name(&self) -> Option<&'static str> {
        Some(match self {
            Value::Undefined | Value::Null => return None,
            Value::Bool(_) => "Boolean",
            Value::Number(_) => "Number",
            Value::String(_) => "String",
            Value::Function(_) => "Function",
            Value::Array(_) => "Array",
            Value::Date(_) => "Date",
            Value::RegExp(_) => "RegExp",
            Value::Error(_) => "Error",
            Value::Object(_) | Value::Collection(_) => "Object",
            Value::Node(_) => "HTMLElement",
            Value::Window => "Window",
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<NodeKey> {
        match self {
            Value::Node(key) => Some(*key),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// String coercion as used when a value is written into an attribute.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => s.clone(),
            Value::Function(_) => "function () { [native code] }".to_string(),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_display_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) | Value::Collection(_) => "[object Object]".to_string(),
            Value::Date(time) => match time.duration_since(UNIX_EPOCH) {
                Ok(since) => since.as_millis().to_string(),
                Err(before) => format!("-{}", before.duration().as_millis()),
            },
            Value::RegExp(re) => format!("/{}/", re.as_str()),
            Value::Error(message) if message.is_empty() => "Error".to_string(),
            Value::Error(message) => format!("Error: {message}"),
            Value::Node(_) => "[object HTMLElement]".to_string(),
            Value::Window => "[object Window]".to_string(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined)
            | (Value::Null, Value::Null)
            | (Value::Window, Value::Window) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a.ptr_eq(b),
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::RegExp(a), Value::RegExp(b)) => a.as_str() == b.as_str(),
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Node(a), Value::Node(b)) => a == b,
            (Value::Collection(a), Value::Collection(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<NodeKey> for Value {
    fn from(key: NodeKey) -> Self {
        Value::Node(key)
    }
}

impl From<Option<NodeKey>> for Value {
    fn from(key: Option<NodeKey>) -> Self {
        key.map_or(Value::Null, Value::Node)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Vec<NodeKey>> for Value {
    fn from(keys: Vec<NodeKey>) -> Self {
        Value::Array(keys.into_iter().map(Value::Node).collect())
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<Rc<Collection>> for Value {
    fn from(collection: Rc<Collection>) -> Self {
        Value::Collection(collection)
    }
}

impl From<Callback> for Value {
    fn from(callback: Callback) -> Self {
        Value::Function(callback)
    }
}

impl From<Regex> for Value {
    fn from(re: Regex) -> Self {
        Value::RegExp(re)
    }
}

impl From<SystemTime> for Value {
    fn from(time: SystemTime) -> Self {
        Value::Date(time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn truthiness_matches_loose_boolean_coercion() {
        for falsy in [
            Value::Undefined,
            Value::Null,
            Value::Bool(false),
            Value::Number(0.0),
            Value::Number(f64::NAN),
            Value::from(""),
        ] {
            assert!(!falsy.is_truthy(), "{falsy:?} should be falsy");
        }
        for truthy in [
            Value::from(" "),
            Value::Number(-1.0),
            Value::Array(vec![]),
            Value::Object(Object::new()),
            Value::Window,
        ] {
            assert!(truthy.is_truthy(), "{truthy:?} should be truthy");
        }
    }

    #[test]
    fn display_string_coerces_like_attribute_assignment() {
        assert_eq!(Value::Number(3.0).to_display_string(), "3");
        assert_eq!(Value::Number(-0.0).to_display_string(), "0");
        assert_eq!(Value::Number(1.5).to_display_string(), "1.5");
        assert_eq!(Value::Number(f64::INFINITY).to_display_string(), "Infinity");
        assert_eq!(Value::Number(f64::NAN).to_display_string(), "NaN");
        assert_eq!(
            Value::Array(vec![1.into(), Value::Null, "x".into()]).to_display_string(),
            "1,,x"
        );
        assert_eq!(Value::Object(Object::new()).to_display_string(), "[object Object]");
        assert_eq!(Value::Error("boom".into()).to_display_string(), "Error: boom");
        assert_eq!(
            Value::Date(UNIX_EPOCH + Duration::from_millis(1500)).to_display_string(),
            "1500"
        );
    }

    #[test]
    fn object_keeps_insertion_order() {
        let object = Object::new().with("b", 1).with("a", 2).with("b", 3);
        let keys: Vec<_> = object.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(object.get("b"), Some(&Value::Number(3.0)));
    }

    #[test]
    fn callbacks_and_collections_compare_by_identity() {
        let cb = Callback::new(|_| {});
        assert_eq!(Value::from(cb.clone()), Value::from(cb));
        assert_ne!(
            Value::from(Callback::new(|_| {})),
            Value::from(Callback::new(|_| {}))
        );
        let a = Rc::new(Collection::empty());
        assert_eq!(Value::from(a.clone()), Value::from(a));
        assert_ne!(
            Value::from(Rc::new(Collection::empty())),
            Value::from(Rc::new(Collection::empty()))
        );
    }
}
