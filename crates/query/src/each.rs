//! Enumerate-with-early-exit over array-likes and mappings.
//!
//! Array-likes (see [`like_array`]) are visited by index `0..length`, anything else by its
//! own keys in insertion order. Returning [`ControlFlow::Break`] stops the walk; the input
//! is handed back unchanged either way so calls can be chained.

use std::ops::ControlFlow;

use crate::predicates::like_array;
use crate::value::{Object, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EachKey<'a> {
    Index(usize),
    Key(&'a str),
}

impl EachKey<'_> {
    /// The key as a property name; indices are written in decimal.
    pub fn to_key_string(&self) -> String {
        match self {
            EachKey::Index(i) => i.to_string(),
            EachKey::Key(k) => (*k).to_string(),
        }
    }
}

fn has_numeric_length(object: &Object) -> bool {
    matches!(object.get("length"), Some(Value::Number(_)))
}

fn array_like_length(object: &Object) -> usize {
    match object.get("length") {
        Some(Value::Number(n)) if *n > 0.0 => n.ceil() as usize,
        _ => 0,
    }
}

pub fn each<'a, F>(value: &'a Value, mut callback: F) -> &'a Value
where
    F: FnMut(EachKey<'a>, &Value) -> ControlFlow<()>,
{
    if like_array(value) {
        let _ = match value {
            Value::Array(items) => visit_indexed(items.len(), |i| items[i].clone(), &mut callback),
            Value::Collection(collection) => visit_indexed(
                collection.len(),
                |i| Value::Node(collection[i]),
                &mut callback,
            ),
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                visit_indexed(chars.len(), |i| Value::String(chars[i].to_string()), &mut callback)
            }
            Value::Object(object) => visit_indexed(
                array_like_length(object),
                |i| object.get(&i.to_string()).cloned().unwrap_or_default(),
                &mut callback,
            ),
            _ => ControlFlow::Continue(()),
        };
    } else if let Value::Object(object) = value {
        for (key, item) in object.iter() {
            if callback(EachKey::Key(key), item).is_break() {
                break;
            }
        }
    }
    value
}

fn visit_indexed<'a, G, F>(len: usize, get: G, callback: &mut F) -> ControlFlow<()>
where
    G: Fn(usize) -> Value,
    F: FnMut(EachKey<'a>, &Value) -> ControlFlow<()>,
{
    for i in 0..len {
        callback(EachKey::Index(i), &get(i))?;
    }
    ControlFlow::Continue(())
}

/// Like [`each`], but arrays and mappings hand out their entries mutably; a change made
/// at one entry is visible when a later entry is visited. Strings and collections are
/// immutable and are visited through temporaries.
pub fn each_mut<F>(value: &mut Value, mut callback: F) -> &mut Value
where
    F: FnMut(EachKey<'_>, &mut Value) -> ControlFlow<()>,
{
    match &mut *value {
        Value::Array(items) => {
            for (i, item) in items.iter_mut().enumerate() {
                if callback(EachKey::Index(i), item).is_break() {
                    break;
                }
            }
        }
        Value::Object(object) if has_numeric_length(object) => {
            for i in 0..array_like_length(object) {
                let key = i.to_string();
                let mut missing = Value::Undefined;
                let item = match object.get_mut(&key) {
                    Some(item) => item,
                    None => &mut missing,
                };
                if callback(EachKey::Index(i), item).is_break() {
                    break;
                }
            }
        }
        Value::Object(object) => {
            for (key, item) in object.iter_mut() {
                if callback(EachKey::Key(key), item).is_break() {
                    break;
                }
            }
        }
        other => {
            each(other, |key, item| {
                let mut copy = item.clone();
                callback(key, &mut copy)
            });
        }
    }
    value
}
