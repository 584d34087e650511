//! Predicates over [`Value`], built on [`classify`].

use crate::classify::{TypeTag, classify};
use crate::value::{ObjectKind, Value};

pub fn is_array(value: &Value) -> bool {
    classify(value) == TypeTag::Array
}

pub fn is_function(value: &Value) -> bool {
    classify(value) == TypeTag::Function
}

pub fn is_object(value: &Value) -> bool {
    classify(value) == TypeTag::Object
}

pub fn is_window(value: &Value) -> bool {
    matches!(value, Value::Window)
}

/// An object literal: not a window, not a class instance, not prototype-less.
pub fn is_plain_object(value: &Value) -> bool {
    is_object(value)
        && !is_window(value)
        && matches!(value, Value::Object(object) if *object.kind() == ObjectKind::Plain)
}

/// Has a numeric `length`: arrays, collections, strings and objects carrying a number
/// under `length`.
pub fn like_array(value: &Value) -> bool {
    match value {
        Value::Array(_) | Value::Collection(_) | Value::String(_) => true,
        Value::Object(object) => matches!(object.get("length"), Some(Value::Number(_))),
        _ => false,
    }
}

/// Already a collection instance (identity, not shape).
pub fn is_collection(value: &Value) -> bool {
    matches!(value, Value::Collection(_))
}

/// Copy of `values` without `null`/`undefined` entries.
pub fn compact(values: &[Value]) -> Vec<Value> {
    values.iter().filter(|v| !v.is_nullish()).cloned().collect()
}
