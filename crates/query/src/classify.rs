//! Closed runtime type tags.

use std::fmt;

use crate::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Boolean,
    Number,
    String,
    Function,
    Array,
    Date,
    RegExp,
    Object,
    Error,
    Null,
    Undefined,
}

/// Class names with a dedicated tag; every other class classifies as `object`.
pub const CLASS_NAMES: [&str; 9] = [
    "Boolean", "Number", "String", "Function", "Array", "Date", "RegExp", "Object", "Error",
];

impl TypeTag {
    pub fn from_class_name(name: &str) -> Option<TypeTag> {
        Some(match name {
            "Boolean" => TypeTag::Boolean,
            "Number" => TypeTag::Number,
            "String" => TypeTag::String,
            "Function" => TypeTag::Function,
            "Array" => TypeTag::Array,
            "Date" => TypeTag::Date,
            "RegExp" => TypeTag::RegExp,
            "Object" => TypeTag::Object,
            "Error" => TypeTag::Error,
            _ => return None,
        })
    }

    /// Lowercase tag; the nullish tags read as the value itself (`"null"`, `"undefined"`).
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Boolean => "boolean",
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Function => "function",
            TypeTag::Array => "array",
            TypeTag::Date => "date",
            TypeTag::RegExp => "regexp",
            TypeTag::Object => "object",
            TypeTag::Error => "error",
            TypeTag::Null => "null",
            TypeTag::Undefined => "undefined",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify(value: &Value) -> TypeTag {
    match value {
        Value::Undefined => TypeTag::Undefined,
        Value::Null => TypeTag::Null,
        other => other
            .class_name()
            .and_then(TypeTag::from_class_name)
            .unwrap_or(TypeTag::Object),
    }
}
