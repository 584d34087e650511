//! Property-bag application: the named accessors a freshly built fragment can be
//! configured through, and the generic attribute fallback.

use std::fmt;
use std::sync::LazyLock;

use css::{parse_declarations, serialize_declarations, set_declaration};
use html::{Document, DomError, NodeKey};
use regex::Regex;

use crate::value::Value;

/// Property-bag keys applied through an accessor instead of as attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodAttribute {
    Val,
    Css,
    Html,
    Text,
    Data,
    Width,
    Height,
    Offset,
}

impl MethodAttribute {
    pub const ALL: [MethodAttribute; 8] = [
        MethodAttribute::Val,
        MethodAttribute::Css,
        MethodAttribute::Html,
        MethodAttribute::Text,
        MethodAttribute::Data,
        MethodAttribute::Width,
        MethodAttribute::Height,
        MethodAttribute::Offset,
    ];

    /// Exact, case-sensitive lookup.
    pub fn from_key(key: &str) -> Option<MethodAttribute> {
        Self::ALL.into_iter().find(|m| m.as_str() == key)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MethodAttribute::Val => "val",
            MethodAttribute::Css => "css",
            MethodAttribute::Html => "html",
            MethodAttribute::Text => "text",
            MethodAttribute::Data => "data",
            MethodAttribute::Width => "width",
            MethodAttribute::Height => "height",
            MethodAttribute::Offset => "offset",
        }
    }
}

impl fmt::Display for MethodAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Setters invoked while applying a property bag to the nodes of a new fragment.
pub trait PropertySetters {
    fn call_method(
        &self,
        doc: &mut Document,
        nodes: &[NodeKey],
        method: MethodAttribute,
        value: &Value,
    ) -> Result<(), DomError>;

    fn set_attr(
        &self,
        doc: &mut Document,
        nodes: &[NodeKey],
        name: &str,
        value: &Value,
    ) -> Result<(), DomError>;
}

/// Setters writing straight into the host document. Only element nodes are touched;
/// text and comment nodes in `nodes` are skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct DomSetters;

// Properties whose numeric values take no unit.
const UNITLESS_PROPERTIES: [&str; 7] = [
    "column-count",
    "columns",
    "font-weight",
    "line-height",
    "opacity",
    "z-index",
    "zoom",
];

static UPPER_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+)([A-Z][a-z])").expect("upper-run pattern is valid"));
static CAMEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([a-z\d])([A-Z])").expect("camel pattern is valid"));

/// `backgroundColor` -> `background-color`, `XMLHttp` -> `xml-http`.
pub fn dasherize(name: &str) -> String {
    let name = name.replace("::", "/");
    let name = UPPER_RUN_RE.replace_all(&name, "${1}_${2}");
    let name = CAMEL_RE.replace_all(&name, "${1}_${2}");
    name.replace('_', "-").to_lowercase()
}

fn maybe_add_px(property: &str, value: &Value) -> String {
    match value {
        Value::Number(n) if !UNITLESS_PROPERTIES.contains(&property) => {
            format!("{}px", Value::Number(*n).to_display_string())
        }
        other => other.to_display_string(),
    }
}

// `0` is kept; every other falsy value clears the property.
fn clears_property(value: &Value) -> bool {
    !value.is_truthy() && *value != Value::Number(0.0)
}

fn coerce_or_empty(value: &Value) -> String {
    if value.is_nullish() {
        String::new()
    } else {
        value.to_display_string()
    }
}

fn to_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => *n,
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        Some(Value::Null) => 0.0,
        Some(Value::String(s)) if s.trim().is_empty() => 0.0,
        Some(Value::String(s)) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn elements(doc: &Document, nodes: &[NodeKey]) -> Vec<NodeKey> {
    nodes.iter().copied().filter(|n| doc.is_element(*n)).collect()
}

fn update_style<'a>(
    doc: &mut Document,
    element: NodeKey,
    properties: impl IntoIterator<Item = (&'a str, &'a Value)>,
) -> Result<(), DomError> {
    let had_style = doc.has_attribute(element, "style");
    let mut declarations = parse_declarations(doc.attribute(element, "style").unwrap_or(""));
    for (name, value) in properties {
        let property = dasherize(name);
        if clears_property(value) {
            set_declaration(&mut declarations, &property, None);
        } else {
            let text = maybe_add_px(&property, value);
            set_declaration(&mut declarations, &property, Some(&text));
        }
    }
    if declarations.is_empty() && !had_style {
        return Ok(());
    }
    doc.set_attribute(element, "style", &serialize_declarations(&declarations))
}

fn write_attribute(
    doc: &mut Document,
    element: NodeKey,
    name: &str,
    value: &Value,
) -> Result<(), DomError> {
    if value.is_nullish() {
        doc.remove_attribute(element, name)
    } else {
        doc.set_attribute(element, name, &value.to_display_string())
    }
}

fn set_offset(doc: &mut Document, element: NodeKey, coords: &Value) -> Result<(), DomError> {
    let Value::Object(coords) = coords else {
        return Ok(());
    };
    // No layout here: the offset parent sits at the origin.
    let top = Value::Number(to_number(coords.get("top")));
    let left = Value::Number(to_number(coords.get("left")));
    let position = doc
        .attribute(element, "style")
        .map(parse_declarations)
        .and_then(|decls| decls.into_iter().find(|d| d.name == "position"))
        .map(|d| d.value);
    let relative = Value::from("relative");
    let mut props = vec![("top", &top), ("left", &left)];
    if position.as_deref().is_none_or(|p| p == "static") {
        props.push(("position", &relative));
    }
    update_style(doc, element, props)
}

impl PropertySetters for DomSetters {
    fn call_method(
        &self,
        doc: &mut Document,
        nodes: &[NodeKey],
        method: MethodAttribute,
        value: &Value,
    ) -> Result<(), DomError> {
        for element in elements(doc, nodes) {
            match method {
                MethodAttribute::Text => doc.set_text_content(element, &coerce_or_empty(value))?,
                MethodAttribute::Html => doc.set_inner_html(element, &coerce_or_empty(value))?,
                MethodAttribute::Val => {
                    doc.set_attribute(element, "value", &coerce_or_empty(value))?
                }
                MethodAttribute::Css => {
                    if let Value::Object(properties) = value {
                        update_style(doc, element, properties.iter())?;
                    }
                }
                MethodAttribute::Width | MethodAttribute::Height => {
                    update_style(doc, element, [(method.as_str(), value)])?
                }
                MethodAttribute::Data => {
                    if let Value::Object(entries) = value {
                        for (key, item) in entries.iter() {
                            let name = format!("data-{}", dasherize(key));
                            write_attribute(doc, element, &name, item)?;
                        }
                    }
                }
                MethodAttribute::Offset => set_offset(doc, element, value)?,
            }
        }
        Ok(())
    }

    fn set_attr(
        &self,
        doc: &mut Document,
        nodes: &[NodeKey],
        name: &str,
        value: &Value,
    ) -> Result<(), DomError> {
        for element in elements(doc, nodes) {
            write_attribute(doc, element, name, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;

    fn element(doc: &mut Document, markup: &str) -> NodeKey {
        let root = doc.root();
        doc.set_inner_html(root, markup).unwrap();
        doc.first_child(root).unwrap()
    }

    #[test]
    fn method_keys_are_exact() {
        for method in MethodAttribute::ALL {
            assert_eq!(MethodAttribute::from_key(method.as_str()), Some(method));
        }
        assert_eq!(MethodAttribute::from_key("Text"), None);
        assert_eq!(MethodAttribute::from_key("attr"), None);
    }

    #[test]
    fn dasherizes_camel_case() {
        assert_eq!(dasherize("backgroundColor"), "background-color");
        assert_eq!(dasherize("zIndex"), "z-index");
        assert_eq!(dasherize("XMLHttpRequest"), "xml-http-request");
        assert_eq!(dasherize("font_size"), "font-size");
        assert_eq!(dasherize("a::b"), "a/b");
    }

    #[test]
    fn text_html_and_val() {
        let mut doc = Document::new();
        let p = element(&mut doc, "<p>old</p>");
        let s = DomSetters;
        s.call_method(&mut doc, &[p], MethodAttribute::Text, &"<b>hi</b>".into()).unwrap();
        assert_eq!(doc.inner_html(p), "&lt;b&gt;hi&lt;/b&gt;");
        s.call_method(&mut doc, &[p], MethodAttribute::Html, &"<b>hi</b>".into()).unwrap();
        assert_eq!(doc.inner_html(p), "<b>hi</b>");
        s.call_method(&mut doc, &[p], MethodAttribute::Text, &Value::Null).unwrap();
        assert_eq!(doc.inner_html(p), "");
        s.call_method(&mut doc, &[p], MethodAttribute::Val, &42.into()).unwrap();
        assert_eq!(doc.attribute(p, "value"), Some("42"));
    }

    #[test]
    fn css_merges_into_style_attribute() {
        let mut doc = Document::new();
        let div = element(&mut doc, r#"<div style="color: red; margin: 1px"></div>"#);
        let props = Object::new()
            .with("backgroundColor", "blue")
            .with("zIndex", 3)
            .with("top", 0)
            .with("margin", "")
            .with("color", Value::Null);
        DomSetters
            .call_method(&mut doc, &[div], MethodAttribute::Css, &props.into())
            .unwrap();
        assert_eq!(
            doc.attribute(div, "style"),
            Some("background-color: blue; z-index: 3; top: 0px;")
        );
    }

    #[test]
    fn width_height_and_offset_write_style() {
        let mut doc = Document::new();
        let div = element(&mut doc, "<div></div>");
        let s = DomSetters;
        s.call_method(&mut doc, &[div], MethodAttribute::Width, &10.into()).unwrap();
        s.call_method(&mut doc, &[div], MethodAttribute::Height, &"2em".into()).unwrap();
        let coords = Object::new().with("top", 5).with("left", "7");
        s.call_method(&mut doc, &[div], MethodAttribute::Offset, &coords.into()).unwrap();
        assert_eq!(
            doc.attribute(div, "style"),
            Some("width: 10px; height: 2em; top: 5px; left: 7px; position: relative;")
        );
    }

    #[test]
    fn offset_keeps_explicit_position() {
        let mut doc = Document::new();
        let div = element(&mut doc, r#"<div style="position: absolute"></div>"#);
        let coords = Object::new().with("top", 1).with("left", 2);
        DomSetters
            .call_method(&mut doc, &[div], MethodAttribute::Offset, &coords.into())
            .unwrap();
        assert_eq!(
            doc.attribute(div, "style"),
            Some("position: absolute; top: 1px; left: 2px;")
        );
    }

    #[test]
    fn data_writes_prefixed_attributes() {
        let mut doc = Document::new();
        let div = element(&mut doc, r#"<div data-gone="1"></div>"#);
        let data = Object::new().with("userId", 7).with("gone", Value::Null);
        DomSetters
            .call_method(&mut doc, &[div], MethodAttribute::Data, &data.into())
            .unwrap();
        assert_eq!(doc.attribute(div, "data-user-id"), Some("7"));
        assert!(!doc.has_attribute(div, "data-gone"));
    }

    #[test]
    fn set_attr_skips_text_nodes_and_removes_on_null() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.set_inner_html(root, "<b title=x></b>text").unwrap();
        let nodes = doc.children(root).to_vec();
        DomSetters.set_attr(&mut doc, &nodes, "foo", &"bar".into()).unwrap();
        DomSetters.set_attr(&mut doc, &nodes, "title", &Value::Undefined).unwrap();
        assert_eq!(doc.outer_html(root), r#"<b foo="bar"></b>text"#);
    }

    #[test]
    fn invalid_attribute_name_is_an_error() {
        let mut doc = Document::new();
        let b = element(&mut doc, "<b></b>");
        let err = DomSetters.set_attr(&mut doc, &[b], "a b", &"x".into()).unwrap_err();
        assert!(matches!(err, DomError::InvalidAttributeName(_)), "got {err:?}");
    }
}
