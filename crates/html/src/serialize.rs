//! Markup serialization for `inner_html` / `outer_html`.
//!
//! Output rules:
//! - Attributes keep their stored order; valueless attributes serialize as `name=""`.
//! - Void elements have no end tag.
//! - Children of `script`/`style` are emitted raw.
//! - The document node serializes as the concatenation of its children.

use crate::document::Document;
use crate::entities::{escape_attribute, escape_text};
use crate::types::{NodeData, NodeKey, is_rawtext_element, is_void_element};

pub(crate) fn outer_html(doc: &Document, key: NodeKey) -> String {
    let mut out = String::new();
    write_node(doc, key, false, &mut out);
    out
}

pub(crate) fn inner_html(doc: &Document, key: NodeKey) -> String {
    let mut out = String::new();
    let raw = doc.tag_name(key).is_some_and(is_rawtext_element);
    for child in doc.children(key) {
        write_node(doc, *child, raw, &mut out);
    }
    out
}

fn write_node(doc: &Document, key: NodeKey, raw_text: bool, out: &mut String) {
    match doc.data(key) {
        Some(NodeData::Document) => {
            for child in doc.children(key) {
                write_node(doc, *child, false, out);
            }
        }
        Some(NodeData::Element { name, attributes }) => {
            out.push('<');
            out.push_str(name);
            for (attr, value) in attributes {
                out.push(' ');
                out.push_str(attr);
                out.push_str("=\"");
                escape_attribute(value.as_deref().unwrap_or(""), out);
                out.push('"');
            }
            out.push('>');
            if is_void_element(name) {
                return;
            }
            let raw = is_rawtext_element(name);
            for child in doc.children(key) {
                write_node(doc, *child, raw, out);
            }
            out.push_str("</");
            out.push_str(name);
            out.push('>');
        }
        Some(NodeData::Text(text)) => {
            if raw_text {
                out.push_str(text);
            } else {
                escape_text(text, out);
            }
        }
        Some(NodeData::Comment(text)) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        None => {}
    }
}
