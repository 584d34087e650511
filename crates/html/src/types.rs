use std::fmt;

/// Opaque handle to a node owned by a [`crate::Document`].
///
/// Keys are allocated monotonically and never reused for the lifetime of the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attributes: Vec<(String, Option<String>)>,
        self_closing: bool,
    },
    EndTag(String),
    Comment(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element {
        name: String,
        attributes: Vec<(String, Option<String>)>,
    },
    Text(String),
    Comment(String),
}

impl NodeData {
    pub fn allows_children(&self) -> bool {
        matches!(self, NodeData::Document | NodeData::Element { .. })
    }

    pub fn element_name(&self) -> Option<&str> {
        match self {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// Elements that never have children and serialize without an end tag.
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

pub(crate) fn is_rawtext_element(name: &str) -> bool {
    name == "script" || name == "style"
}
