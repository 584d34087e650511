//! Arena-backed mutable document.
//!
//! Invariants:
//! - Node keys index the arena directly and are never reused; detached nodes stay
//!   allocated and can be re-attached.
//! - A node has at most one parent, and parent/children links are always symmetric.
//! - Operations never create cycles.
//! - Element and attribute names are stored ASCII-lowercase.

use crate::serialize;
use crate::tokenizer::tokenize;
use crate::tree_builder::build_fragment;
use crate::types::{NodeData, NodeKey};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseConfig {
    /// Merge adjacent text nodes produced by one parse.
    pub coalesce_text: bool,
    /// Keep comment tokens as comment nodes instead of dropping them.
    pub keep_comments: bool,
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            coalesce_text: true,
            keep_comments: true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    pub fn is_ready(self) -> bool {
        self != ReadyState::Loading
    }
}

pub type ReadyCallback = Box<dyn FnOnce(&mut Document)>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    MissingNode(NodeKey),
    InvalidParent(NodeKey),
    CycleDetected { parent: NodeKey, child: NodeKey },
    NotAnElement(NodeKey),
    InvalidAttributeName(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::MissingNode(key) => write!(f, "no node with key {key}"),
            DomError::InvalidParent(key) => write!(f, "node {key} cannot have children"),
            DomError::CycleDetected { parent, child } => {
                write!(f, "inserting {child} under {parent} would create a cycle")
            }
            DomError::NotAnElement(key) => write!(f, "node {key} is not an element"),
            DomError::InvalidAttributeName(name) => {
                write!(f, "invalid attribute name: {name:?}")
            }
        }
    }
}

impl std::error::Error for DomError {}

#[derive(Debug)]
struct NodeRecord {
    data: NodeData,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
}

pub struct Document {
    nodes: Vec<NodeRecord>,
    config: ParseConfig,
    ready_state: ReadyState,
    ready_callbacks: Vec<ReadyCallback>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("config", &self.config)
            .field("ready_state", &self.ready_state)
            .field("ready_callbacks", &self.ready_callbacks.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    const ROOT: NodeKey = NodeKey(0);

    pub fn new() -> Self {
        Self::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> Self {
        Self {
            nodes: vec![NodeRecord {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            }],
            config,
            ready_state: ReadyState::Loading,
            ready_callbacks: Vec::new(),
        }
    }

    /// Parse a whole document. The result is still `Loading`; the embedder decides
    /// when it becomes ready.
    pub fn parse(html: &str) -> Self {
        Self::parse_with_config(html, ParseConfig::default())
    }

    pub fn parse_with_config(html: &str, config: ParseConfig) -> Self {
        let mut doc = Self::with_config(config);
        let tokens = tokenize(html);
        build_fragment(&mut doc, Self::ROOT, &tokens);
        doc
    }

    pub fn config(&self) -> ParseConfig {
        self.config
    }

    pub fn root(&self) -> NodeKey {
        Self::ROOT
    }

    /// Number of allocated nodes, attached or not, including the document node.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn record(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        self.nodes
            .get(key.0 as usize)
            .ok_or(DomError::MissingNode(key))
    }

    fn record_mut(&mut self, key: NodeKey) -> Result<&mut NodeRecord, DomError> {
        self.nodes
            .get_mut(key.0 as usize)
            .ok_or(DomError::MissingNode(key))
    }

    fn push(&mut self, data: NodeData) -> NodeKey {
        let key = NodeKey(self.nodes.len() as u32);
        self.nodes.push(NodeRecord {
            data,
            parent: None,
            children: Vec::new(),
        });
        key
    }

    pub fn contains_key(&self, key: NodeKey) -> bool {
        (key.0 as usize) < self.nodes.len()
    }

    pub fn create_element(&mut self, name: &str) -> NodeKey {
        self.push(NodeData::Element {
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub(crate) fn create_element_with_attributes(
        &mut self,
        name: &str,
        attributes: Vec<(String, Option<String>)>,
    ) -> NodeKey {
        self.push(NodeData::Element {
            name: name.to_ascii_lowercase(),
            attributes,
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.push(NodeData::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeKey {
        self.push(NodeData::Comment(text.to_string()))
    }

    pub fn data(&self, key: NodeKey) -> Option<&NodeData> {
        self.record(key).ok().map(|record| &record.data)
    }

    pub fn tag_name(&self, key: NodeKey) -> Option<&str> {
        self.data(key).and_then(NodeData::element_name)
    }

    pub fn is_element(&self, key: NodeKey) -> bool {
        self.tag_name(key).is_some()
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.record(key).ok().and_then(|record| record.parent)
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.record(key)
            .map(|record| record.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn first_child(&self, key: NodeKey) -> Option<NodeKey> {
        self.children(key).first().copied()
    }

    pub fn last_child(&self, key: NodeKey) -> Option<NodeKey> {
        self.children(key).last().copied()
    }

    pub fn previous_sibling(&self, key: NodeKey) -> Option<NodeKey> {
        let parent = self.parent(key)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|k| *k == key)?;
        pos.checked_sub(1).map(|prev| siblings[prev])
    }

    /// Element siblings before `key`, nearest first.
    pub fn preceding_element_siblings(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        let siblings = self.parent(key).map_or(&[][..], |parent| self.children(parent));
        let pos = siblings.iter().position(|k| *k == key).unwrap_or(0);
        siblings[..pos]
            .iter()
            .rev()
            .copied()
            .filter(|k| self.is_element(*k))
    }

    /// `ancestor` is `node` or one of its ancestors.
    pub fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.parent(key);
        }
        false
    }

    /// Pre-order traversal of the subtree below `key`, excluding `key` itself.
    pub fn descendants(&self, key: NodeKey) -> Descendants<'_> {
        let mut stack: Vec<NodeKey> = self.children(key).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.check_insertion(parent, child)?;
        self.detach(child)?;
        self.record_mut(parent)?.children.push(child);
        self.record_mut(child)?.parent = Some(parent);
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        reference: NodeKey,
    ) -> Result<(), DomError> {
        if self.parent(reference) != Some(parent) {
            return Err(DomError::MissingNode(reference));
        }
        self.check_insertion(parent, child)?;
        self.detach(child)?;
        let siblings = &mut self.record_mut(parent)?.children;
        let pos = siblings
            .iter()
            .position(|k| *k == reference)
            .ok_or(DomError::MissingNode(reference))?;
        siblings.insert(pos, child);
        self.record_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn check_insertion(&self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        if !self.record(parent)?.data.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if child == Self::ROOT {
            return Err(DomError::InvalidParent(parent));
        }
        self.record(child)?;
        if self.contains(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        if self.parent(child) != Some(parent) {
            return Err(DomError::MissingNode(child));
        }
        self.detach(child)
    }

    /// Unlink `key` from its parent; a no-op for nodes that are already detached.
    pub fn detach(&mut self, key: NodeKey) -> Result<(), DomError> {
        let Some(parent) = self.record_mut(key)?.parent.take() else {
            return Ok(());
        };
        self.record_mut(parent)?.children.retain(|k| *k != key);
        Ok(())
    }

    pub fn remove_children(&mut self, key: NodeKey) -> Result<Vec<NodeKey>, DomError> {
        let children = std::mem::take(&mut self.record_mut(key)?.children);
        for child in &children {
            self.record_mut(*child)?.parent = None;
        }
        Ok(children)
    }

    pub fn attributes(&self, key: NodeKey) -> &[(String, Option<String>)] {
        match self.data(key) {
            Some(NodeData::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    /// Attribute value; valueless attributes read as the empty string.
    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.attributes(key)
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    pub fn has_attribute(&self, key: NodeKey, name: &str) -> bool {
        self.attribute(key, name).is_some()
    }

    fn element_attributes_mut(
        &mut self,
        key: NodeKey,
    ) -> Result<&mut Vec<(String, Option<String>)>, DomError> {
        match &mut self.record_mut(key)?.data {
            NodeData::Element { attributes, .. } => Ok(attributes),
            _ => Err(DomError::NotAnElement(key)),
        }
    }

    pub fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), DomError> {
        if !is_valid_attribute_name(name) {
            return Err(DomError::InvalidAttributeName(name.to_string()));
        }
        let name = name.to_ascii_lowercase();
        let attributes = self.element_attributes_mut(key)?;
        match attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = Some(value.to_string()),
            None => attributes.push((name, Some(value.to_string()))),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<(), DomError> {
        self.element_attributes_mut(key)?
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        Ok(())
    }

    pub fn text_content(&self, key: NodeKey) -> String {
        match self.data(key) {
            Some(NodeData::Text(text) | NodeData::Comment(text)) => text.clone(),
            Some(_) => {
                let mut out = String::new();
                for node in self.descendants(key) {
                    if let Some(NodeData::Text(text)) = self.data(node) {
                        out.push_str(text);
                    }
                }
                out
            }
            None => String::new(),
        }
    }

    pub fn set_text_content(&mut self, key: NodeKey, text: &str) -> Result<(), DomError> {
        match &mut self.record_mut(key)?.data {
            NodeData::Text(existing) | NodeData::Comment(existing) => {
                existing.clear();
                existing.push_str(text);
                return Ok(());
            }
            NodeData::Document | NodeData::Element { .. } => {}
        }
        self.remove_children(key)?;
        if !text.is_empty() {
            let child = self.create_text(text);
            self.append_child(key, child)?;
        }
        Ok(())
    }

    /// Replace the children of `key` with the nodes parsed from `markup`, using `key`'s
    /// element name as the parsing context.
    pub fn set_inner_html(&mut self, key: NodeKey, markup: &str) -> Result<(), DomError> {
        if !self.record(key)?.data.allows_children() {
            return Err(DomError::InvalidParent(key));
        }
        self.remove_children(key)?;
        let tokens = tokenize(markup);
        build_fragment(self, key, &tokens);
        Ok(())
    }

    pub fn inner_html(&self, key: NodeKey) -> String {
        serialize::inner_html(self, key)
    }

    pub fn outer_html(&self, key: NodeKey) -> String {
        serialize::outer_html(self, key)
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    /// Run `callback` once the document is ready; immediately if it already is.
    pub fn on_ready(&mut self, callback: ReadyCallback) {
        if self.ready_state.is_ready() {
            callback(self);
        } else {
            self.ready_callbacks.push(callback);
        }
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        log::trace!(target: "html.document", "ready state {:?} -> {:?}", self.ready_state, state);
        self.ready_state = state;
        if !state.is_ready() {
            return;
        }
        for callback in std::mem::take(&mut self.ready_callbacks) {
            callback(self);
        }
    }

    pub fn pending_ready_callbacks(&self) -> usize {
        self.ready_callbacks.len()
    }
}

pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeKey>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<NodeKey> {
        let key = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(key).iter().rev().copied());
        Some(key)
    }
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().any(|c| {
            c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '=' | '<')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn append_child_moves_nodes_between_parents() {
        let mut doc = Document::new();
        let a = doc.create_element("A");
        let b = doc.create_element("b");
        let t = doc.create_text("x");
        doc.append_child(a, t).unwrap();
        doc.append_child(b, t).unwrap();
        assert_eq!(doc.children(a), &[] as &[NodeKey]);
        assert_eq!(doc.children(b), &[t]);
        assert_eq!(doc.parent(t), Some(b));
        assert_eq!(doc.tag_name(a), Some("a"));
    }

    #[test]
    fn append_child_rejects_cycles_and_leaf_parents() {
        let mut doc = Document::new();
        let outer = doc.create_element("div");
        let inner = doc.create_element("span");
        let text = doc.create_text("t");
        doc.append_child(outer, inner).unwrap();
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::CycleDetected {
                parent: inner,
                child: outer
            })
        );
        assert_eq!(
            doc.append_child(text, inner),
            Err(DomError::InvalidParent(text))
        );
        assert_eq!(
            doc.append_child(outer, NodeKey(999)),
            Err(DomError::MissingNode(NodeKey(999)))
        );
    }

    #[test]
    fn insert_before_places_child_ahead_of_reference() {
        let mut doc = Document::new();
        let list = doc.create_element("ul");
        let first = doc.create_element("li");
        let second = doc.create_element("li");
        doc.append_child(list, second).unwrap();
        doc.insert_before(list, first, second).unwrap();
        assert_eq!(doc.children(list), &[first, second]);
        assert_eq!(doc.previous_sibling(second), Some(first));
    }

    #[test]
    fn detach_leaves_node_reusable() {
        let mut doc = Document::new();
        let parent = doc.create_element("div");
        let child = doc.create_element("p");
        doc.append_child(parent, child).unwrap();
        doc.detach(child).unwrap();
        assert_eq!(doc.parent(child), None);
        assert!(doc.children(parent).is_empty());
        doc.detach(child).unwrap();
        doc.append_child(doc.root(), child).unwrap();
        assert_eq!(doc.parent(child), Some(doc.root()));
    }

    #[test]
    fn attributes_are_case_insensitive_and_validated() {
        let mut doc = Document::new();
        let el = doc.create_element("div");
        doc.set_attribute(el, "Data-X", "1").unwrap();
        doc.set_attribute(el, "data-x", "2").unwrap();
        assert_eq!(doc.attribute(el, "DATA-X"), Some("2"));
        assert_eq!(doc.attributes(el).len(), 1);
        assert_eq!(
            doc.set_attribute(el, "bad name", "v"),
            Err(DomError::InvalidAttributeName("bad name".to_string()))
        );
        doc.remove_attribute(el, "data-x").unwrap();
        assert!(!doc.has_attribute(el, "data-x"));

        let text = doc.create_text("t");
        assert_eq!(
            doc.set_attribute(text, "id", "x"),
            Err(DomError::NotAnElement(text))
        );
    }

    #[test]
    fn text_content_round_trips() {
        let mut doc = Document::parse("<div>a<b>b</b>c</div>");
        let div = doc.first_child(doc.root()).unwrap();
        assert_eq!(doc.text_content(div), "abc");
        doc.set_text_content(div, "<x>").unwrap();
        assert_eq!(doc.children(div).len(), 1);
        assert_eq!(doc.inner_html(div), "&lt;x&gt;");
    }

    #[test]
    fn descendants_are_in_document_order() {
        let doc = Document::parse("<div><p>a</p><p>b<i></i></p></div><span></span>");
        let names: Vec<String> = doc
            .descendants(doc.root())
            .map(|k| match doc.data(k) {
                Some(NodeData::Element { name, .. }) => name.clone(),
                Some(NodeData::Text(t)) => format!("#{t}"),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(names, ["div", "p", "#a", "p", "#b", "i", "span"]);
    }

    #[test]
    fn set_inner_html_replaces_children() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        doc.set_inner_html(div, "<p>one</p>").unwrap();
        let old = doc.first_child(div).unwrap();
        doc.set_inner_html(div, "<span>two</span>").unwrap();
        assert_eq!(doc.parent(old), None);
        assert_eq!(doc.inner_html(div), "<span>two</span>");
    }

    #[test]
    fn ready_callbacks_run_once_on_transition() {
        let mut doc = Document::new();
        let calls = Rc::new(RefCell::new(Vec::new()));
        for i in 0..2 {
            let calls = Rc::clone(&calls);
            doc.on_ready(Box::new(move |_| calls.borrow_mut().push(i)));
        }
        assert_eq!(doc.pending_ready_callbacks(), 2);
        assert!(calls.borrow().is_empty());

        doc.set_ready_state(ReadyState::Interactive);
        doc.set_ready_state(ReadyState::Complete);
        assert_eq!(*calls.borrow(), vec![0, 1]);

        let late = Rc::clone(&calls);
        doc.on_ready(Box::new(move |_| late.borrow_mut().push(2)));
        assert_eq!(*calls.borrow(), vec![0, 1, 2]);
    }
}
