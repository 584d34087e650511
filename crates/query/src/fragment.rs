//! Markup to detached nodes.
//!
//! Markup is parsed inside a template element chosen by its leading tag, so that table
//! parts survive parsing: a `<tr>` is parsed inside a `tbody`, cells inside a `tr`,
//! table sections inside a `table`, and everything else inside a `div`. Templates live
//! detached in the document and are emptied again before a build returns.

use std::ops::ControlFlow;

use html::{Document, NodeKey};

use crate::each::each;
use crate::markup::{expand_self_closing, match_single_tag, sniff_fragment};
use crate::predicates::is_plain_object;
use crate::setters::{MethodAttribute, PropertySetters};
use crate::value::Value;

pub const WILDCARD: &str = "*";

/// Template elements used as parsing context, one per distinct table entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextTable {
    tbody: NodeKey,
    table: NodeKey,
    row: NodeKey,
    div: NodeKey,
}

impl ContextTable {
    pub const KEYS: [&'static str; 7] = ["tr", "tbody", "thead", "tfoot", "td", "th", WILDCARD];

    pub fn new(doc: &mut Document) -> Self {
        ContextTable {
            tbody: doc.create_element("tbody"),
            table: doc.create_element("table"),
            row: doc.create_element("tr"),
            div: doc.create_element("div"),
        }
    }

    /// Exact, case-sensitive key lookup.
    pub fn contains_key(name: &str) -> bool {
        Self::KEYS.contains(&name)
    }

    /// Template for `name`; anything outside the table gets the wildcard template.
    pub fn container(&self, name: &str) -> NodeKey {
        match name {
            "tr" => self.tbody,
            "tbody" | "thead" | "tfoot" => self.table,
            "td" | "th" => self.row,
            _ => self.div,
        }
    }

    pub fn templates(&self) -> [NodeKey; 4] {
        [self.tbody, self.table, self.row, self.div]
    }
}

#[derive(Clone, Debug)]
pub struct FragmentBuilder {
    containers: ContextTable,
}

impl FragmentBuilder {
    pub fn new(doc: &mut Document) -> Self {
        FragmentBuilder {
            containers: ContextTable::new(doc),
        }
    }

    pub fn context_table(&self) -> &ContextTable {
        &self.containers
    }

    /// Parse `markup` into detached nodes.
    ///
    /// `name` overrides the sniffed leading tag when choosing the parsing context. When
    /// `properties` is a plain object its entries are applied to the produced nodes,
    /// named accessors through `setters.call_method` and every other key as an attribute.
    pub fn build<S: PropertySetters + ?Sized>(
        &self,
        doc: &mut Document,
        setters: &S,
        markup: &str,
        name: Option<&str>,
        properties: Option<&Value>,
    ) -> Vec<NodeKey> {
        let nodes = match match_single_tag(markup) {
            Some(tag) => {
                log::trace!(target: "query.fragment", "single tag fast path: <{}>", tag.name);
                vec![doc.create_element(tag.name)]
            }
            None => self.parse_in_context(doc, markup, name),
        };
        if let Some(properties) = properties.filter(|p| is_plain_object(p)) {
            apply_properties(doc, setters, &nodes, properties);
        }
        nodes
    }

    fn parse_in_context(&self, doc: &mut Document, markup: &str, name: Option<&str>) -> Vec<NodeKey> {
        let markup = expand_self_closing(markup);
        let name = name
            .or_else(|| sniff_fragment(&markup).map(|start| start.name))
            .filter(|name| ContextTable::contains_key(name))
            .unwrap_or(WILDCARD);
        let container = self.containers.container(name);
        log::trace!(
            target: "query.fragment",
            "parsing {} byte(s) in <{}> context",
            markup.len(),
            doc.tag_name(container).unwrap_or(WILDCARD)
        );
        if let Err(err) = doc.set_inner_html(container, &markup) {
            log::warn!(target: "query.fragment", "template {container} rejected markup: {err}");
            return Vec::new();
        }
        // Detaching every child leaves the template empty for the next build.
        match doc.remove_children(container) {
            Ok(nodes) => nodes,
            Err(err) => {
                log::warn!(target: "query.fragment", "failed to drain template {container}: {err}");
                Vec::new()
            }
        }
    }
}

fn apply_properties<S: PropertySetters + ?Sized>(
    doc: &mut Document,
    setters: &S,
    nodes: &[NodeKey],
    properties: &Value,
) {
    each(properties, |key, value| {
        let key = key.to_key_string();
        let result = match MethodAttribute::from_key(&key) {
            Some(method) => setters.call_method(doc, nodes, method, value),
            None => setters.set_attr(doc, nodes, &key, value),
        };
        if let Err(err) = result {
            log::warn!(target: "query.fragment", "property {key:?} not applied: {err}");
        }
        ControlFlow::Continue(())
    });
}
