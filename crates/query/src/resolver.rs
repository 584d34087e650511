//! Input classification and dispatch.
//!
//! [`Query::resolve`] accepts any [`Value`] and always produces a [`Collection`]:
//!
//! | input                    | result                                            |
//! |--------------------------|---------------------------------------------------|
//! | falsy                    | empty collection                                  |
//! | markup string            | fragment nodes, context used as property bag      |
//! | other string             | native query, scoped to the context when given    |
//! | function                 | registered as ready handler, wraps the document   |
//! | collection               | the same instance                                 |
//! | array                    | its node entries, nullish and non-node dropped    |
//! | node                     | a one-node collection                             |
//! | other object / window    | empty collection                                  |
//! | other scalar             | its display string, queried like a string         |
//!
//! Malformed input never fails; it resolves to whatever the host produces, which is
//! usually an empty collection.

use std::rc::Rc;

use html::{Document, NodeKey};

use crate::collection::Collection;
use crate::fragment::FragmentBuilder;
use crate::host::{CssQuery, NativeQuery};
use crate::markup::sniff_fragment;
use crate::setters::{DomSetters, PropertySetters};
use crate::value::{Callback, Value};

pub struct Query<S = DomSetters, E = CssQuery> {
    document: Document,
    fragments: FragmentBuilder,
    setters: S,
    engine: E,
}

impl Query {
    pub fn new(document: Document) -> Self {
        Self::with_parts(document, DomSetters, CssQuery)
    }
}

impl<S: PropertySetters, E: NativeQuery> Query<S, E> {
    pub fn with_parts(mut document: Document, setters: S, engine: E) -> Self {
        let fragments = FragmentBuilder::new(&mut document);
        Query {
            document,
            fragments,
            setters,
            engine,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn setters(&self) -> &S {
        &self.setters
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn fragment_builder(&self) -> &FragmentBuilder {
        &self.fragments
    }

    pub fn resolve(&mut self, selector: impl Into<Value>, context: Option<&Value>) -> Rc<Collection> {
        let selector = selector.into();
        if !selector.is_truthy() {
            log::trace!(target: "query.resolve", "falsy selector {selector:?}: empty");
            return Rc::new(Collection::empty());
        }
        match selector {
            Value::String(text) => self.resolve_str(&text, context),
            Value::Function(callback) => self.ready(callback),
            Value::Collection(collection) => collection,
            Value::Array(items) => {
                let nodes: Vec<NodeKey> = items
                    .iter()
                    .filter(|item| !item.is_nullish())
                    .filter_map(|item| {
                        let node = item.as_node();
                        if node.is_none() {
                            log::debug!(target: "query.resolve", "dropping non-node entry {item:?}");
                        }
                        node
                    })
                    .collect();
                log::trace!(
                    target: "query.resolve",
                    "array of {}: {} node(s)",
                    items.len(),
                    nodes.len()
                );
                Rc::new(Collection::new(nodes, ""))
            }
            Value::Node(node) => Rc::new(Collection::new([node], "")),
            Value::Object(_) | Value::Window => {
                log::debug!(target: "query.resolve", "{selector:?} is not a node: empty");
                Rc::new(Collection::empty())
            }
            scalar => {
                let text = scalar.to_display_string();
                self.query(&text, context)
            }
        }
    }

    /// Resolve a selector or markup string without a context.
    pub fn select(&mut self, selector: &str) -> Rc<Collection> {
        self.resolve(selector, None)
    }

    /// Build detached nodes from `markup`; see [`FragmentBuilder::build`].
    pub fn fragment(
        &mut self,
        markup: &str,
        name: Option<&str>,
        properties: Option<&Value>,
    ) -> Vec<NodeKey> {
        self.fragments
            .build(&mut self.document, &self.setters, markup, name, properties)
    }

    /// Native query below each node of `collection`, concatenated in collection order.
    pub fn find(&self, collection: &Collection, selector: &str) -> Rc<Collection> {
        let mut nodes = Vec::new();
        for scope in collection {
            match self.engine.query_all(&self.document, scope, selector) {
                Ok(found) => nodes.extend(found),
                Err(err) => {
                    log::debug!(target: "query.resolve", "query {selector:?} failed: {err}");
                    return Rc::new(Collection::new([], selector));
                }
            }
        }
        Rc::new(Collection::new(nodes, selector))
    }

    /// Run `callback` once the document is ready (right away if it already is).
    pub fn ready(&mut self, callback: Callback) -> Rc<Collection> {
        log::trace!(
            target: "query.resolve",
            "ready handler registered in state {:?}",
            self.document.ready_state()
        );
        self.document.on_ready(Box::new(move |doc| callback.call(doc)));
        Rc::new(Collection::new([self.document.root()], ""))
    }

    fn resolve_str(&mut self, text: &str, context: Option<&Value>) -> Rc<Collection> {
        // Byte order marks count as whitespace around markup.
        let text = text.trim_matches(|c: char| c.is_whitespace() || c == '\u{FEFF}');
        if text.starts_with('<') {
            if let Some(start) = sniff_fragment(text) {
                let name = start.name.to_string();
                let nodes = self.fragment(text, Some(&name), context);
                log::trace!(
                    target: "query.resolve",
                    "markup with leading <{name}>: {} node(s)",
                    nodes.len()
                );
                return Rc::new(Collection::new(nodes, ""));
            }
        }
        if text.is_empty() {
            return Rc::new(Collection::empty());
        }
        self.query(text, context)
    }

    fn query(&mut self, selector: &str, context: Option<&Value>) -> Rc<Collection> {
        match context {
            None | Some(Value::Undefined) => {
                let root = Collection::new([self.document.root()], "");
                self.find(&root, selector)
            }
            Some(context) => {
                let scope = self.resolve(context.clone(), None);
                log::trace!(
                    target: "query.resolve",
                    "{selector:?} scoped to {} node(s)",
                    scope.len()
                );
                self.find(&scope, selector)
            }
        }
    }
}

impl<S, E> std::fmt::Debug for Query<S, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("document", &self.document)
            .field("fragments", &self.fragments)
            .finish_non_exhaustive()
    }
}
