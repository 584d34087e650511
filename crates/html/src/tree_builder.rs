//! Fragment tree construction beneath a context element.
//!
//! This models the parts of the HTML insertion modes that make markup parsing
//! context-sensitive, which is what callers of `set_inner_html` observe:
//! - Self-closing syntax is ignored on non-void elements (`<div/>` opens a `div`).
//! - Outside a table, table-structure tags are dropped (a `<tr>` parsed under a
//!   `div` vanishes and only its text survives).
//! - Inside a table, missing `tbody`/`tr`/`colgroup` wrappers are implied.
//! - A block-level start tag closes an open `p`.
//!
//! Known limitations:
//! - No foster parenting: stray text or non-table content inside a table is inserted
//!   where it appears.
//! - No adoption agency, no implied `html`/`head`/`body`.
//! - Unmatched end tags are ignored instead of synthesizing elements.
//!
//! The context element itself is never popped; content can only close elements it
//! opened.

use crate::document::{Document, ParseConfig};
use crate::types::{NodeData, NodeKey, Token, is_void_element};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum InsertionMode {
    InBody,
    InTable,
    InTableBody,
    InRow,
    InCell,
}

fn is_table_structure(name: &str) -> bool {
    matches!(
        name,
        "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
    )
}

fn closes_paragraph(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "div"
            | "dl"
            | "fieldset"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "table"
            | "ul"
    )
}

fn mode_for(name: &str) -> Option<InsertionMode> {
    match name {
        "table" => Some(InsertionMode::InTable),
        "tbody" | "thead" | "tfoot" => Some(InsertionMode::InTableBody),
        "tr" => Some(InsertionMode::InRow),
        "td" | "th" | "caption" => Some(InsertionMode::InCell),
        _ => None,
    }
}

/// Build nodes for `tokens` and append them under `context`.
pub(crate) fn build_fragment(doc: &mut Document, context: NodeKey, tokens: &[Token]) {
    let config = doc.config();
    let mut builder = FragmentTreeBuilder {
        doc,
        config,
        open: vec![context],
    };
    for token in tokens {
        builder.push_token(token);
    }
}

struct FragmentTreeBuilder<'d> {
    doc: &'d mut Document,
    config: ParseConfig,
    /// Stack of open elements; index 0 is the context and is never popped.
    open: Vec<NodeKey>,
}

impl FragmentTreeBuilder<'_> {
    fn push_token(&mut self, token: &Token) {
        match token {
            Token::Doctype(_) => {
                log::trace!(target: "html.tree_builder", "ignoring doctype in fragment");
            }
            Token::Comment(text) => {
                if self.config.keep_comments {
                    let node = self.doc.create_comment(text);
                    self.attach(node);
                }
            }
            Token::Text(text) => self.text(text),
            Token::StartTag {
                name, attributes, ..
            } => self.start_tag(name, attributes),
            Token::EndTag(name) => self.end_tag(name),
        }
    }

    fn current(&self) -> NodeKey {
        // `open` always holds the context.
        self.open[self.open.len() - 1]
    }

    fn name_at(&self, index: usize) -> &str {
        self.doc.tag_name(self.open[index]).unwrap_or("")
    }

    /// Index and mode of the innermost open table-related element, if any.
    fn innermost_table_element(&self) -> Option<(usize, InsertionMode)> {
        (0..self.open.len())
            .rev()
            .find_map(|i| mode_for(self.name_at(i)).map(|mode| (i, mode)))
    }

    fn mode(&self) -> InsertionMode {
        self.innermost_table_element()
            .map_or(InsertionMode::InBody, |(_, mode)| mode)
    }

    fn attach(&mut self, node: NodeKey) {
        let parent = self.current();
        if let Err(err) = self.doc.append_child(parent, node) {
            log::debug!(target: "html.tree_builder", "dropping node {node}: {err}");
        }
    }

    fn insert(&mut self, name: &str, attributes: &[(String, Option<String>)]) {
        let node = self
            .doc
            .create_element_with_attributes(name, attributes.to_vec());
        self.attach(node);
        if !is_void_element(name) {
            self.open.push(node);
        }
    }

    fn insert_implied(&mut self, name: &str) {
        log::trace!(target: "html.tree_builder", "implying <{name}>");
        self.insert(name, &[]);
    }

    /// Pop the innermost table-related element when it is one of `names` and was opened
    /// by this fragment. Returns whether anything was closed.
    fn close_innermost(&mut self, names: &[&str]) -> bool {
        match self.innermost_table_element() {
            Some((index, _)) if index > 0 && names.contains(&self.name_at(index)) => {
                self.open.truncate(index);
                true
            }
            _ => false,
        }
    }

    fn close_paragraph(&mut self) {
        for index in (1..self.open.len()).rev() {
            let name = self.name_at(index);
            if name == "p" {
                self.open.truncate(index);
                return;
            }
            if mode_for(name).is_some() || name == "button" {
                return;
            }
        }
    }

    fn ignore(&self, name: &str, mode: InsertionMode) {
        log::trace!(target: "html.tree_builder", "ignoring <{name}> in {mode:?}");
    }

    fn start_tag(&mut self, name: &str, attributes: &[(String, Option<String>)]) {
        let mode = self.mode();
        match mode {
            InsertionMode::InBody => {
                if is_table_structure(name) {
                    return self.ignore(name, mode);
                }
                if closes_paragraph(name) {
                    self.close_paragraph();
                }
                self.insert(name, attributes);
            }
            InsertionMode::InCell => {
                if is_table_structure(name) {
                    if self.close_innermost(&["td", "th", "caption"]) {
                        return self.start_tag(name, attributes);
                    }
                    return self.ignore(name, mode);
                }
                if closes_paragraph(name) {
                    self.close_paragraph();
                }
                self.insert(name, attributes);
            }
            InsertionMode::InTable => {
                if name != "col"
                    && self.open.len() > 1
                    && self.doc.tag_name(self.current()) == Some("colgroup")
                {
                    self.open.pop();
                    return self.start_tag(name, attributes);
                }
                match name {
                    "caption" | "colgroup" | "tbody" | "thead" | "tfoot" => {
                        self.insert(name, attributes)
                    }
                    "col" => {
                        if self.doc.tag_name(self.current()) != Some("colgroup") {
                            self.insert_implied("colgroup");
                        }
                        self.insert(name, attributes);
                    }
                    "tr" => {
                        self.insert_implied("tbody");
                        self.insert(name, attributes);
                    }
                    "td" | "th" => {
                        self.insert_implied("tbody");
                        self.insert_implied("tr");
                        self.insert(name, attributes);
                    }
                    "table" => self.ignore(name, mode),
                    _ => self.insert(name, attributes),
                }
            }
            InsertionMode::InTableBody => match name {
                "tr" => self.insert(name, attributes),
                "td" | "th" => {
                    self.insert_implied("tr");
                    self.insert(name, attributes);
                }
                _ if is_table_structure(name) => {
                    if self.close_innermost(&["tbody", "thead", "tfoot"]) {
                        return self.start_tag(name, attributes);
                    }
                    self.ignore(name, mode);
                }
                "table" => self.ignore(name, mode),
                _ => self.insert(name, attributes),
            },
            InsertionMode::InRow => match name {
                "td" | "th" => self.insert(name, attributes),
                _ if is_table_structure(name) => {
                    if self.close_innermost(&["tr"]) {
                        return self.start_tag(name, attributes);
                    }
                    self.ignore(name, mode);
                }
                "table" => self.ignore(name, mode),
                _ => self.insert(name, attributes),
            },
        }
    }

    fn end_tag(&mut self, name: &str) {
        match (1..self.open.len()).rev().find(|&i| self.name_at(i) == name) {
            Some(index) => self.open.truncate(index),
            None => {
                log::trace!(target: "html.tree_builder", "ignoring unmatched </{name}>");
            }
        }
    }

    fn text(&mut self, text: &str) {
        let parent = self.current();
        if self.config.coalesce_text {
            if let Some(last) = self.doc.last_child(parent) {
                if let Some(NodeData::Text(existing)) = self.doc.data(last) {
                    let merged = format!("{existing}{text}");
                    if let Err(err) = self.doc.set_text_content(last, &merged) {
                        log::debug!(target: "html.tree_builder", "cannot merge text: {err}");
                    }
                    return;
                }
            }
        }
        let node = self.doc.create_text(text);
        self.attach(node);
    }
}
