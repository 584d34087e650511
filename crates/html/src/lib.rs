//! Host document model: tokenizer, arena DOM, fragment tree builder and serializer.
//!
//! Everything here stands in for the platform document that a query layer operates on:
//! nodes are addressed by [`NodeKey`] handles, markup is parsed through
//! [`Document::set_inner_html`] with the target element as parsing context, and the
//! document tracks a [`ReadyState`] plus the callbacks waiting on it.

mod document;
mod entities;
mod serialize;
mod tokenizer;
mod tree_builder;
mod types;

pub use crate::document::{
    Descendants, DomError, Document, ParseConfig, ReadyCallback, ReadyState,
};
pub use crate::tokenizer::{Tokenizer, tokenize};
pub use crate::types::{NodeData, NodeKey, Token, is_void_element};
