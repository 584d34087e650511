//! Selector resolution and fragment construction over the host document.
//!
//! [`Query::resolve`] takes any [`Value`] (selector text, markup, nodes, arrays, an
//! existing [`Collection`] or a ready handler) and normalises it into a [`Collection`].
//! Markup goes through the [`FragmentBuilder`], selector text through the host's
//! [`NativeQuery`]; the remaining modules are the helpers both paths are built on.

mod classify;
mod collection;
mod each;
mod fragment;
mod host;
mod markup;
mod predicates;
mod resolver;
mod setters;
mod value;

pub use crate::classify::{CLASS_NAMES, TypeTag, classify};
pub use crate::collection::Collection;
pub use crate::each::{EachKey, each, each_mut};
pub use crate::fragment::{ContextTable, FragmentBuilder, WILDCARD};
pub use crate::host::{CssQuery, NativeQuery};
pub use crate::markup::{
    FragmentStart, SingleTag, VOID_PREFIXES, expand_self_closing, match_single_tag,
    sniff_fragment,
};
pub use crate::predicates::{
    compact, is_array, is_collection, is_function, is_object, is_plain_object, is_window,
    like_array,
};
pub use crate::resolver::Query;
pub use crate::setters::{DomSetters, MethodAttribute, PropertySetters, dasherize};
pub use crate::value::{Callback, Object, ObjectKind, Value};
