//! Native selector engine for the host document: selector parsing, element matching and
//! `querySelectorAll`, plus the inline `style` declaration helpers.

pub mod matching;
pub mod syntax;

// Re-exports so other crates can just use `css::...` nicely.
pub use matching::{matches, matches_any, query_selector_all, select};
pub use syntax::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, Declaration, Selector,
    SelectorError, SelectorList, parse_declarations, parse_selector_list, serialize_declarations,
    set_declaration,
};
