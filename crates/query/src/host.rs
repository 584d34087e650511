//! The host's native query mechanism, behind a trait so the resolver never matches
//! selectors itself.

use html::{Document, NodeKey};

pub trait NativeQuery {
    type Error: std::error::Error;

    /// Elements below `scope` matching `selector`, in document order.
    fn query_all(
        &self,
        doc: &Document,
        scope: NodeKey,
        selector: &str,
    ) -> Result<Vec<NodeKey>, Self::Error>;
}

/// `querySelectorAll` from the `css` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct CssQuery;

impl NativeQuery for CssQuery {
    type Error = css::SelectorError;

    fn query_all(
        &self,
        doc: &Document,
        scope: NodeKey,
        selector: &str,
    ) -> Result<Vec<NodeKey>, Self::Error> {
        css::query_selector_all(doc, scope, selector)
    }
}
