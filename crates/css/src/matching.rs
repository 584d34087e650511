use html::{Document, NodeKey};

use crate::syntax::{
    AttrOperator, Combinator, ComplexSelector, CompoundSelector, Selector, SelectorError,
    SelectorList, parse_selector_list,
};

// Check if an element matches one simple selector
fn matches_simple(doc: &Document, element: NodeKey, selector: &Selector) -> bool {
    match selector {
        Selector::Universal => true,
        Selector::Type(t) => doc
            .tag_name(element)
            .is_some_and(|name| name.eq_ignore_ascii_case(t)),
        Selector::Id(want) => doc.attribute(element, "id") == Some(want.as_str()),
        Selector::Class(want) => doc
            .attribute(element, "class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == want)),
        Selector::Attribute { name, matcher } => {
            let Some(actual) = doc.attribute(element, name) else {
                return false;
            };
            let Some((op, want)) = matcher else {
                return true;
            };
            let want = want.as_str();
            match op {
                AttrOperator::Equals => actual == want,
                AttrOperator::Includes => {
                    !want.is_empty() && actual.split_whitespace().any(|w| w == want)
                }
                AttrOperator::DashMatch => {
                    actual == want
                        || actual
                            .strip_prefix(want)
                            .is_some_and(|rest| rest.starts_with('-'))
                }
                AttrOperator::Prefix => !want.is_empty() && actual.starts_with(want),
                AttrOperator::Suffix => !want.is_empty() && actual.ends_with(want),
                AttrOperator::Substring => !want.is_empty() && actual.contains(want),
            }
        }
    }
}

fn matches_compound(doc: &Document, element: NodeKey, compound: &CompoundSelector) -> bool {
    doc.is_element(element) && compound.parts.iter().all(|s| matches_simple(doc, element, s))
}

fn parent_element(doc: &Document, key: NodeKey) -> Option<NodeKey> {
    doc.parent(key).filter(|p| doc.is_element(*p))
}

// Right-to-left: `index` is the compound that `element` has to satisfy.
fn matches_from(doc: &Document, element: NodeKey, selector: &ComplexSelector, index: usize) -> bool {
    if !matches_compound(doc, element, &selector.compounds[index]) {
        return false;
    }
    if index == 0 {
        return true;
    }
    let next = index - 1;
    match selector.combinators[next] {
        Combinator::Child => {
            parent_element(doc, element).is_some_and(|p| matches_from(doc, p, selector, next))
        }
        Combinator::Descendant => {
            let mut current = parent_element(doc, element);
            while let Some(ancestor) = current {
                if matches_from(doc, ancestor, selector, next) {
                    return true;
                }
                current = parent_element(doc, ancestor);
            }
            false
        }
        Combinator::NextSibling => doc
            .preceding_element_siblings(element)
            .next()
            .is_some_and(|s| matches_from(doc, s, selector, next)),
        Combinator::SubsequentSibling => doc
            .preceding_element_siblings(element)
            .any(|s| matches_from(doc, s, selector, next)),
    }
}

/// Does `element` match `selector`? Ancestors are not limited to any scope, the same as
/// `Element.matches` on a platform document.
pub fn matches(doc: &Document, element: NodeKey, selector: &ComplexSelector) -> bool {
    match selector.compounds.len() {
        0 => false,
        n => matches_from(doc, element, selector, n - 1),
    }
}

pub fn matches_any(doc: &Document, element: NodeKey, list: &SelectorList) -> bool {
    list.selectors.iter().any(|s| matches(doc, element, s))
}

/// Elements below `scope` (excluding `scope`) matching any selector in `list`, in document
/// order and without duplicates.
pub fn select(doc: &Document, scope: NodeKey, list: &SelectorList) -> Vec<NodeKey> {
    doc.descendants(scope)
        .filter(|key| matches_any(doc, *key, list))
        .collect()
}

/// `querySelectorAll` over the host document: parse `selector`, then [`select`].
pub fn query_selector_all(
    doc: &Document,
    scope: NodeKey,
    selector: &str,
) -> Result<Vec<NodeKey>, SelectorError> {
    let list = parse_selector_list(selector).inspect_err(|err| {
        log::debug!(target: "css.selector", "rejected selector {selector:?}: {err}");
    })?;
    let found = select(doc, scope, &list);
    log::trace!(
        target: "css.selector",
        "{selector:?} under {scope}: {} match(es)",
        found.len()
    );
    Ok(found)
}
