#![no_main]

use html::Document;
use libfuzzer_sys::fuzz_target;

const CONTEXTS: [&str; 5] = ["div", "table", "tbody", "tr", "td"];

// Parsing under any context keeps parent/child links symmetric.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(markup) = std::str::from_utf8(rest) else {
        return;
    };
    let mut doc = Document::new();
    let context = doc.create_element(CONTEXTS[usize::from(selector) % CONTEXTS.len()]);
    if doc.set_inner_html(context, markup).is_err() {
        return;
    }
    for node in doc.descendants(context) {
        let parent = doc.parent(node).expect("descendant without parent");
        assert!(doc.children(parent).contains(&node));
    }
    let _ = doc.inner_html(context);
});
