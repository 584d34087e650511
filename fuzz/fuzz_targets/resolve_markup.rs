#![no_main]

use html::Document;
use libfuzzer_sys::fuzz_target;
use query::Query;

// First line is the host document, the rest is resolved against it (as markup or as a
// selector). Resolution must never panic, collections must only hold live nodes, and
// every fragment template has to be empty afterwards.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let (page, input) = text.split_once('\n').unwrap_or((text, text));
    let mut q = Query::new(Document::parse(page));
    let collection = q.select(input);
    for node in collection.iter() {
        assert!(q.document().contains_key(node), "dangling node {node}");
    }
    for template in q.fragment_builder().context_table().templates() {
        assert!(q.document().children(template).is_empty(), "template {template} not drained");
    }
    let again = q.resolve(collection.clone(), None);
    assert!(std::rc::Rc::ptr_eq(&collection, &again));
});
