use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;

use html::{Document, ReadyState};
use query::{
    Callback, Collection, EachKey, Object, Query, TypeTag, Value, classify, each,
    is_plain_object,
};

fn page() -> Query {
    Query::new(Document::parse(
        r#"<div id="app"><table><tbody><tr><td class="c">1</td></tr></tbody></table><p class="c">p</p></div>"#,
    ))
}

#[test]
fn plain_mappings_and_arrays_classify_apart() {
    let mappings = [
        Object::new(),
        Object::new().with("a", 1),
        Object::new().with("nested", Object::new()),
    ];
    for mapping in mappings {
        let value = Value::from(mapping);
        assert_eq!(classify(&value), TypeTag::Object);
        assert!(is_plain_object(&value));
    }
    let arrays = [vec![], vec![Value::Null], vec![Value::from("x"), Value::Number(1.0)]];
    for array in arrays {
        let value = Value::Array(array);
        assert_eq!(classify(&value).as_str(), "array");
        assert!(!is_plain_object(&value));
    }
}

#[test]
fn each_visits_n_times_or_stops_at_break() {
    let value = Value::Array((0..6).map(Value::from).collect());
    let mut all = 0;
    each(&value, |_, _| {
        all += 1;
        ControlFlow::Continue(())
    });
    assert_eq!(all, 6);

    let mut visited = Vec::new();
    let returned = each(&value, |key, _| {
        visited.push(key);
        if key == EachKey::Index(2) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });
    assert_eq!(visited, vec![EachKey::Index(0), EachKey::Index(1), EachKey::Index(2)]);
    assert!(std::ptr::eq(returned, &value));
    assert_eq!(returned, &Value::Array((0..6).map(Value::from).collect()));
}

#[test]
fn empty_selector_gives_empty_collection() {
    let mut q = page();
    for empty in [Value::Undefined, Value::from("")] {
        let c = q.resolve(empty, None);
        assert_eq!(c.len(), 0);
        assert_eq!(c.selector(), "");
    }
}

#[test]
fn paragraph_markup_gives_one_paragraph() {
    let mut q = page();
    let c = q.select("<p></p>");
    assert_eq!(c.len(), 1);
    assert_eq!(q.document().tag_name(c[0]), Some("p"));
    assert_eq!(c.selector(), "");
}

#[test]
fn void_self_closing_tag_is_not_expanded() {
    let mut q = page();
    assert_eq!(query::expand_self_closing("<input/>"), "<input/>");
    let c = q.select("<input/>");
    assert_eq!(c.len(), 1);
    assert_eq!(q.document().outer_html(c[0]), "<input>");
    assert!(q.document().children(c[0]).is_empty());
}

#[test]
fn non_void_self_closing_tag_is_expanded() {
    let mut q = page();
    assert_eq!(query::expand_self_closing("<div foo='x'/>"), "<div foo='x'></div>");
    let c = q.select("<div foo='x'/>");
    assert_eq!(c.len(), 1);
    assert_eq!(q.document().tag_name(c[0]), Some("div"));
    assert_eq!(q.document().attribute(c[0], "foo"), Some("x"));
}

#[test]
fn arrays_are_compacted_in_order() {
    let mut q = page();
    let a = q.document_mut().create_element("a");
    let b = q.document_mut().create_text("b");
    let input = Value::Array(vec![Value::Node(a), Value::Null, Value::Node(b), Value::Undefined]);
    let c = q.resolve(input, None);
    assert_eq!(c.len(), 2);
    assert_eq!(c.as_slice(), &[a, b]);
}

#[test]
fn collections_are_returned_unchanged() {
    let mut q = page();
    let original = q.select(".c");
    let again = q.resolve(Value::Collection(original.clone()), Some(&Value::from("#app")));
    assert!(Rc::ptr_eq(&original, &again));
    let fresh = Rc::new(Collection::new([q.document().root()], "custom"));
    assert!(Rc::ptr_eq(&fresh, &q.resolve(fresh.clone(), None)));
}

#[test]
fn row_markup_parses_as_a_table_row() {
    let mut q = page();
    let c = q.select("<tr><td>cell</td></tr>");
    assert_eq!(c.len(), 1);
    assert_eq!(q.document().tag_name(c[0]), Some("tr"));
    let html = q.document().outer_html(c[0]);
    assert!(html.starts_with("<tr>") && html.ends_with("</tr>"), "got {html}");
    assert_eq!(html, "<tr><td>cell</td></tr>");
}

#[test]
fn property_bag_uses_text_method_and_attribute_fallback() {
    let mut q = page();
    let bag = Value::from(Object::new().with("text", "hi").with("foo", "bar"));
    let c = q.resolve("<span></span>", Some(&bag));
    let span = c[0];
    assert_eq!(q.document().text_content(span), "hi");
    assert_eq!(q.document().attribute(span, "foo"), Some("bar"));
    assert!(!q.document().has_attribute(span, "text"));
}

#[test]
fn queries_carry_their_selector_and_match_in_document_order() {
    let mut q = page();
    let c = q.select(" .c ");
    assert_eq!(c.selector(), ".c");
    let names: Vec<_> = c.iter().map(|n| q.document().tag_name(n)).collect();
    assert_eq!(names, vec![Some("td"), Some("p")]);
}

#[test]
fn ready_handlers_wait_for_the_document() {
    let mut q = page();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = log.clone();
    let c = q.resolve(
        Callback::new(move |doc| sink.borrow_mut().push(doc.ready_state())),
        None,
    );
    assert_eq!(c.as_slice(), &[q.document().root()]);
    assert!(log.borrow().is_empty());
    q.document_mut().set_ready_state(ReadyState::Interactive);
    assert_eq!(*log.borrow(), vec![ReadyState::Interactive]);
}

#[test]
fn built_fragments_can_be_attached_and_queried() {
    let mut q = page();
    let rows = q.select("<tr class=new><td>2</td></tr>");
    let tbody = q.select("tbody")[0];
    q.document_mut().append_child(tbody, rows[0]).unwrap();
    let found = q.select("tr.new td");
    assert_eq!(found.len(), 1);
    assert_eq!(q.document().text_content(found[0]), "2");
}
