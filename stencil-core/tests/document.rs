//! Whole-page parsing and serialization.

use stencil_core::{dom, Stencil};

const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>t</title></head><body>
<ul id="list"></ul>
<template id="row"><li data-key="name"><?attr name="title" key="tip"?></li></template>
</body></html>"#;

#[test]
fn page_round_trips_with_doctype_and_template_content() {
    let doc = dom::parse_document(PAGE);
    let html = dom::to_html(&doc).expect("serialize");

    assert!(html.starts_with("<!DOCTYPE html>"), "{html}");
    assert!(html.contains(r#"<template id="row"><li data-key="name"><?attr name="title" key="tip"#));

    let again = dom::to_html(&dom::parse_document(&html)).expect("serialize");
    assert_eq!(again, html);
}

#[test]
fn directives_inside_templates_are_instructions() {
    let doc = dom::parse_document(PAGE);
    let template = dom::elements(&doc)
        .into_iter()
        .find(|e| dom::local_name(e) == Some("template"))
        .expect("template");
    let content = dom::template_content(&template).expect("content");
    let li = &dom::children(&content)[0];

    let instruction = dom::children(li)
        .iter()
        .find_map(|c| dom::instruction(c).map(|(t, d)| (t.to_string(), d.to_string())));
    assert_eq!(
        instruction,
        Some(("attr".to_string(), r#"name="title" key="tip""#.to_string()))
    );
}

#[test]
fn stencil_copies_are_independent_of_the_page() {
    let doc = dom::parse_document(PAGE);
    let template = dom::elements(&doc)
        .into_iter()
        .find(|e| dom::attribute(e, "id").as_deref() == Some("row"))
        .expect("template");
    let stencil = Stencil::of(&template);
    let copy = stencil.fresh_copy();
    dom::set_text(&copy, "changed");

    let original = dom::to_html(&dom::template_content(&template).unwrap()).unwrap();
    assert!(!original.contains("changed"));
}

#[test]
fn elements_skip_template_content() {
    let doc = dom::parse_document(PAGE);
    let names: Vec<_> = dom::elements(&doc)
        .iter()
        .filter_map(|e| dom::local_name(e).map(str::to_string))
        .collect();
    assert!(names.contains(&"template".to_string()));
    assert!(!names.contains(&"li".to_string()));
}
