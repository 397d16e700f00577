//! IterationDriver behaviour over every record-source shape.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use stencil_core::{dom, Diagnostic, FillOptions, Handle};
use stencil_runtime::{fill, Filler, NodeRef, RecordSource, RuntimeError};

const PAGE: &str = r#"
<ul id="people"></ul>
<div id="plain"></div>
<template id="row"><li data-key="name"></li></template>
<template id="pair"><dt data-key="k"></dt><dd data-key="v"></dd></template>
"#;

fn by_id(doc: &Handle, id: &str) -> Handle {
    dom::elements(doc)
        .into_iter()
        .find(|e| dom::attribute(e, "id").as_deref() == Some(id))
        .expect("element by id")
}

fn inner(doc: &Handle, id: &str) -> String {
    dom::to_html(&by_id(doc, id)).unwrap()
}

#[tokio::test]
async fn single_record_by_selector() {
    let doc = dom::parse_document(PAGE);
    let outcome = fill(&doc, "#people".into(), "#row".into(), json!({ "name": "Ann" }))
        .await
        .expect("fill");

    assert_eq!(outcome.records, 1);
    assert_eq!(outcome.inserted.len(), 1);
    assert_eq!(inner(&doc, "people"), "<li>Ann</li>");
}

#[tokio::test]
async fn array_value_appends_in_order_and_returns_inserted_nodes() {
    let doc = dom::parse_document(PAGE);
    let data = json!([{ "name": "a" }, { "name": "b" }, { "name": "c" }]);
    let outcome = fill(&doc, "#people".into(), "#row".into(), data).await.unwrap();

    assert_eq!(inner(&doc, "people"), "<li>a</li><li>b</li><li>c</li>");
    let texts: Vec<_> = outcome.inserted.iter().map(dom::text_content).collect();
    assert_eq!(texts, ["a", "b", "c"]);
}

#[tokio::test]
async fn multi_root_template_inserts_every_top_level_node() {
    let doc = dom::parse_document(PAGE);
    let data = vec![json!({ "k": "a", "v": 1 }), json!({ "k": "b", "v": 2 })];
    let outcome = fill(&doc, "#plain".into(), "#pair".into(), data).await.unwrap();

    assert_eq!(outcome.inserted.len(), 4);
    assert_eq!(inner(&doc, "plain"), "<dt>a</dt><dd>1</dd><dt>b</dt><dd>2</dd>");
}

#[tokio::test]
async fn appends_after_existing_children() {
    let doc = dom::parse_document(r#"<ul id="l"><li>first</li></ul><template id="t"><li data-key="n"></li></template>"#);
    fill(&doc, "#l".into(), "#t".into(), json!({ "n": "second" })).await.unwrap();
    assert_eq!(inner(&doc, "l"), "<li>first</li><li>second</li>");
}

#[tokio::test(start_paused = true)]
async fn async_stream_keeps_arrival_order() {
    let doc = dom::parse_document(PAGE);
    let started = tokio::time::Instant::now();
    let delays = [30u64, 0, 10];
    let records = stream::iter(delays.into_iter().enumerate()).then(|(i, delay)| async move {
        tokio::time::sleep(Duration::from_millis(delay)).await;
        json!({ "name": format!("r{i}") })
    });

    let outcome = fill(
        &doc,
        "#people".into(),
        "#row".into(),
        RecordSource::stream(records),
    )
    .await
    .unwrap();

    assert_eq!(outcome.records, 3);
    assert_eq!(inner(&doc, "people"), "<li>r0</li><li>r1</li><li>r2</li>");
    // Records are pulled one at a time, so the delays add up.
    assert!(started.elapsed() >= Duration::from_millis(40));
}

#[tokio::test]
async fn nodes_given_directly() {
    let doc = dom::parse_document(PAGE);
    let target = by_id(&doc, "people");
    let template = by_id(&doc, "row");
    fill(&doc, NodeRef::from(&target), NodeRef::from(&template), json!({ "name": "x" }))
        .await
        .unwrap();
    assert_eq!(inner(&doc, "people"), "<li>x</li>");
}

#[tokio::test]
async fn template_is_unchanged_after_many_fills() {
    let doc = dom::parse_document(PAGE);
    let before = dom::outer_html(&by_id(&doc, "row")).unwrap();
    for n in 0..3 {
        fill(&doc, "#people".into(), "#row".into(), json!({ "name": n })).await.unwrap();
    }
    assert_eq!(dom::outer_html(&by_id(&doc, "row")).unwrap(), before);
    assert_eq!(inner(&doc, "people"), "<li>0</li><li>1</li><li>2</li>");
}

#[tokio::test]
async fn unresolved_selector_is_resolution_error() {
    let doc = dom::parse_document(PAGE);
    let err = fill(&doc, "#nowhere".into(), "#row".into(), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::Resolution { ref selector } if selector == "#nowhere"));
}

#[tokio::test]
async fn malformed_selector_is_reported() {
    let doc = dom::parse_document(PAGE);
    let err = fill(&doc, "ul >".into(), "#row".into(), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidSelector { .. }), "got: {err}");
}

#[tokio::test]
async fn non_template_is_invalid_argument_and_nothing_is_consumed() {
    let doc = dom::parse_document(PAGE);
    let pulled = std::rc::Rc::new(std::cell::Cell::new(0));
    let counter = pulled.clone();
    let records = stream::iter(0..3).map(move |n| {
        counter.set(counter.get() + 1);
        json!({ "name": n })
    });

    let err = fill(
        &doc,
        "#people".into(),
        "#plain".into(),
        RecordSource::stream(records),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, RuntimeError::InvalidArgument { role: "template", .. }));
    assert_eq!(pulled.get(), 0);
    assert_eq!(inner(&doc, "people"), "");
}

#[tokio::test]
async fn text_target_is_invalid_argument() {
    let doc = dom::parse_document(PAGE);
    let text = dom::new_text("loose");
    let err = fill(&doc, NodeRef::Node(text), "#row".into(), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidArgument { role: "target", .. }));
}

#[tokio::test]
async fn document_root_and_fragments_are_not_targets() {
    let doc = dom::parse_document(PAGE);
    let before = dom::to_html(&doc).unwrap();

    let err = fill(&doc, NodeRef::from(&doc), "#row".into(), json!({ "name": "x" }))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidArgument { role: "target", .. }));

    let err = fill(&doc, NodeRef::Node(dom::new_fragment()), "#row".into(), json!({}))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidArgument { role: "target", .. }));
    assert_eq!(dom::to_html(&doc).unwrap(), before);
}

#[tokio::test]
async fn inserted_nodes_stay_live_while_the_document_is_held() {
    let doc = dom::parse_document(PAGE);
    let outcome = fill(&doc, "#plain".into(), "#pair".into(), json!({ "k": "a", "v": 1 }))
        .await
        .unwrap();

    let parents: Vec<_> = outcome
        .inserted
        .iter()
        .map(|node| dom::parent(node).map(|p| dom::attribute(&p, "id")))
        .collect();
    assert_eq!(parents, vec![Some(Some("plain".to_string())); 2]);
    assert_eq!(dom::text_content(&outcome.inserted[1]), "1");
}

#[tokio::test]
async fn diagnostics_accumulate_across_records() {
    let doc = dom::parse_document(
        r#"<div id="d"></div><template id="t"><i data-key="xs"></i></template>"#,
    );
    let data: Vec<Value> = vec![json!({ "xs": [["bad"]] }), json!({ "xs": [["bad"], "ok"] })];
    let outcome = fill(&doc, "#d".into(), "#t".into(), data).await.unwrap();

    assert_eq!(outcome.diagnostics.len(), 2);
    assert!(outcome
        .diagnostics
        .iter()
        .all(|d| matches!(d, Diagnostic::UnsupportedEntry { .. })));
    assert_eq!(inner(&doc, "d"), "<i>ok</i>");
}

#[tokio::test]
async fn shutdown_stops_before_next_record() {
    let doc = dom::parse_document(PAGE);
    let (tx, rx) = tokio::sync::watch::channel(false);
    let filler = Filler::new(&doc, FillOptions::default()).with_shutdown(rx);

    let records = stream::iter(0..5).map(move |n| {
        if n == 1 {
            let _ = tx.send(true);
        }
        json!({ "name": n })
    });

    let outcome = filler
        .fill("#people".into(), "#row".into(), RecordSource::stream(records))
        .await
        .unwrap();

    assert_eq!(outcome.records, 2);
    assert_eq!(inner(&doc, "people"), "<li>0</li><li>1</li>");
}

#[tokio::test]
async fn filler_options_apply() {
    let doc = dom::parse_document(
        r#"<p id="p"></p><template id="t"><b data-bind="x"></b></template>"#,
    );
    let options = FillOptions {
        key_attribute: "data-bind".to_string(),
        ..FillOptions::default()
    };
    Filler::new(&doc, options)
        .fill("#p".into(), "#t".into(), json!({ "x": "ok" }))
        .await
        .unwrap();
    assert_eq!(inner(&doc, "p"), "<b>ok</b>");
}
