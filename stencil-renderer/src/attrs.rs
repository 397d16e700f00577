//! Attribute filling — directives and `${path}` placeholders.
//!
//! Two independent passes over a single element:
//!
//! 1. every child processing instruction `<?attr name="href" key="url"?>`
//!    sets `href` to `record.url` when the record has that key;
//! 2. every attribute value containing `${a.b}` tokens gets each token
//!    replaced by the value at that dotted path.
//!
//! Children are never visited. Failures are reported per directive and never
//! stop the other directives or the placeholder pass.

use serde_json::Value;

use stencil_core::{dom, scalar_text, Diagnostic, Diagnostics, FillOptions, Handle, PlaceholderFallback};

/// Run both passes on `node`. Non-element nodes are left alone.
pub fn fill_attributes(
    node: &Handle,
    record: &Value,
    options: &FillOptions,
    diagnostics: &mut Diagnostics,
) {
    if !dom::is_element(node) {
        return;
    }
    apply_directives(node, record, options, diagnostics);
    dom::rewrite_attributes(node, |value| {
        interpolate(value, record, options.placeholder_fallback)
    });
}

fn apply_directives(
    node: &Handle,
    record: &Value,
    options: &FillOptions,
    diagnostics: &mut Diagnostics,
) {
    for child in dom::children(node) {
        let Some((target, contents)) = dom::instruction(&child) else {
            continue;
        };
        if target != options.directive_target {
            continue;
        }
        apply_directive(node, target, contents, record, diagnostics);
        if options.strip_directives {
            // `child` was just listed under `node`.
            let _ = dom::detach(&child);
        }
    }
}

fn apply_directive(
    node: &Handle,
    target: &str,
    contents: &str,
    record: &Value,
    diagnostics: &mut Diagnostics,
) {
    let Some(name) = directive_field(contents, "name") else {
        diagnostics.report(Diagnostic::MissingAttributeName {
            node: dom::describe(node),
            directive: format!("{target} {contents}"),
        });
        return;
    };
    let Some(key) = directive_field(contents, "key") else {
        diagnostics.report(Diagnostic::MissingAttributeKey {
            name,
            node: dom::describe(node),
            directive: format!("{target} {contents}"),
        });
        return;
    };

    let Some(value) = record.get(&key).filter(|v| !v.is_null()) else {
        return;
    };
    if !is_valid_attribute_name(&name) {
        diagnostics.report(Diagnostic::InvalidAttributeName {
            name,
            node: dom::describe(node),
        });
        return;
    }
    tracing::trace!(%name, %key, node = %dom::describe(node), "attribute directive");
    dom::set_attribute(node, &name, &value_text(value));
}

/// Value of `field="..."` (or single-quoted) inside directive data.
/// Empty values count as missing.
fn directive_field(contents: &str, field: &str) -> Option<String> {
    let mut offset = 0;
    while let Some(found) = contents[offset..].find(field) {
        let at = offset + found;
        offset = at + field.len();

        let starts_word = contents[..at]
            .chars()
            .next_back()
            .map_or(true, char::is_whitespace);
        if !starts_word {
            continue;
        }
        let Some(value) = contents[offset..].trim_start().strip_prefix('=') else {
            continue;
        };
        let value = value.trim_start();
        let quote = value.chars().next()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        let body = &value[1..];
        let end = body.find(quote)?;
        let parsed = &body[..end];
        return (!parsed.is_empty()).then(|| parsed.to_string());
    }
    None
}

fn is_valid_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '>' | '/' | '='))
}

/// Text form used when a value lands in an attribute. Arrays and objects are
/// written as JSON.
fn value_text(value: &Value) -> String {
    scalar_text(value).unwrap_or_else(|| value.to_string())
}

/// Replace every `${path}` token in `value`.
///
/// Returns `None` when `value` contains no token, so callers can leave it
/// byte-identical. An unterminated `${` is kept as literal text.
pub fn interpolate(value: &str, record: &Value, fallback: PlaceholderFallback) -> Option<String> {
    if !value.contains("${") {
        return None;
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            rest = "";
            break;
        };

        match lookup_path(record, after[..end].trim()) {
            Some(found) => out.push_str(&value_text(found)),
            None if fallback == PlaceholderFallback::Verbatim => {
                out.push_str(&rest[start..start + 2 + end + 1]);
            }
            None => {}
        }
        rest = &after[end + 1..];
    }
    out.push_str(rest);
    Some(out)
}

/// Walk `record` along a dot-separated path. Array segments are indices.
/// `null` at the end of the path counts as missing.
pub fn lookup_path<'r>(record: &'r Value, path: &str) -> Option<&'r Value> {
    let mut current = record;
    for segment in path.split('.') {
        current = match current {
            Value::Object(fields) => fields.get(segment)?,
            Value::Array(entries) => entries.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!current.is_null()).then_some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    /// The parsed document and its first `<a>`. The document must stay
    /// alive: dropping it empties every descendant.
    fn anchor(html: &str) -> (Handle, Handle) {
        let doc = dom::parse_document(html);
        let a = dom::elements(&doc)
            .into_iter()
            .find(|e| dom::local_name(e) == Some("a"))
            .expect("a");
        (doc, a)
    }

    #[test]
    fn directive_sets_attribute_and_is_stripped() {
        let (_doc, a) = anchor(r#"<a><?attr name="href" key="url"?></a>"#);
        let mut diagnostics = Diagnostics::new();
        fill_attributes(&a, &json!({ "url": "/x" }), &FillOptions::default(), &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(dom::outer_html(&a).unwrap(), r#"<a href="/x"></a>"#);
    }

    #[test]
    fn directive_without_key_in_record_leaves_attribute() {
        let (_doc, a) = anchor(r#"<a href="/keep"><?attr name="href" key="url"?></a>"#);
        let mut diagnostics = Diagnostics::new();
        fill_attributes(&a, &json!({ "other": 1 }), &FillOptions::default(), &mut diagnostics);

        assert!(diagnostics.is_empty());
        assert_eq!(dom::attribute(&a, "href").as_deref(), Some("/keep"));
    }

    #[test]
    fn directives_kept_when_not_stripping() {
        let (_doc, a) = anchor(r#"<a><?attr name="title" key="t"?></a>"#);
        let options = FillOptions {
            strip_directives: false,
            ..FillOptions::default()
        };
        fill_attributes(&a, &json!({ "t": 3 }), &options, &mut Diagnostics::new());
        assert_eq!(dom::attribute(&a, "title").as_deref(), Some("3"));
        assert_eq!(dom::children(&a).len(), 1);
    }

    #[test]
    fn malformed_directive_does_not_block_the_next() {
        let (_doc, a) = anchor(
            r#"<a><?attr key="url"?><?attr name="title"?><?attr name="href" key="url"?></a>"#,
        );
        let mut diagnostics = Diagnostics::new();
        fill_attributes(&a, &json!({ "url": "/x" }), &FillOptions::default(), &mut diagnostics);

        assert_eq!(dom::attribute(&a, "href").as_deref(), Some("/x"));
        let found: Vec<_> = diagnostics.into_vec();
        assert_eq!(found.len(), 2);
        assert!(matches!(found[0], Diagnostic::MissingAttributeName { .. }));
        assert!(
            matches!(&found[1], Diagnostic::MissingAttributeKey { name, .. } if name == "title")
        );
    }

    #[test]
    fn invalid_attribute_name_is_reported() {
        let (_doc, a) = anchor(r#"<a><?attr name="bad name" key="url"?></a>"#);
        let mut diagnostics = Diagnostics::new();
        fill_attributes(&a, &json!({ "url": "/x" }), &FillOptions::default(), &mut diagnostics);
        assert!(matches!(
            diagnostics.iter().next(),
            Some(Diagnostic::InvalidAttributeName { .. })
        ));
    }

    #[test]
    fn other_instruction_targets_are_ignored() {
        let (_doc, a) = anchor(r#"<a><?php echo 1 ?></a>"#);
        let mut diagnostics = Diagnostics::new();
        fill_attributes(&a, &json!({}), &FillOptions::default(), &mut diagnostics);
        assert!(diagnostics.is_empty());
        assert_eq!(dom::children(&a).len(), 1);
    }

    #[test]
    fn placeholder_in_attribute() {
        let (_doc, a) = anchor(r#"<a title="Hello ${user.name}"></a>"#);
        fill_attributes(
            &a,
            &json!({ "user": { "name": "Bo" } }),
            &FillOptions::default(),
            &mut Diagnostics::new(),
        );
        assert_eq!(dom::attribute(&a, "title").as_deref(), Some("Hello Bo"));
    }

    #[rstest]
    #[case("Hello ${user.name}", json!({}), "Hello ")]
    #[case("${a}-${b}", json!({ "a": 1, "b": "x" }), "1-x")]
    #[case("${ a }", json!({ "a": "spaced" }), "spaced")]
    #[case("${items.1}", json!({ "items": ["p", "q"] }), "q")]
    #[case("${a.b}", json!({ "a": "not an object" }), "")]
    #[case("${a}", json!({ "a": null }), "")]
    #[case("open ${a", json!({ "a": 1 }), "open ${a")]
    fn interpolation_cases(#[case] input: &str, #[case] record: Value, #[case] expected: &str) {
        let out = interpolate(input, &record, PlaceholderFallback::Empty).expect("has token");
        assert_eq!(out, expected);
    }

    #[test]
    fn verbatim_fallback_keeps_unresolved_tokens() {
        let out = interpolate(
            "Hello ${user.name} ${known}",
            &json!({ "known": "k" }),
            PlaceholderFallback::Verbatim,
        );
        assert_eq!(out.as_deref(), Some("Hello ${user.name} k"));
    }

    #[test]
    fn values_without_tokens_are_untouched() {
        assert_eq!(interpolate("plain $ {text}", &json!({}), PlaceholderFallback::Empty), None);
    }

    #[test]
    fn directive_field_parsing() {
        assert_eq!(directive_field(r#"name="href" key="url""#, "key").as_deref(), Some("url"));
        assert_eq!(directive_field(r#"name='href' key='url'"#, "name").as_deref(), Some("href"));
        assert_eq!(directive_field(r#"name = "a" monkey="x""#, "key"), None);
        assert_eq!(directive_field(r#"name="""#, "name"), None);
        assert_eq!(directive_field(r#"name=href"#, "name"), None);
    }
}
