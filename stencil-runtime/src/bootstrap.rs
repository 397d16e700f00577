//! Page bootstrap: bind every `[data-source]` element to its JSON.
//!
//! ```html
//! <ul id="people" data-source="people.json"></ul>
//! <template for="people"><li data-key="name"></li></template>
//! ```
//!
//! Every element is matched to its template before anything is fetched, so
//! a markup mistake fails the whole page without partial rendering.

use stencil_core::{dom, Diagnostics, Handle};

use crate::driver::{Filler, NodeRef};
use crate::error::{AuthoringError, RuntimeError};
use crate::loader::{SourceCache, SourceLoader};

pub const SOURCE_ATTRIBUTE: &str = "data-source";

/// A `[data-source]` element paired with its `<template for=id>`.
#[derive(Debug, Clone)]
pub struct SourceBinding {
    pub id: String,
    pub source: String,
    pub element: Handle,
    pub template: Handle,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSource {
    pub id: String,
    pub source: String,
    pub inserted: usize,
}

#[derive(Debug, Default)]
pub struct BootstrapReport {
    pub bound: Vec<BoundSource>,
    pub diagnostics: Diagnostics,
}

/// Pair every `[data-source]` element under `document` with its template.
/// A sibling `<template for=id>` wins over one elsewhere in the document.
pub fn discover(document: &Handle) -> Result<Vec<SourceBinding>, AuthoringError> {
    let elements = dom::elements(document);
    let templates: Vec<&Handle> = elements
        .iter()
        .filter(|e| dom::local_name(e) == Some("template"))
        .collect();

    let mut bindings = Vec::new();
    for element in &elements {
        let Some(source) = dom::attribute(element, SOURCE_ATTRIBUTE) else {
            continue;
        };
        if source.trim().is_empty() {
            tracing::warn!(element = %dom::describe(element), "empty data source ignored");
            continue;
        }
        let id = dom::attribute(element, "id")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AuthoringError::MissingIdentifier {
                element: dom::describe(element),
            })?;

        let declared_for = |t: &&&Handle| dom::attribute(t, "for").as_deref() == Some(id.as_str());
        let parent = dom::parent(element);
        let sibling = templates.iter().filter(declared_for).find(|t| {
            match (dom::parent(t), &parent) {
                (Some(a), Some(b)) => std::rc::Rc::ptr_eq(&a, b),
                _ => false,
            }
        });
        let template = sibling
            .or_else(|| templates.iter().find(declared_for))
            .map(|t| (**t).clone())
            .ok_or_else(|| AuthoringError::MissingTemplate { id: id.clone() })?;

        bindings.push(SourceBinding {
            id,
            source: source.trim().to_string(),
            element: element.clone(),
            template,
        });
    }
    Ok(bindings)
}

/// Discover, load and fill every data source in the filler's document, in
/// document order. Each distinct source is loaded once through `cache`.
#[tracing::instrument(level = "debug", skip_all)]
pub async fn bootstrap<L: SourceLoader>(
    filler: &Filler<'_>,
    cache: &SourceCache<L>,
) -> Result<BootstrapReport, RuntimeError> {
    let bindings = discover(filler.document())?;
    tracing::debug!(count = bindings.len(), "data sources discovered");

    let mut report = BootstrapReport::default();
    for binding in bindings {
        let data = cache
            .get(&binding.source)
            .await
            .map_err(|cause| RuntimeError::Load {
                url: binding.source.clone(),
                cause,
            })?;
        let outcome = filler
            .fill(
                NodeRef::Node(binding.element),
                NodeRef::Node(binding.template),
                data,
            )
            .await?;

        tracing::info!(
            id = %binding.id,
            source = %binding.source,
            inserted = outcome.inserted.len(),
            "data source bound"
        );
        report.bound.push(BoundSource {
            id: binding.id,
            source: binding.source,
            inserted: outcome.inserted.len(),
        });
        report.diagnostics.extend(outcome.diagnostics);
    }
    Ok(report)
}
