//! Tree filling — bind a record onto a fragment.
//!
//! Traversal is breadth-first over a FIFO of pending nodes seeded with the
//! target's children. Unbound nodes are transparent: their children join the
//! back of the queue. A bound node ends the walk at its own boundary; its
//! subtree is filled by a fresh call against the narrower record.
//!
//! | `record[key]`   | effect on the bound node                                     |
//! |-----------------|--------------------------------------------------------------|
//! | missing / null  | removed                                                      |
//! | scalar          | text set to the scalar, kept in place                        |
//! | array           | replaced by one filled copy per entry, in entry order        |
//! | object          | subtree filled against the object, kept in place             |
//!
//! A bound `<template>` is replaced by its content in every case.

use std::collections::VecDeque;

use serde_json::Value;

use stencil_core::{
    binding_key, dom, scalar_text, Binding, Diagnostic, Diagnostics, DomError, FillOptions, Handle,
    Stencil,
};

use crate::attrs::fill_attributes;

/// Recursive fill engine. Cheap to construct; holds only the options.
#[derive(Debug, Clone, Copy)]
pub struct TreeFiller<'o> {
    options: &'o FillOptions,
}

impl<'o> TreeFiller<'o> {
    pub fn new(options: &'o FillOptions) -> Self {
        Self { options }
    }

    /// Fill every bound descendant of `target` from `record` and return
    /// `target`. Per-node failures land in `diagnostics`.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn fill(&self, target: &Handle, record: &Value, diagnostics: &mut Diagnostics) -> Handle {
        let mut pending: VecDeque<Handle> = dom::children(target).into();

        while let Some(node) = pending.pop_front() {
            fill_attributes(&node, record, self.options, diagnostics);

            let Some(key) = binding_key(&node, self.options) else {
                pending.extend(dom::children(&node));
                continue;
            };

            tracing::trace!(%key, node = %dom::describe(&node), "binding");
            match Binding::resolve(record, &key) {
                Binding::Absent => {
                    if let Err(reason) = dom::detach(&node) {
                        diagnostics.report(replacement_failure(&node, &key, reason));
                    }
                }
                Binding::Scalar(text) => {
                    let resolved = Stencil::of(&node).resolved();
                    dom::set_text(&resolved, &text);
                    self.settle(&resolved);
                    self.replace(&node, resolved, &key, diagnostics);
                }
                Binding::Array(entries) => {
                    let fragment = self.expand(&node, &key, entries, record, diagnostics);
                    self.replace(&node, fragment, &key, diagnostics);
                }
                Binding::Object(object) => {
                    let resolved = Stencil::of(&node).resolved();
                    self.fill(&resolved, object, diagnostics);
                    self.settle(&resolved);
                    self.replace(&node, resolved, &key, diagnostics);
                }
            }
        }

        target.clone()
    }

    /// One filled copy of `node` per entry, collected into a fragment.
    fn expand(
        &self,
        node: &Handle,
        key: &str,
        entries: &[Value],
        record: &Value,
        diagnostics: &mut Diagnostics,
    ) -> Handle {
        let stencil = Stencil::of(node);
        let fragment = dom::new_fragment();

        for (index, entry) in entries.iter().enumerate() {
            match entry {
                Value::Null => continue,
                Value::Array(_) => {
                    diagnostics.report(Diagnostic::UnsupportedEntry {
                        key: key.to_string(),
                        index,
                    });
                    continue;
                }
                Value::Object(_) => {
                    let copy = stencil.fresh_copy();
                    self.fill(&copy, entry, diagnostics);
                    self.settle(&copy);
                    dom::append(&fragment, copy);
                }
                scalar => {
                    // Scalar entries take their attributes from the enclosing record.
                    let copy = stencil.fresh_copy();
                    fill_attributes(&copy, record, self.options, diagnostics);
                    dom::set_text(&copy, &scalar_text(scalar).unwrap_or_default());
                    self.settle(&copy);
                    dom::append(&fragment, copy);
                }
            }
        }

        fragment
    }

    /// Drop the key attribute from a node that now holds rendered content.
    fn settle(&self, node: &Handle) {
        if self.options.strip_binding_keys {
            dom::remove_attribute(node, &self.options.key_attribute);
        }
    }

    fn replace(&self, node: &Handle, replacement: Handle, key: &str, diagnostics: &mut Diagnostics) {
        if let Err(reason) = dom::replace_with(node, replacement) {
            diagnostics.report(replacement_failure(node, key, reason));
        }
    }
}

fn replacement_failure(node: &Handle, key: &str, reason: DomError) -> Diagnostic {
    Diagnostic::Replacement {
        key: key.to_string(),
        node: dom::describe(node),
        parent: dom::parent(node)
            .map(|parent| dom::describe(&parent))
            .unwrap_or_else(|| "(none)".to_string()),
        reason,
    }
}
