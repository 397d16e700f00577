//! Iteration driver: stamp a template once per record into a target.

use tokio::sync::watch;

use stencil_core::{dom, Diagnostics, FillOptions, Handle};
use stencil_renderer::TreeFiller;

use crate::error::RuntimeError;
use crate::selector::Selector;
use crate::source::RecordSource;

/// A node given directly or by selector against the filler's document.
#[derive(Debug, Clone)]
pub enum NodeRef<'a> {
    Node(Handle),
    Selector(&'a str),
}

impl<'a> From<&'a str> for NodeRef<'a> {
    fn from(selector: &'a str) -> Self {
        NodeRef::Selector(selector)
    }
}

impl From<Handle> for NodeRef<'_> {
    fn from(node: Handle) -> Self {
        NodeRef::Node(node)
    }
}

impl From<&Handle> for NodeRef<'_> {
    fn from(node: &Handle) -> Self {
        NodeRef::Node(node.clone())
    }
}

/// Result of one `fill` call.
#[derive(Debug, Default)]
pub struct FillOutcome {
    /// Top-level nodes appended to the target, in insertion order.
    ///
    /// These handles are only meaningful while the document is alive:
    /// dropping the document empties every descendant, these included.
    pub inserted: Vec<Handle>,
    pub diagnostics: Diagnostics,
    /// Records consumed before the source ended or shutdown was signalled.
    pub records: usize,
}

/// Fills templates in one document.
#[derive(Debug)]
pub struct Filler<'d> {
    document: &'d Handle,
    options: FillOptions,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<'d> Filler<'d> {
    pub fn new(document: &'d Handle, options: FillOptions) -> Self {
        Self {
            document,
            options,
            shutdown: None,
        }
    }

    /// Stop consuming records once `shutdown` reads `true`. Checked before
    /// each record; nodes already inserted stay.
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    pub fn document(&self) -> &Handle {
        self.document
    }

    pub fn options(&self) -> &FillOptions {
        &self.options
    }

    /// Append one filled copy of `template`'s content to `target` per record.
    ///
    /// Records are taken strictly in order, one at a time; a slow async
    /// source delays later copies but never reorders them. Call-level
    /// problems (unresolvable selector, wrong node kinds) fail before any
    /// record is consumed.
    #[tracing::instrument(level = "debug", skip_all)]
    pub async fn fill<'s>(
        &self,
        target: NodeRef<'_>,
        template: NodeRef<'_>,
        data: impl Into<RecordSource<'s>>,
    ) -> Result<FillOutcome, RuntimeError> {
        let target = self.resolve(target)?;
        if !dom::is_element(&target) {
            return Err(RuntimeError::InvalidArgument {
                role: "target",
                expected: "an element",
                found: dom::describe(&target),
            });
        }
        let template = self.resolve(template)?;
        let content = dom::template_content(&template).ok_or_else(|| {
            RuntimeError::InvalidArgument {
                role: "template",
                expected: "a <template> element",
                found: dom::describe(&template),
            }
        })?;

        let mut records = data.into();
        tracing::debug!(
            mode = ?records.mode(),
            target = %dom::describe(&target),
            "filling template"
        );

        let filler = TreeFiller::new(&self.options);
        let mut outcome = FillOutcome::default();
        loop {
            if self.is_shut_down() {
                tracing::info!(records = outcome.records, "fill stopped by shutdown signal");
                break;
            }
            let Some(record) = records.next().await else {
                break;
            };
            let copy = dom::deep_clone(&content);
            filler.fill(&copy, &record, &mut outcome.diagnostics);
            outcome.inserted.extend(dom::append(&target, copy));
            outcome.records += 1;
        }

        tracing::debug!(
            records = outcome.records,
            inserted = outcome.inserted.len(),
            diagnostics = outcome.diagnostics.len(),
            "fill complete"
        );
        Ok(outcome)
    }

    fn resolve(&self, node: NodeRef<'_>) -> Result<Handle, RuntimeError> {
        match node {
            NodeRef::Node(handle) => Ok(handle),
            NodeRef::Selector(selector) => {
                let parsed = Selector::parse(selector).map_err(|e| RuntimeError::InvalidSelector {
                    selector: selector.to_string(),
                    reason: e.to_string(),
                })?;
                parsed
                    .first(self.document)
                    .ok_or_else(|| RuntimeError::Resolution {
                        selector: selector.to_string(),
                    })
            }
        }
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown.as_ref().is_some_and(|rx| *rx.borrow())
    }
}

/// [`Filler::fill`] with default options.
pub async fn fill<'s>(
    document: &Handle,
    target: NodeRef<'_>,
    template: NodeRef<'_>,
    data: impl Into<RecordSource<'s>>,
) -> Result<FillOutcome, RuntimeError> {
    Filler::new(document, FillOptions::default())
        .fill(target, template, data)
        .await
}
