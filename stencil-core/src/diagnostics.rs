//! Per-node failures collected during a fill.
//!
//! Nothing in here aborts a fill: each entry means one directive or one
//! binding was skipped while the rest of the tree was still rendered.

use thiserror::Error;

use crate::error::DomError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One skipped directive or binding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("missing attribute name in `<?{directive}?>` on {node}")]
    MissingAttributeName { node: String, directive: String },

    #[error("missing attribute key for `{name}` in `<?{directive}?>` on {node}")]
    MissingAttributeKey {
        name: String,
        node: String,
        directive: String,
    },

    #[error("cannot set attribute `{name}` on {node}: invalid attribute name")]
    InvalidAttributeName { name: String, node: String },

    #[error("cannot apply binding `{key}` to {node} (parent: {parent}): {reason}")]
    Replacement {
        key: String,
        node: String,
        parent: String,
        reason: DomError,
    },

    #[error("entry {index} of `{key}` is neither a scalar nor an object; skipped")]
    UnsupportedEntry { key: String, index: usize },
}

impl Diagnostic {
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::Replacement { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }
}

/// Accumulated diagnostics, in the order they were reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `diagnostic` and keep it.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!(%diagnostic, "directive or binding skipped"),
            Severity::Error => tracing::error!(%diagnostic, "binding skipped"),
        }
        self.entries.push(diagnostic);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.entries.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
