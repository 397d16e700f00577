use std::path::PathBuf;

use thiserror::Error;

/// Call-level failures. Per-node problems never show up here; they are
/// returned as diagnostics next to the rendered output.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("selector `{selector}` matched nothing")]
    Resolution { selector: String },

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("{role} must be {expected}, found {found}")]
    InvalidArgument {
        role: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("authoring error: {0}")]
    Authoring(#[from] AuthoringError),

    #[error("failed to load `{url}`: {cause}")]
    Load {
        url: String,
        #[source]
        cause: LoadError,
    },
}

/// Markup mistakes found while discovering `[data-source]` elements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthoringError {
    #[error("{element} has a data source but no id")]
    MissingIdentifier { element: String },

    #[error("no <template for=\"{id}\"> found for #{id}")]
    MissingTemplate { id: String },
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] Box<ureq::Error>),

    #[error("failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("loader task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.into(),
        source,
    }
}
