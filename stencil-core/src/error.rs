//! Error types for stencil-core.

use std::path::PathBuf;

use thiserror::Error;

/// Structural edit failures on the document tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DomError {
    /// The node has no parent, so it cannot be replaced or removed.
    #[error("node is detached from its parent")]
    Detached,

    /// The node points at a parent that does not list it as a child.
    #[error("node is not listed among its parent's children")]
    NotAChild,
}

/// All errors that can arise while loading [`crate::FillOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error while reading the config file.
    #[error("config io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error; serde_yaml includes the line.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::config_dir()` returned `None`.
    #[error("cannot determine the user config directory")]
    ConfigDirNotFound,
}
