//! Fill configuration.
//!
//! # API pattern
//!
//! - `load_options_at(path)` — explicit path; used in tests with `TempDir`
//! - `load_options()` — `<config_dir>/stencil/config.yaml`, defaults when absent

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// What a `${path}` placeholder renders when the path does not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderFallback {
    /// Substitute the empty string.
    #[default]
    Empty,
    /// Leave the literal `${path}` token in place (legacy behavior).
    Verbatim,
}

/// Markup conventions the engine recognises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FillOptions {
    /// Attribute carrying an element's binding key.
    pub key_attribute: String,
    /// Element name of slot-style nodes.
    pub slot_element: String,
    /// Attribute of a slot-style node carrying its binding key.
    pub slot_name_attribute: String,
    /// Processing-instruction target of attribute directives.
    pub directive_target: String,
    /// Remove attribute directives from the rendered output once applied.
    pub strip_directives: bool,
    /// Remove the key attribute from nodes once their binding is applied.
    pub strip_binding_keys: bool,
    pub placeholder_fallback: PlaceholderFallback,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            key_attribute: "data-key".to_string(),
            slot_element: "slot".to_string(),
            slot_name_attribute: "name".to_string(),
            directive_target: "attr".to_string(),
            strip_directives: true,
            strip_binding_keys: true,
            placeholder_fallback: PlaceholderFallback::Empty,
        }
    }
}

/// `<config_dir>/stencil/config.yaml`. Pure, no I/O.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join("stencil").join("config.yaml"))
        .ok_or(ConfigError::ConfigDirNotFound)
}

/// Load options from a YAML file. Unset fields keep their defaults; an empty
/// file yields [`FillOptions::default`].
pub fn load_options_at(path: &Path) -> Result<FillOptions, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if contents.trim().is_empty() {
        return Ok(FillOptions::default());
    }
    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// `load_options_at` convenience wrapper over [`default_config_path`].
pub fn load_options() -> Result<FillOptions, ConfigError> {
    let path = default_config_path()?;
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(FillOptions::default());
    }
    load_options_at(&path)
}
