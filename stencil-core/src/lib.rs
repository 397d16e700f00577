//! Stencil core library — document model helpers, binding types, diagnostics,
//! configuration.
//!
//! Public API surface:
//! - [`dom`] — parse / clone / replace / serialize over `markup5ever_rcdom`
//! - [`binding`] — binding keys, the [`Binding`] variant and [`Stencil`] nodes
//! - [`diagnostics`] — per-node failures collected during a fill
//! - [`config`] — [`FillOptions`] and YAML loading
//! - [`error`] — [`DomError`], [`ConfigError`]

pub mod binding;
pub mod config;
pub mod diagnostics;
pub mod dom;
pub mod error;

pub use binding::{binding_key, scalar_text, Binding, Stencil};
pub use config::{FillOptions, PlaceholderFallback};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{ConfigError, DomError};
pub use markup5ever_rcdom::Handle;
