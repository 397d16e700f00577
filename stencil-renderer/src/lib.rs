//! # stencil-renderer
//!
//! The synchronous fill engine: [`fill_attributes`] rewrites one element's
//! attributes, [`TreeFiller`] walks a fragment and applies bindings.
//!
//! ## Usage
//!
//! ```rust
//! use serde_json::json;
//! use stencil_core::{dom, Diagnostics, FillOptions};
//! use stencil_renderer::TreeFiller;
//!
//! let doc = dom::parse_document(r#"<ul><li data-key="name"></li></ul>"#);
//! let ul = dom::elements(&doc)
//!     .into_iter()
//!     .find(|e| dom::local_name(e) == Some("ul"))
//!     .unwrap();
//!
//! let options = FillOptions::default();
//! let mut diagnostics = Diagnostics::new();
//! TreeFiller::new(&options).fill(&ul, &json!({ "name": "Ann" }), &mut diagnostics);
//!
//! assert_eq!(dom::to_html(&ul).unwrap(), "<li>Ann</li>");
//! ```

pub mod attrs;
pub mod fill;

pub use attrs::{fill_attributes, interpolate, lookup_path};
pub use fill::TreeFiller;
