//! Async fill runtime: iteration driver, selector resolution, record sources,
//! source loading and `[data-source]` bootstrapping.

pub mod bootstrap;
pub mod driver;
pub mod error;
pub mod loader;
mod logging;
pub mod selector;
pub mod source;

pub use bootstrap::{bootstrap, discover, BootstrapReport, BoundSource, SourceBinding, SOURCE_ATTRIBUTE};
pub use driver::{fill, FillOutcome, Filler, NodeRef};
pub use error::{AuthoringError, LoadError, RuntimeError};
pub use loader::{DefaultLoader, FsLoader, HttpLoader, SourceCache, SourceLoader};
pub use logging::{init_tracing, LogFormat};
pub use source::{RecordSource, SourceMode};
