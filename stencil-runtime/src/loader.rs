//! Fetching JSON for `[data-source]` elements.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{io_err, LoadError};

/// Fetch and parse the JSON document named by `source`.
pub trait SourceLoader {
    fn load(&self, source: &str) -> impl Future<Output = Result<Value, LoadError>>;
}

/// Reads sources as file paths relative to a base directory. A leading
/// `file://` is accepted.
#[derive(Debug, Clone)]
pub struct FsLoader {
    base: PathBuf,
}

impl FsLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    fn resolve(&self, source: &str) -> PathBuf {
        self.base
            .join(source.strip_prefix("file://").unwrap_or(source))
    }
}

impl SourceLoader for FsLoader {
    async fn load(&self, source: &str) -> Result<Value, LoadError> {
        let path = self.resolve(source);
        tracing::debug!(path = %path.display(), "reading source");
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| io_err(&path, e))?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// GETs `http(s)://` sources. The blocking request runs off the async thread.
#[derive(Debug, Clone)]
pub struct HttpLoader {
    agent: ureq::Agent,
}

impl HttpLoader {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl Default for HttpLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceLoader for HttpLoader {
    async fn load(&self, source: &str) -> Result<Value, LoadError> {
        let agent = self.agent.clone();
        let url = source.to_string();
        tracing::debug!(%url, "fetching source");
        tokio::task::spawn_blocking(move || -> Result<Value, LoadError> {
            let response = agent.get(&url).call().map_err(Box::new)?;
            response
                .into_json::<Value>()
                .map_err(|source| LoadError::Body { url, source })
        })
        .await?
    }
}

/// Routes `http://` and `https://` to [`HttpLoader`], everything else to
/// [`FsLoader`].
#[derive(Debug, Clone)]
pub struct DefaultLoader {
    fs: FsLoader,
    http: HttpLoader,
}

impl DefaultLoader {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            fs: FsLoader::new(base),
            http: HttpLoader::new(),
        }
    }
}

fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

impl SourceLoader for DefaultLoader {
    async fn load(&self, source: &str) -> Result<Value, LoadError> {
        if is_remote(source) {
            self.http.load(source).await
        } else {
            self.fs.load(source).await
        }
    }
}

/// Loads each distinct source once and hands out copies afterwards.
#[derive(Debug)]
pub struct SourceCache<L> {
    loader: L,
    loaded: RefCell<HashMap<String, Value>>,
}

impl<L: SourceLoader> SourceCache<L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            loaded: RefCell::new(HashMap::new()),
        }
    }

    pub async fn get(&self, source: &str) -> Result<Value, LoadError> {
        if let Some(hit) = self.loaded.borrow().get(source) {
            tracing::trace!(%source, "source cache hit");
            return Ok(hit.clone());
        }
        let value = self.loader.load(source).await?;
        self.loaded
            .borrow_mut()
            .insert(source.to_string(), value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.loaded.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded.borrow().is_empty()
    }
}
