//! Record sources: a single value, an in-memory sequence, or an async stream.

use futures::stream::{self, LocalBoxStream, Stream, StreamExt};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Single,
    Sequence,
    Stream,
}

/// Records to fill a template with, consumed strictly in order.
///
/// Every shape goes through the same `next().await` loop, so a synchronous
/// sequence and an async producer are rendered identically.
pub struct RecordSource<'a> {
    records: LocalBoxStream<'a, Value>,
    mode: SourceMode,
}

impl<'a> RecordSource<'a> {
    /// Exactly one record.
    pub fn single(record: Value) -> Self {
        Self {
            records: stream::iter(std::iter::once(record)).boxed_local(),
            mode: SourceMode::Single,
        }
    }

    pub fn iter<I>(records: I) -> Self
    where
        I: IntoIterator<Item = Value>,
        I::IntoIter: 'a,
    {
        Self {
            records: stream::iter(records).boxed_local(),
            mode: SourceMode::Sequence,
        }
    }

    pub fn stream<S>(records: S) -> Self
    where
        S: Stream<Item = Value> + 'a,
    {
        Self {
            records: records.boxed_local(),
            mode: SourceMode::Stream,
        }
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub async fn next(&mut self) -> Option<Value> {
        self.records.next().await
    }
}

impl std::fmt::Debug for RecordSource<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSource")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// A JSON array is a sequence of its entries; anything else is one record.
impl From<Value> for RecordSource<'_> {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(entries) => Self::iter(entries),
            record => Self::single(record),
        }
    }
}

impl From<Vec<Value>> for RecordSource<'_> {
    fn from(records: Vec<Value>) -> Self {
        Self::iter(records)
    }
}
