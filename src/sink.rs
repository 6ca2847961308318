use crate::{corpus::DatasetVersion, documents::OutputDocument, elastic::ElasticError};
use async_trait::async_trait;
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;

/// Errors raised by a document sink. Any of them ends the run.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The search backend rejected or failed a request.
    #[error("Search backend request failed: {0}")]
    Backend(#[from] ElasticError),
    /// The sink could not accept writes.
    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of one bulk write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkSummary {
    /// Documents acknowledged by the sink.
    pub written: usize,
}

/// Destination for built documents and the dataset version.
#[async_trait]
pub trait DocumentSink: Send + Sync {
    /// Persist a heterogeneous batch in one call.
    async fn bulk_write(&self, documents: Vec<OutputDocument>) -> Result<BulkSummary, SinkError>;

    /// Persist the release date of the indexed snapshot.
    async fn record_version(&self, version: &DatasetVersion) -> Result<(), SinkError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum WriteMode {
    #[default]
    Retain,
    Discard,
    Reject,
}

/// In-process sink used for dry runs and tests.
///
/// The default mode keeps every batch for inspection. [`MemorySink::discarding`] only counts
/// what it receives, so a dry run stays bounded by one batch.
#[derive(Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Vec<OutputDocument>>>,
    version: Mutex<Option<DatasetVersion>>,
    received: AtomicUsize,
    mode: WriteMode,
}

impl MemorySink {
    /// Create an empty sink that keeps every batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink that counts documents and drops them.
    pub fn discarding() -> Self {
        Self {
            mode: WriteMode::Discard,
            ..Self::default()
        }
    }

    /// Create a sink whose bulk writes always fail.
    pub fn rejecting() -> Self {
        Self {
            mode: WriteMode::Reject,
            ..Self::default()
        }
    }

    /// Batches kept so far, in write order. Always empty for a discarding sink.
    pub fn batches(&self) -> Vec<Vec<OutputDocument>> {
        self.batches
            .lock()
            .map(|batches| batches.clone())
            .unwrap_or_default()
    }

    /// Documents accepted across all bulk writes.
    pub fn received(&self) -> usize {
        self.received.load(Ordering::Relaxed)
    }

    /// Last recorded dataset version.
    pub fn version(&self) -> Option<DatasetVersion> {
        self.version.lock().ok().and_then(|version| *version)
    }
}

#[async_trait]
impl DocumentSink for MemorySink {
    async fn bulk_write(&self, documents: Vec<OutputDocument>) -> Result<BulkSummary, SinkError> {
        let written = documents.len();
        match self.mode {
            WriteMode::Reject => {
                return Err(SinkError::Unavailable("memory sink rejects writes".into()));
            }
            WriteMode::Discard => {}
            WriteMode::Retain => self
                .batches
                .lock()
                .map_err(|_| SinkError::Unavailable("memory sink poisoned".into()))?
                .push(documents),
        }
        self.received.fetch_add(written, Ordering::Relaxed);
        Ok(BulkSummary { written })
    }

    async fn record_version(&self, version: &DatasetVersion) -> Result<(), SinkError> {
        *self
            .version
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink poisoned".into()))? = Some(*version);
        Ok(())
    }
}
