//! Error and summary types for the indexing pipeline.

use crate::{
    corpus::{DatasetVersion, MetadataError},
    metrics::MetricsSnapshot,
    sink::SinkError,
};
use thiserror::Error;

/// Errors that abort an indexing run.
#[derive(Debug, Error)]
pub enum IndexingError {
    /// The metadata table is missing or malformed.
    #[error("Failed to load metadata: {0}")]
    Metadata(#[from] MetadataError),
    /// The sink failed a bulk write or the version record.
    #[error("Failed to write to the search backend: {0}")]
    Sink(#[from] SinkError),
}

/// Result of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Dataset version recorded for the run, when the directory name carried one.
    pub version: Option<DatasetVersion>,
    /// Counters collected while processing.
    pub metrics: MetricsSnapshot,
}
