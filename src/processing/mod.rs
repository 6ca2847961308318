//! Document processing pipeline: extraction, document building, dedup and batching.

pub mod batch;
pub mod dedup;
pub mod extract;
pub mod mappers;
mod service;
pub mod types;

pub use service::IndexingService;
pub use types::{IndexingError, RunSummary};
