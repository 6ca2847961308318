//! Elasticsearch integration: index bootstrap, bulk writes and the version record.

mod bulk;
pub mod client;
pub mod types;

pub use client::{ElasticService, VERSION_INDEX};
pub use types::ElasticError;
