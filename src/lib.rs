#![deny(missing_docs)]

//! Core library for the CORD-19 indexer.

/// Environment and command-line configuration.
pub mod config;
/// Metadata table, parse files and dataset version readers.
pub mod corpus;
/// Output documents and index definitions.
pub mod documents;
/// Elasticsearch integration.
pub mod elastic;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion counters.
pub mod metrics;
/// Extraction, document building, dedup and the indexing driver.
pub mod processing;
/// Topical relevance filter.
pub mod relevance;
/// Destinations for built documents.
pub mod sink;
