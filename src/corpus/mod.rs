//! Readers for the corpus snapshot: metadata table, parse files and the release date.

pub mod metadata;
pub mod parse_file;
pub mod version;

pub use metadata::{MetadataError, MetadataRow, RowGroup, group_rows, read_metadata};
pub use parse_file::{ParseFileError, ParsedBlock, ParsedBody, read_parse_file};
pub use version::DatasetVersion;
