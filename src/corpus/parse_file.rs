//! Full-text parse files: one JSON record per document with an ordered `body_text` list.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Reasons a parse file could not be used. The pipeline treats each as a skipped source.
#[derive(Debug, Error)]
pub enum ParseFileError {
    /// File could not be read.
    #[error("failed to read parse file {path}: {source}")]
    Io {
        /// Location of the file.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// File content is not a parse record.
    #[error("failed to decode parse file {path}: {source}")]
    Decode {
        /// Location of the file.
        path: PathBuf,
        /// Underlying JSON failure.
        #[source]
        source: serde_json::Error,
    },
}

/// One text block of a parse file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    /// Zero-based position within the file, counting empty blocks too.
    pub index: usize,
    /// Raw block text.
    pub text: String,
}

/// Ordered text blocks read from a parse file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBody {
    /// Blocks in file order.
    pub blocks: Vec<ParsedBlock>,
}

#[derive(Deserialize)]
struct RawParseFile {
    #[serde(default)]
    body_text: Vec<RawBlock>,
}

#[derive(Deserialize)]
struct RawBlock {
    #[serde(default)]
    text: String,
}

impl ParsedBody {
    /// Decode a parse record from JSON bytes.
    pub fn from_slice(content: &[u8]) -> Result<Self, serde_json::Error> {
        let raw: RawParseFile = serde_json::from_slice(content)?;
        let blocks = raw
            .body_text
            .into_iter()
            .enumerate()
            .map(|(index, block)| ParsedBlock {
                index,
                text: block.text,
            })
            .collect();
        Ok(Self { blocks })
    }
}

/// Read and decode one parse file.
pub async fn read_parse_file(path: &Path) -> Result<ParsedBody, ParseFileError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|source| ParseFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    ParsedBody::from_slice(&content).map_err(|source| ParseFileError::Decode {
        path: path.to_path_buf(),
        source,
    })
}
