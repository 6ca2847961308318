//! Metadata table reader and grouping by document identity.

use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while reading the metadata table. All of them abort the run.
#[derive(Debug, Error)]
pub enum MetadataError {
    /// The table could not be read from disk.
    #[error("failed to read metadata table {path}: {source}")]
    Io {
        /// Location of the table.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// A record could not be decoded, usually because a required column is missing.
    #[error("malformed metadata record: {0}")]
    Csv(#[from] csv::Error),
    /// A record carries an empty `cord_uid`.
    #[error("metadata record on line {line} has an empty cord_uid")]
    MissingIdentifier {
        /// One-based line number, counting the header.
        line: usize,
    },
}

/// One record of the metadata table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MetadataRow {
    /// Document identity shared by duplicate records.
    pub cord_uid: String,
    /// Paper title.
    pub title: String,
    /// Publish date as written in the table.
    pub publish_time: String,
    /// Landing page URL.
    pub url: String,
    /// Journal name.
    pub journal: String,
    /// Author list.
    pub authors: String,
    /// Abstract text, possibly empty.
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    /// PMC-derived parse files, `;`-separated. Preferred source.
    #[serde(default)]
    pub pmc_json_files: Option<String>,
    /// PDF-derived parse files, `;`-separated. Fallback source.
    #[serde(default)]
    pub pdf_json_files: Option<String>,
}

impl MetadataRow {
    /// Whether the row references any parse file at all.
    pub fn has_parse_files(&self) -> bool {
        self.parse_file_candidates().next().is_some()
    }

    /// Relative parse-file paths in the order they should be tried: PMC first, then PDF.
    pub fn parse_file_candidates(&self) -> impl Iterator<Item = &str> {
        [self.pmc_json_files.as_deref(), self.pdf_json_files.as_deref()]
            .into_iter()
            .flatten()
            .flat_map(|field| field.split(';'))
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}

/// Rows sharing one identifier, in table order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowGroup {
    /// Shared identifier.
    pub cord_uid: String,
    /// Member rows in source order.
    pub rows: Vec<MetadataRow>,
}

/// Read and validate every row of the metadata table.
pub async fn read_metadata(path: &Path) -> Result<Vec<MetadataRow>, MetadataError> {
    let content = tokio::fs::read(path)
        .await
        .map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    let rows = parse_metadata(&content)?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Metadata table loaded");
    Ok(rows)
}

/// Decode a metadata table from CSV bytes with a header line.
pub fn parse_metadata(content: &[u8]) -> Result<Vec<MetadataRow>, MetadataError> {
    let mut reader = csv::Reader::from_reader(content);
    let mut rows = Vec::new();

    for (index, record) in reader.deserialize::<MetadataRow>().enumerate() {
        let mut row = record?;
        let trimmed = row.cord_uid.trim();
        if trimmed.is_empty() {
            return Err(MetadataError::MissingIdentifier { line: index + 2 });
        }
        if trimmed.len() != row.cord_uid.len() {
            row.cord_uid = trimmed.to_string();
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Group rows by identifier, keeping groups in order of first appearance.
pub fn group_rows(rows: Vec<MetadataRow>) -> Vec<RowGroup> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<RowGroup> = Vec::new();

    for row in rows {
        match positions.get(&row.cord_uid) {
            Some(&position) => groups[position].rows.push(row),
            None => {
                positions.insert(row.cord_uid.clone(), groups.len());
                groups.push(RowGroup {
                    cord_uid: row.cord_uid.clone(),
                    rows: vec![row],
                });
            }
        }
    }

    groups
}
