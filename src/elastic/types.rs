//! Shared types used by the Elasticsearch client.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Errors returned while interacting with Elasticsearch.
#[derive(Debug, Error)]
pub enum ElasticError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Elasticsearch URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// A document could not be encoded for the bulk body.
    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
    /// Elasticsearch responded with an unexpected status code.
    #[error("Unexpected Elasticsearch response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Elasticsearch.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
    /// The bulk request succeeded but some items were rejected.
    #[error("Bulk write rejected {failed} of {total} documents: {reason}")]
    BulkRejected {
        /// Items reported with an error.
        failed: usize,
        /// Items in the request.
        total: usize,
        /// Reason reported for the first failing item.
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
pub(crate) struct BulkResponse {
    #[serde(default)]
    pub(crate) errors: bool,
    #[serde(default)]
    pub(crate) items: Vec<Value>,
}

impl BulkResponse {
    /// Count failing items and describe the first one.
    pub(crate) fn failures(&self) -> (usize, String) {
        let mut failed = 0;
        let mut first_reason = None;
        for item in &self.items {
            let Some(error) = item
                .as_object()
                .and_then(|actions| actions.values().next())
                .and_then(|action| action.get("error"))
            else {
                continue;
            };
            failed += 1;
            if first_reason.is_none() {
                let reason = error
                    .get("reason")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                first_reason = Some(reason);
            }
        }
        (failed, first_reason.unwrap_or_else(|| "unknown".to_string()))
    }
}
