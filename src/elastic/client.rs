//! HTTP client wrapper for interacting with Elasticsearch.

use crate::{
    config::Config,
    corpus::DatasetVersion,
    documents::{AbstractMode, IndexKind, OutputDocument},
    elastic::{
        bulk::encode_bulk_body,
        types::{BulkResponse, ElasticError},
    },
    sink::{BulkSummary, DocumentSink, SinkError},
};
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, header::CONTENT_TYPE};
use serde_json::Value;

/// Index holding the dataset version record.
pub const VERSION_INDEX: &str = "cord_version";
const VERSION_DOC_ID: &str = "current";
const NDJSON: &str = "application/x-ndjson";

/// Lightweight HTTP client for Elasticsearch operations.
pub struct ElasticService {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
}

impl ElasticService {
    /// Construct a new client from the run configuration.
    pub fn new(config: &Config) -> Result<Self, ElasticError> {
        let client = Client::builder()
            .user_agent(concat!("cordindex/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = normalize_base_url(&config.elastic_url).map_err(ElasticError::InvalidUrl)?;
        tracing::debug!(
            url = %base_url,
            has_api_key = config.elastic_api_key.is_some(),
            "Initialized Elasticsearch HTTP client"
        );

        Ok(Self {
            client,
            base_url,
            api_key: config.elastic_api_key.clone(),
        })
    }

    /// Create every index the run writes to, leaving existing ones untouched.
    pub async fn ensure_indexes(&self, mode: AbstractMode) -> Result<(), ElasticError> {
        for kind in IndexKind::for_mode(mode) {
            let name = kind.index_name();
            if self.index_exists(name).await? {
                tracing::debug!(index = name, "Index already exists");
                continue;
            }
            self.create_index(name, &kind.index_definition(mode)).await?;
        }
        Ok(())
    }

    /// Create an index with the given settings and mappings.
    pub async fn create_index(&self, name: &str, definition: &Value) -> Result<(), ElasticError> {
        let response = self
            .request(Method::PUT, name)
            .json(definition)
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::info!(index = name, "Index created");
        })
        .await
    }

    /// Index a batch through the `_bulk` endpoint.
    pub async fn bulk(&self, documents: &[OutputDocument]) -> Result<BulkSummary, ElasticError> {
        if documents.is_empty() {
            return Ok(BulkSummary::default());
        }

        let total = documents.len();
        let body = encode_bulk_body(documents)?;
        let response = self
            .request(Method::POST, "_bulk")
            .header(CONTENT_TYPE, NDJSON)
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ElasticError::UnexpectedStatus { status, body };
            tracing::error!(documents = total, error = %error, "Bulk request failed");
            return Err(error);
        }

        let payload: BulkResponse = response.json().await?;
        if payload.errors {
            let (failed, reason) = payload.failures();
            let error = ElasticError::BulkRejected {
                failed,
                total,
                reason,
            };
            tracing::error!(error = %error, "Bulk request partially rejected");
            return Err(error);
        }

        tracing::debug!(documents = total, "Bulk request acknowledged");
        Ok(BulkSummary { written: total })
    }

    /// Store the dataset version as a single well-known document.
    pub async fn put_version(&self, version: &DatasetVersion) -> Result<(), ElasticError> {
        let response = self
            .request(
                Method::PUT,
                &format!("{VERSION_INDEX}/_doc/{VERSION_DOC_ID}"),
            )
            .json(&version.to_record())
            .send()
            .await?;

        self.ensure_success(response, || {
            tracing::info!(version = %version, "Dataset version recorded");
        })
        .await
    }

    async fn index_exists(&self, name: &str) -> Result<bool, ElasticError> {
        let response = self.request(Method::HEAD, name).send().await?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                let error = ElasticError::UnexpectedStatus { status, body };
                tracing::error!(index = name, error = %error, "Index existence check failed");
                Err(error)
            }
        }
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format_endpoint(&self.base_url, path);
        let mut req = self.client.request(method, url);
        if let Some(api_key) = &self.api_key
            && !api_key.is_empty()
        {
            req = req.header("Authorization", format!("ApiKey {api_key}"));
        }
        req
    }

    async fn ensure_success<F>(
        &self,
        response: reqwest::Response,
        on_success: F,
    ) -> Result<(), ElasticError>
    where
        F: FnOnce(),
    {
        if response.status().is_success() {
            on_success();
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let error = ElasticError::UnexpectedStatus { status, body };
            tracing::error!(error = %error, "Elasticsearch request failed");
            Err(error)
        }
    }
}

#[async_trait]
impl DocumentSink for ElasticService {
    async fn bulk_write(&self, documents: Vec<OutputDocument>) -> Result<BulkSummary, SinkError> {
        Ok(self.bulk(&documents).await?)
    }

    async fn record_version(&self, version: &DatasetVersion) -> Result<(), SinkError> {
        Ok(self.put_version(version).await?)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}
