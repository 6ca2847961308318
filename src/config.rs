use crate::documents::AbstractMode;
use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default Elasticsearch endpoint used when `ELASTIC_URL` is not set.
pub const DEFAULT_ELASTIC_URL: &str = "http://localhost:9200";
/// Default number of papers buffered before a bulk write.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Metadata table name looked up inside the data directory.
pub const METADATA_FILE_NAME: &str = "metadata.csv";

/// Errors encountered while loading configuration from environment variables and flags.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for an indexing run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Elasticsearch cluster receiving the documents.
    pub elastic_url: String,
    /// Optional API key sent with every backend request.
    pub elastic_api_key: Option<String>,
    /// Root of the corpus snapshot holding the parse files.
    pub data_dir: Option<PathBuf>,
    /// Optional override for the metadata table location.
    pub metadata_path: Option<PathBuf>,
    /// Papers-per-flush threshold.
    pub batch_size: usize,
    /// Embed abstracts into papers and paragraphs instead of a separate collection.
    pub incl_abs: bool,
}

/// Values supplied on the command line; each one wins over its environment counterpart.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// `--elastic-url`
    pub elastic_url: Option<String>,
    /// `--data-dir`
    pub data_dir: Option<PathBuf>,
    /// `--metadata`
    pub metadata_path: Option<PathBuf>,
    /// `--batch-size`
    pub batch_size: Option<usize>,
    /// `--incl-abs`; only ever switches the mode on.
    pub incl_abs: bool,
}

/// Pipeline settings resolved once at startup and handed to the driver.
#[derive(Debug, Clone)]
pub struct IndexingOptions {
    /// Root of the parse files; also the source of the dataset version.
    pub data_dir: PathBuf,
    /// Location of the metadata table.
    pub metadata_path: PathBuf,
    /// Papers-per-flush threshold, always greater than zero.
    pub batch_size: usize,
    /// Where abstracts end up for this run.
    pub abstract_mode: AbstractMode,
    /// Whether to draw a progress bar while reading metadata rows.
    pub show_progress: bool,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            elastic_url: optional("ELASTIC_URL").unwrap_or_else(|| DEFAULT_ELASTIC_URL.to_string()),
            elastic_api_key: optional("ELASTIC_API_KEY"),
            data_dir: optional("CORD_DATA_DIR").map(PathBuf::from),
            metadata_path: optional("CORD_METADATA_PATH").map(PathBuf::from),
            batch_size: optional("CORD_BATCH_SIZE")
                .map(|value| parse_batch_size(&value, "CORD_BATCH_SIZE"))
                .transpose()?
                .unwrap_or(DEFAULT_BATCH_SIZE),
            incl_abs: optional("CORD_INCL_ABS")
                .map(|value| parse_flag(&value, "CORD_INCL_ABS"))
                .transpose()?
                .unwrap_or(false),
        })
    }

    /// Apply command-line values on top of the environment configuration.
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(url) = overrides.elastic_url {
            self.elastic_url = url;
        }
        if let Some(dir) = overrides.data_dir {
            self.data_dir = Some(dir);
        }
        if let Some(path) = overrides.metadata_path {
            self.metadata_path = Some(path);
        }
        if let Some(size) = overrides.batch_size {
            if size == 0 {
                return Err(ConfigError::InvalidValue("--batch-size".into()));
            }
            self.batch_size = size;
        }
        self.incl_abs |= overrides.incl_abs;
        Ok(self)
    }

    /// Abstract handling selected for this run.
    pub fn abstract_mode(&self) -> AbstractMode {
        if self.incl_abs {
            AbstractMode::Inclusive
        } else {
            AbstractMode::Separate
        }
    }

    /// Resolve the pipeline settings, failing when no data directory was configured.
    pub fn indexing_options(&self, show_progress: bool) -> Result<IndexingOptions, ConfigError> {
        let data_dir = self
            .data_dir
            .clone()
            .ok_or_else(|| ConfigError::MissingVariable("CORD_DATA_DIR".into()))?;
        let metadata_path = self
            .metadata_path
            .clone()
            .unwrap_or_else(|| data_dir.join(METADATA_FILE_NAME));

        Ok(IndexingOptions {
            data_dir,
            metadata_path,
            batch_size: self.batch_size,
            abstract_mode: self.abstract_mode(),
            show_progress,
        })
    }
}

fn parse_batch_size(value: &str, key: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

fn parse_flag(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Load `.env`, read the environment, and merge command-line overrides.
pub fn init_config(overrides: ConfigOverrides) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?.with_overrides(overrides)?;
    tracing::debug!(
        elastic_url = %config.elastic_url,
        has_api_key = config.elastic_api_key.is_some(),
        data_dir = ?config.data_dir,
        metadata_path = ?config.metadata_path,
        batch_size = config.batch_size,
        incl_abs = config.incl_abs,
        "Loaded configuration"
    );
    Ok(config)
}
