//! Indexer entrypoint.
//!
//! Reads a CORD-19 snapshot directory and writes papers, paragraphs and abstracts to
//! Elasticsearch in bulk. `--dry-run` runs the same pipeline against a sink that counts and drops documents.
use anyhow::{Context, Result};
use clap::Parser;
use cordindex::{
    config::{self, ConfigOverrides},
    elastic::ElasticService,
    logging,
    processing::{IndexingService, RunSummary},
    sink::MemorySink,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cordindex",
    version,
    about = "Index a CORD-19 snapshot into papers, paragraphs and abstracts"
)]
struct Cli {
    /// Directory containing the CORD-19 snapshot (e.g. data/cord19-2021-05-03).
    #[arg(short = 'd', long)]
    data_dir: Option<PathBuf>,
    /// Metadata table to use instead of `<data_dir>/metadata.csv`.
    #[arg(short = 'm', long = "metadata")]
    metadata_path: Option<PathBuf>,
    /// Elasticsearch base URL.
    #[arg(long)]
    elastic_url: Option<String>,
    /// Add an abstract field to papers and paragraphs instead of an abstracts index.
    #[arg(short = 'i', long)]
    incl_abs: bool,
    /// Papers buffered before each bulk write.
    #[arg(short = 'b', long)]
    batch_size: Option<usize>,
    /// Build everything but write nothing to Elasticsearch.
    #[arg(long)]
    dry_run: bool,
    /// Do not draw the progress bar.
    #[arg(long)]
    no_progress: bool,
}

#[tokio::main]
async fn main() {
    logging::init_tracing();

    if let Err(err) = run(Cli::parse()).await {
        tracing::error!(error = %err, "Indexing failed");
        for cause in err.chain().skip(1) {
            tracing::error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = config::init_config(ConfigOverrides {
        elastic_url: cli.elastic_url,
        data_dir: cli.data_dir,
        metadata_path: cli.metadata_path,
        batch_size: cli.batch_size,
        incl_abs: cli.incl_abs,
    })
    .context("invalid configuration")?;
    let options = config
        .indexing_options(!cli.no_progress)
        .context("invalid configuration")?;
    let mode = options.abstract_mode;

    let summary = if cli.dry_run {
        tracing::info!("Dry run: documents will not be written");
        IndexingService::new(MemorySink::discarding(), options)
            .run()
            .await
            .context("indexing run failed")?
    } else {
        let elastic = ElasticService::new(&config).context("failed to build Elasticsearch client")?;
        elastic
            .ensure_indexes(mode)
            .await
            .context("failed to prepare Elasticsearch indexes")?;
        IndexingService::new(elastic, options)
            .run()
            .await
            .context("indexing run failed")?
    };

    report(&summary);
    Ok(())
}

fn report(summary: &RunSummary) {
    let metrics = &summary.metrics;
    match summary.version {
        Some(version) => tracing::info!(version = %version, "Dataset version"),
        None => tracing::info!("Dataset version unknown"),
    }
    tracing::info!(
        papers = metrics.papers,
        paragraphs = metrics.paragraphs,
        abstracts = metrics.abstracts,
        flushes = metrics.flushes,
        "Documents written"
    );
}
