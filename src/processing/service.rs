//! Indexing driver: metadata grouping, per-group build and dedup, batching and flushes.

use crate::{
    config::IndexingOptions,
    corpus::{DatasetVersion, MetadataRow, RowGroup, group_rows, read_metadata},
    documents::DocumentSet,
    metrics::{IngestMetrics, RowEvent},
    processing::{
        batch::Batch,
        dedup::collapse,
        extract::{RowText, extract_row},
        mappers::build_document_set,
        types::{IndexingError, RunSummary},
    },
    sink::DocumentSink,
};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Runs one full pass over a corpus snapshot and writes the result to a sink.
///
/// Groups are processed in order of first appearance in the metadata table and the batch is
/// owned by the running call, so two runs over unchanged input issue identical bulk writes.
pub struct IndexingService<S> {
    sink: S,
    options: IndexingOptions,
}

impl<S: DocumentSink> IndexingService<S> {
    /// Build a driver around a sink and the resolved run options.
    pub fn new(sink: S, options: IndexingOptions) -> Self {
        Self { sink, options }
    }

    /// Sink receiving the writes.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Execute the pipeline end to end.
    pub async fn run(&self) -> Result<RunSummary, IndexingError> {
        let metrics = IngestMetrics::new();
        let version = self.record_version().await?;

        let metadata_path = &self.options.metadata_path;
        tracing::info!(path = %metadata_path.display(), "Processing metadata");
        let rows = read_metadata(metadata_path).await?;
        let progress = progress_bar(rows.len() as u64, self.options.show_progress);
        let groups = group_rows(rows);
        tracing::debug!(groups = groups.len(), "Grouped metadata rows");

        let mut batch = Batch::new(self.options.abstract_mode);
        for group in &groups {
            let set = self.build_group(group, &metrics).await;
            batch.extend(set);
            progress.inc(group.rows.len() as u64);

            if batch.paper_count() >= self.options.batch_size {
                self.flush(&mut batch, &metrics).await?;
            }
        }

        if !batch.is_empty() {
            self.flush(&mut batch, &metrics).await?;
        }
        progress.finish_and_clear();

        let snapshot = metrics.snapshot();
        tracing::info!(
            rows = snapshot.rows_read,
            groups = snapshot.groups,
            duplicate_rows = snapshot.duplicate_rows,
            missing_files = snapshot.missing_files,
            unreadable_files = snapshot.unreadable_files,
            papers_without_file = snapshot.papers_without_file,
            papers_without_body = snapshot.papers_without_body,
            irrelevant_papers = snapshot.irrelevant_papers,
            papers_without_abstract = snapshot.papers_without_abstract,
            papers = snapshot.papers,
            paragraphs = snapshot.paragraphs,
            abstracts = snapshot.abstracts,
            flushes = snapshot.flushes,
            "Indexing finished"
        );

        Ok(RunSummary {
            version,
            metrics: snapshot,
        })
    }

    /// Build every row of a group and keep the richest result.
    pub async fn build_group(&self, group: &RowGroup, metrics: &IngestMetrics) -> DocumentSet {
        metrics.record_group(group.rows.len());
        let mut sets = Vec::with_capacity(group.rows.len());
        for row in &group.rows {
            sets.push(self.build_row(row, metrics).await);
        }
        if sets.len() > 1 {
            tracing::debug!(cord_uid = %group.cord_uid, rows = sets.len(), "Collapsing duplicate rows");
        }
        collapse(sets)
    }

    async fn build_row(&self, row: &MetadataRow, metrics: &IngestMetrics) -> DocumentSet {
        let mode = self.options.abstract_mode;
        let text = extract_row(row, &self.options.data_dir, metrics).await;
        let extraction = match &text {
            RowText::Found(extraction) => Some(extraction),
            RowText::NoFile => {
                metrics.record_row_event(RowEvent::WithoutFile);
                metrics.record_row_event(RowEvent::WithoutBody);
                None
            }
            RowText::NoBody => {
                metrics.record_row_event(RowEvent::WithoutBody);
                None
            }
        };

        let set = build_document_set(row, extraction, mode);
        if extraction.is_some() && set.paper.is_none() {
            metrics.record_row_event(RowEvent::Irrelevant);
        }
        if !mode.embeds_abstract() && row.abstract_text.trim().is_empty() {
            metrics.record_row_event(RowEvent::WithoutAbstract);
        }
        set
    }

    async fn record_version(&self) -> Result<Option<DatasetVersion>, IndexingError> {
        let data_dir = &self.options.data_dir;
        let Some(version) = DatasetVersion::from_data_dir(data_dir) else {
            tracing::warn!(
                data_dir = %data_dir.display(),
                "Could not parse a release date from the data directory name; skipping version record"
            );
            return Ok(None);
        };
        self.sink.record_version(&version).await?;
        Ok(Some(version))
    }

    async fn flush(&self, batch: &mut Batch, metrics: &IngestMetrics) -> Result<(), IndexingError> {
        let counts = batch.counts();
        let documents = batch.take();
        let summary = self.sink.bulk_write(documents).await?;
        metrics.record_flush(counts.papers, counts.paragraphs, counts.abstracts);
        tracing::debug!(
            papers = counts.papers,
            paragraphs = counts.paragraphs,
            abstracts = counts.abstracts,
            written = summary.written,
            "Flushed batch"
        );
        Ok(())
    }
}

fn progress_bar(rows: u64, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(rows);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} rows ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
    progress
}
