use std::sync::atomic::{AtomicU64, Ordering};

/// Per-run counters describing what the pipeline read, skipped and emitted.
#[derive(Default)]
pub struct IngestMetrics {
    rows_read: AtomicU64,
    groups: AtomicU64,
    duplicate_rows: AtomicU64,
    missing_files: AtomicU64,
    unreadable_files: AtomicU64,
    papers_without_file: AtomicU64,
    papers_without_body: AtomicU64,
    irrelevant_papers: AtomicU64,
    papers_without_abstract: AtomicU64,
    papers: AtomicU64,
    paragraphs: AtomicU64,
    abstracts: AtomicU64,
    flushes: AtomicU64,
}

/// Row-level outcome recorded while building a document set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowEvent {
    /// A referenced parse file does not exist or is not a regular file.
    MissingFile,
    /// A parse file exists but could not be read or decoded.
    UnreadableFile,
    /// The row references no parse file at all.
    WithoutFile,
    /// No candidate produced any body text.
    WithoutBody,
    /// Body text was found but failed the relevance filter.
    Irrelevant,
    /// The row's abstract is empty.
    WithoutAbstract,
}

impl IngestMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a metadata group and how many rows it collapsed.
    pub fn record_group(&self, rows: usize) {
        let rows = rows as u64;
        self.groups.fetch_add(1, Ordering::Relaxed);
        self.rows_read.fetch_add(rows, Ordering::Relaxed);
        self.duplicate_rows
            .fetch_add(rows.saturating_sub(1), Ordering::Relaxed);
    }

    /// Record a row-level event.
    pub fn record_row_event(&self, event: RowEvent) {
        let counter = match event {
            RowEvent::MissingFile => &self.missing_files,
            RowEvent::UnreadableFile => &self.unreadable_files,
            RowEvent::WithoutFile => &self.papers_without_file,
            RowEvent::WithoutBody => &self.papers_without_body,
            RowEvent::Irrelevant => &self.irrelevant_papers,
            RowEvent::WithoutAbstract => &self.papers_without_abstract,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful bulk write and the documents it carried.
    pub fn record_flush(&self, papers: usize, paragraphs: usize, abstracts: usize) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
        self.papers.fetch_add(papers as u64, Ordering::Relaxed);
        self.paragraphs
            .fetch_add(paragraphs as u64, Ordering::Relaxed);
        self.abstracts
            .fetch_add(abstracts as u64, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        MetricsSnapshot {
            rows_read: load(&self.rows_read),
            groups: load(&self.groups),
            duplicate_rows: load(&self.duplicate_rows),
            missing_files: load(&self.missing_files),
            unreadable_files: load(&self.unreadable_files),
            papers_without_file: load(&self.papers_without_file),
            papers_without_body: load(&self.papers_without_body),
            irrelevant_papers: load(&self.irrelevant_papers),
            papers_without_abstract: load(&self.papers_without_abstract),
            papers: load(&self.papers),
            paragraphs: load(&self.paragraphs),
            abstracts: load(&self.abstracts),
            flushes: load(&self.flushes),
        }
    }
}

/// Immutable view of the run counters used for the final report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Metadata rows processed.
    pub rows_read: u64,
    /// Distinct document identities.
    pub groups: u64,
    /// Rows folded into an earlier row of the same identity.
    pub duplicate_rows: u64,
    /// Referenced parse files that were not found.
    pub missing_files: u64,
    /// Parse files that could not be read or decoded.
    pub unreadable_files: u64,
    /// Rows without any parse file reference.
    pub papers_without_file: u64,
    /// Rows whose parse files held no body text.
    pub papers_without_body: u64,
    /// Rows whose body text failed the relevance filter.
    pub irrelevant_papers: u64,
    /// Rows with an empty abstract.
    pub papers_without_abstract: u64,
    /// Papers written to the backend.
    pub papers: u64,
    /// Paragraphs written to the backend.
    pub paragraphs: u64,
    /// Abstracts written to the backend.
    pub abstracts: u64,
    /// Bulk writes issued.
    pub flushes: u64,
}
