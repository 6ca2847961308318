//! Full-text extraction from a row's parse files.

use crate::{
    corpus::{MetadataRow, ParsedBlock, ParsedBody, read_parse_file},
    metrics::{IngestMetrics, RowEvent},
    relevance::is_relevant_text,
};
use std::path::Path;

/// Normalized text pulled from one parse file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Non-empty blocks joined by newlines, trimmed.
    pub full_text: String,
    /// Trimmed blocks that pass the relevance filter on their own.
    pub paragraphs: Vec<ParsedBlock>,
}

/// What a row's parse-file references produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowText {
    /// The row references no parse file.
    NoFile,
    /// No referenced file yielded body text.
    NoBody,
    /// The first file with body text.
    Found(Extraction),
}

/// Normalize a parsed body into full text and relevant paragraph candidates.
pub fn extract_body(body: &ParsedBody) -> Extraction {
    let mut full_text = String::new();
    let mut paragraphs = Vec::new();

    for block in &body.blocks {
        let text = block.text.trim();
        if text.is_empty() {
            continue;
        }
        full_text.push_str(text);
        full_text.push('\n');
        if is_relevant_text(text) {
            paragraphs.push(ParsedBlock {
                index: block.index,
                text: text.to_string(),
            });
        }
    }

    Extraction {
        full_text: full_text.trim().to_string(),
        paragraphs,
    }
}

/// Try the row's parse files in preference order and keep the first one with body text.
///
/// Missing, unreadable and undecodable files are skipped. Sources are never merged.
pub async fn extract_row(row: &MetadataRow, data_dir: &Path, metrics: &IngestMetrics) -> RowText {
    if !row.has_parse_files() {
        return RowText::NoFile;
    }

    for relative in row.parse_file_candidates() {
        let path = data_dir.join(relative);
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false);
        if !is_file {
            tracing::debug!(cord_uid = %row.cord_uid, path = %path.display(), "Parse file not found");
            metrics.record_row_event(RowEvent::MissingFile);
            continue;
        }

        let body = match read_parse_file(&path).await {
            Ok(body) => body,
            Err(err) => {
                tracing::warn!(cord_uid = %row.cord_uid, error = %err, "Skipping unreadable parse file");
                metrics.record_row_event(RowEvent::UnreadableFile);
                continue;
            }
        };

        let extraction = extract_body(&body);
        if !extraction.full_text.is_empty() {
            return RowText::Found(extraction);
        }
    }

    RowText::NoBody
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn body(texts: &[&str]) -> ParsedBody {
        ParsedBody {
            blocks: texts
                .iter()
                .enumerate()
                .map(|(index, text)| ParsedBlock {
                    index,
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    fn row(pmc: Option<&str>, pdf: Option<&str>) -> MetadataRow {
        MetadataRow {
            cord_uid: "r1".into(),
            title: "Title".into(),
            publish_time: "2020".into(),
            url: String::new(),
            journal: String::new(),
            authors: String::new(),
            abstract_text: String::new(),
            pmc_json_files: pmc.map(str::to_string),
            pdf_json_files: pdf.map(str::to_string),
        }
    }

    fn write_parse_file(dir: &Path, relative: &str, texts: &[&str]) {
        let path = dir.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        let blocks: Vec<_> = texts.iter().map(|text| json!({ "text": text })).collect();
        fs::write(path, json!({ "body_text": blocks }).to_string()).expect("write");
    }

    #[test]
    fn full_text_joins_trimmed_blocks_and_filters_paragraphs() {
        let extraction = extract_body(&body(&[
            "  Intro about COVID-19.  ",
            "   ",
            "Methods without keywords.",
            "SARS-CoV-2 results",
        ]));
        assert_eq!(
            extraction.full_text,
            "Intro about COVID-19.\nMethods without keywords.\nSARS-CoV-2 results"
        );
        let kept: Vec<_> = extraction
            .paragraphs
            .iter()
            .map(|block| (block.index, block.text.as_str()))
            .collect();
        assert_eq!(
            kept,
            vec![(0, "Intro about COVID-19."), (3, "SARS-CoV-2 results")]
        );
    }

    #[test]
    fn blank_body_yields_empty_extraction() {
        assert_eq!(extract_body(&body(&["", "  \n "])), Extraction::default());
    }

    #[tokio::test]
    async fn row_without_references_has_no_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let metrics = IngestMetrics::new();
        let text = extract_row(&row(None, Some("  ")), dir.path(), &metrics).await;
        assert_eq!(text, RowText::NoFile);
    }

    #[tokio::test]
    async fn preferred_source_wins_when_it_has_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_parse_file(dir.path(), "pmc/a.json", &["covid from pmc"]);
        write_parse_file(dir.path(), "pdf/a.json", &["covid from pdf"]);
        let metrics = IngestMetrics::new();

        let text = extract_row(&row(Some("pmc/a.json"), Some("pdf/a.json")), dir.path(), &metrics).await;
        let RowText::Found(extraction) = text else {
            panic!("expected text");
        };
        assert_eq!(extraction.full_text, "covid from pmc");
    }

    #[tokio::test]
    async fn missing_and_empty_sources_fall_through_to_the_next() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_parse_file(dir.path(), "pdf/empty.json", &["   "]);
        write_parse_file(dir.path(), "pdf/full.json", &["covid from second pdf"]);
        fs::write(dir.path().join("broken.json"), "{").expect("write");
        let metrics = IngestMetrics::new();

        let text = extract_row(
            &row(
                Some("pmc/missing.json; broken.json"),
                Some("pdf/empty.json; pdf/full.json"),
            ),
            dir.path(),
            &metrics,
        )
        .await;
        let RowText::Found(extraction) = text else {
            panic!("expected text");
        };
        assert_eq!(extraction.full_text, "covid from second pdf");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.missing_files, 1);
        assert_eq!(snapshot.unreadable_files, 1);
    }

    #[tokio::test]
    async fn directory_reference_is_skipped_like_a_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("pmc")).expect("mkdir");
        let metrics = IngestMetrics::new();

        let text = extract_row(&row(Some("pmc"), None), dir.path(), &metrics).await;
        assert_eq!(text, RowText::NoBody);
        assert_eq!(metrics.snapshot().missing_files, 1);
    }
}
