//! Mapping from metadata rows and extracted text to output documents.

use crate::{
    corpus::{MetadataRow, ParsedBlock},
    documents::{Abstract, AbstractMode, BaseFields, DocumentSet, Paper, Paragraph},
    processing::extract::Extraction,
    relevance::{is_relevant_metadata, is_relevant_text},
};

fn trimmed(value: &str) -> String {
    value.trim().to_string()
}

/// Shared fields of every document built from `row`.
pub fn base_fields(row: &MetadataRow, mode: AbstractMode) -> BaseFields {
    BaseFields {
        cord_uid: row.cord_uid.clone(),
        title: trimmed(&row.title),
        publish_time: trimmed(&row.publish_time),
        url: trimmed(&row.url),
        journal: trimmed(&row.journal),
        authors: trimmed(&row.authors),
        abstract_text: mode
            .embeds_abstract()
            .then(|| trimmed(&row.abstract_text)),
    }
}

/// Build the whole-paper document.
pub fn paper_from_row(row: &MetadataRow, full_text: &str, mode: AbstractMode) -> Paper {
    Paper {
        base: base_fields(row, mode),
        body: full_text.to_string(),
    }
}

/// Build one paragraph document from an extracted block.
pub fn paragraph_from_row(row: &MetadataRow, block: &ParsedBlock, mode: AbstractMode) -> Paragraph {
    Paragraph {
        base: base_fields(row, mode),
        paragraph_id: block.index,
        body: block.text.clone(),
    }
}

/// Build the separate abstract document.
pub fn abstract_from_row(row: &MetadataRow) -> Abstract {
    Abstract {
        base: base_fields(row, AbstractMode::Separate),
        body: trimmed(&row.abstract_text),
    }
}

/// Build everything one row contributes.
///
/// A paper needs relevant full text, and paragraphs only accompany a paper. In separate mode
/// the abstract is built when it is non-empty and the row's title or abstract is relevant.
pub fn build_document_set(
    row: &MetadataRow,
    extraction: Option<&Extraction>,
    mode: AbstractMode,
) -> DocumentSet {
    let mut set = DocumentSet::default();

    if let Some(extraction) = extraction
        && !extraction.full_text.is_empty()
        && is_relevant_text(&extraction.full_text)
    {
        set.paper = Some(paper_from_row(row, &extraction.full_text, mode));
        set.paragraphs = extraction
            .paragraphs
            .iter()
            .map(|block| paragraph_from_row(row, block, mode))
            .collect();
    }

    if !mode.embeds_abstract() {
        let abstract_text = row.abstract_text.trim();
        if !abstract_text.is_empty() && is_relevant_metadata(&row.title, abstract_text) {
            set.abstract_doc = Some(abstract_from_row(row));
        }
    }

    set
}
