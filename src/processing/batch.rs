//! Pending write batch owned by the driver.

use crate::documents::{Abstract, AbstractMode, DocumentSet, OutputDocument, Paper, Paragraph};

/// Documents waiting for the next bulk write.
#[derive(Debug)]
pub struct Batch {
    mode: AbstractMode,
    papers: Vec<Paper>,
    paragraphs: Vec<Paragraph>,
    abstracts: Vec<Abstract>,
}

/// Per-collection sizes of a drained batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCounts {
    /// Papers in the batch.
    pub papers: usize,
    /// Paragraphs in the batch.
    pub paragraphs: usize,
    /// Abstracts in the batch.
    pub abstracts: usize,
}

impl Batch {
    /// Create an empty batch for a run in `mode`.
    pub fn new(mode: AbstractMode) -> Self {
        Self {
            mode,
            papers: Vec::new(),
            paragraphs: Vec::new(),
            abstracts: Vec::new(),
        }
    }

    /// Append the non-empty parts of a set.
    pub fn extend(&mut self, set: DocumentSet) {
        let DocumentSet {
            paper,
            paragraphs,
            abstract_doc,
        } = set;
        self.papers.extend(paper);
        self.paragraphs.extend(paragraphs);
        if !self.mode.embeds_abstract() {
            self.abstracts.extend(abstract_doc);
        }
    }

    /// Papers pending; the flush threshold is measured against this.
    pub fn paper_count(&self) -> usize {
        self.papers.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.papers.is_empty() && self.paragraphs.is_empty() && self.abstracts.is_empty()
    }

    /// Per-collection sizes.
    pub fn counts(&self) -> BatchCounts {
        BatchCounts {
            papers: self.papers.len(),
            paragraphs: self.paragraphs.len(),
            abstracts: self.abstracts.len(),
        }
    }

    /// Drain the batch into write order: papers, then paragraphs, then abstracts.
    pub fn take(&mut self) -> Vec<OutputDocument> {
        let mut documents =
            Vec::with_capacity(self.papers.len() + self.paragraphs.len() + self.abstracts.len());
        documents.extend(self.papers.drain(..).map(OutputDocument::Paper));
        documents.extend(self.paragraphs.drain(..).map(OutputDocument::Paragraph));
        documents.extend(self.abstracts.drain(..).map(OutputDocument::Abstract));
        documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{BaseFields, IndexKind};

    fn base() -> BaseFields {
        BaseFields {
            cord_uid: "u".into(),
            title: String::new(),
            publish_time: String::new(),
            url: String::new(),
            journal: String::new(),
            authors: String::new(),
            abstract_text: None,
        }
    }

    fn full_set() -> DocumentSet {
        DocumentSet {
            paper: Some(Paper {
                base: base(),
                body: "covid".into(),
            }),
            paragraphs: vec![Paragraph {
                base: base(),
                paragraph_id: 0,
                body: "covid".into(),
            }],
            abstract_doc: Some(Abstract {
                base: base(),
                body: "abstract".into(),
            }),
        }
    }

    #[test]
    fn take_orders_documents_by_collection_and_resets() {
        let mut batch = Batch::new(AbstractMode::Separate);
        batch.extend(full_set());
        batch.extend(DocumentSet::default());
        assert_eq!(batch.paper_count(), 1);
        assert_eq!(
            batch.counts(),
            BatchCounts {
                papers: 1,
                paragraphs: 1,
                abstracts: 1
            }
        );

        let kinds: Vec<_> = batch.take().iter().map(OutputDocument::kind).collect();
        assert_eq!(
            kinds,
            vec![IndexKind::Papers, IndexKind::Paragraphs, IndexKind::Abstracts]
        );
        assert!(batch.is_empty());
        assert_eq!(batch.paper_count(), 0);
    }

    #[test]
    fn inclusive_batches_never_hold_abstracts() {
        let mut batch = Batch::new(AbstractMode::Inclusive);
        batch.extend(full_set());
        assert_eq!(batch.counts().abstracts, 0);
    }
}
