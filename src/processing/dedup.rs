//! Collapse the document sets of rows that share an identifier.

use crate::documents::DocumentSet;

/// Information content of a set, compared field by field in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Richness {
    /// Abstract length in characters.
    pub abstract_len: usize,
    /// Paper body length in characters.
    pub body_len: usize,
    /// Number of paragraphs.
    pub paragraphs: usize,
}

impl Richness {
    /// Measure a set; absent parts count as zero.
    pub fn of(set: &DocumentSet) -> Self {
        Self {
            abstract_len: set.abstract_len(),
            body_len: set.body_len(),
            paragraphs: set.paragraphs.len(),
        }
    }
}

/// Keep `candidate` only when it is strictly richer than `kept`; ties keep `kept`.
pub fn select_richer(kept: DocumentSet, candidate: DocumentSet) -> DocumentSet {
    if Richness::of(&candidate) > Richness::of(&kept) {
        candidate
    } else {
        kept
    }
}

/// Fold sets left to right into the richest one.
pub fn collapse<I>(sets: I) -> DocumentSet
where
    I: IntoIterator<Item = DocumentSet>,
{
    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return DocumentSet::default();
    };
    sets.fold(first, select_richer)
}
