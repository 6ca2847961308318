//! Topical relevance predicate for COVID-19 literature.
//!
//! Matching is a plain substring search over ASCII-lowercased text. The keyword list spells out
//! every name, acronym and separator variant the corpus uses, so no tokenization or stemming is
//! applied.

/// Lowercase keyword variants; a text is relevant when it contains any of them.
pub const KEYWORDS: &[&str] = &[
    "covid-19",
    "covid 19",
    "covid19",
    "covid",
    "sars-cov-2",
    "sars cov 2",
    "sars-cov2",
    "sars cov2",
    "sarscov2",
    "sarscov-2",
    "2019-ncov",
    "2019 ncov",
    "2019ncov",
    "ncov-2019",
    "ncov 2019",
    "ncov2019",
    "2019 novel coronavirus",
    "2019-novel coronavirus",
    "coronavirus disease 2019",
    "coronavirus disease-2019",
    "severe acute respiratory syndrome coronavirus 2",
    "severe acute respiratory syndrome coronavirus-2",
];

/// Whether `text` mentions the target topic.
pub fn is_relevant_text(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let folded = text.to_ascii_lowercase();
    KEYWORDS.iter().any(|keyword| folded.contains(keyword))
}

/// Whether a metadata row qualifies from its title and abstract alone.
pub fn is_relevant_metadata(title: &str, abstract_text: &str) -> bool {
    is_relevant_text(title) || is_relevant_text(abstract_text)
}
