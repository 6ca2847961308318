//! Output document model: the three indexed variants and the per-identifier aggregate.

use serde::Serialize;
use serde_json::{Value, json};

/// Where abstracts are stored for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbstractMode {
    /// Papers and paragraphs carry an `abstract` field; no abstracts collection exists.
    Inclusive,
    /// Abstracts form their own collection; papers and paragraphs have no `abstract` field.
    Separate,
}

impl AbstractMode {
    /// Whether papers and paragraphs embed the abstract.
    pub fn embeds_abstract(self) -> bool {
        matches!(self, Self::Inclusive)
    }
}

/// Fields shared by every output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BaseFields {
    /// Document identity (`cord_uid`).
    pub cord_uid: String,
    /// Paper title.
    pub title: String,
    /// Publish date exactly as found in the metadata table.
    pub publish_time: String,
    /// Landing page URL.
    pub url: String,
    /// Journal name.
    pub journal: String,
    /// Author list as a single string.
    pub authors: String,
    /// Abstract, populated only in [`AbstractMode::Inclusive`].
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
}

/// Whole paper with its concatenated body text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paper {
    /// Shared metadata.
    #[serde(flatten)]
    pub base: BaseFields,
    /// Full text, paragraphs joined by newlines.
    pub body: String,
}

/// One relevant paragraph of a paper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paragraph {
    /// Shared metadata.
    #[serde(flatten)]
    pub base: BaseFields,
    /// Zero-based position of the block within its parse file.
    pub paragraph_id: usize,
    /// Paragraph text.
    pub body: String,
}

/// Abstract stored in its own collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Abstract {
    /// Shared metadata; `abstract_text` is always `None` here.
    #[serde(flatten)]
    pub base: BaseFields,
    /// Abstract text.
    pub body: String,
}

/// Any document headed for the search backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDocument {
    /// Entry of the `papers` index.
    Paper(Paper),
    /// Entry of the `paragraphs` index.
    Paragraph(Paragraph),
    /// Entry of the `abstracts` index.
    Abstract(Abstract),
}

impl OutputDocument {
    /// Index the document belongs to.
    pub fn kind(&self) -> IndexKind {
        match self {
            Self::Paper(_) => IndexKind::Papers,
            Self::Paragraph(_) => IndexKind::Paragraphs,
            Self::Abstract(_) => IndexKind::Abstracts,
        }
    }

    /// Stable identifier, so a re-run overwrites instead of duplicating.
    pub fn document_id(&self) -> String {
        match self {
            Self::Paper(paper) => paper.base.cord_uid.clone(),
            Self::Paragraph(paragraph) => {
                format!("{}-{}", paragraph.base.cord_uid, paragraph.paragraph_id)
            }
            Self::Abstract(abstract_doc) => abstract_doc.base.cord_uid.clone(),
        }
    }

    /// Shared metadata of the document.
    pub fn base(&self) -> &BaseFields {
        match self {
            Self::Paper(paper) => &paper.base,
            Self::Paragraph(paragraph) => &paragraph.base,
            Self::Abstract(abstract_doc) => &abstract_doc.base,
        }
    }

    /// JSON source stored in the index.
    pub fn to_source(&self) -> Result<Value, serde_json::Error> {
        match self {
            Self::Paper(paper) => serde_json::to_value(paper),
            Self::Paragraph(paragraph) => serde_json::to_value(paragraph),
            Self::Abstract(abstract_doc) => serde_json::to_value(abstract_doc),
        }
    }
}

/// Everything produced for one document identity.
///
/// Paragraphs are only ever present alongside a paper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet {
    /// Whole paper, absent without relevant full text.
    pub paper: Option<Paper>,
    /// Relevant paragraphs in parse-file order.
    pub paragraphs: Vec<Paragraph>,
    /// Separate abstract, only built in [`AbstractMode::Separate`].
    pub abstract_doc: Option<Abstract>,
}

impl DocumentSet {
    /// Whether the set would contribute nothing to a batch.
    pub fn is_empty(&self) -> bool {
        self.paper.is_none() && self.paragraphs.is_empty() && self.abstract_doc.is_none()
    }

    /// Character length of the abstract, wherever the run mode put it.
    pub fn abstract_len(&self) -> usize {
        if let Some(abstract_doc) = &self.abstract_doc {
            return abstract_doc.body.chars().count();
        }
        self.paper
            .as_ref()
            .and_then(|paper| paper.base.abstract_text.as_deref())
            .map_or(0, |text| text.chars().count())
    }

    /// Character length of the paper body, zero without a paper.
    pub fn body_len(&self) -> usize {
        self.paper
            .as_ref()
            .map_or(0, |paper| paper.body.chars().count())
    }
}

/// The fixed set of indices the pipeline writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Whole papers.
    Papers,
    /// Single paragraphs.
    Paragraphs,
    /// Separate abstracts.
    Abstracts,
}

const TEXT: &str = "text";
const KEYWORD: &str = "keyword";

impl IndexKind {
    /// Indices used by a run in the given mode.
    pub fn for_mode(mode: AbstractMode) -> &'static [IndexKind] {
        match mode {
            AbstractMode::Inclusive => &[Self::Papers, Self::Paragraphs],
            AbstractMode::Separate => &[Self::Papers, Self::Paragraphs, Self::Abstracts],
        }
    }

    /// Index name in the search backend.
    pub fn index_name(self) -> &'static str {
        match self {
            Self::Papers => "papers",
            Self::Paragraphs => "paragraphs",
            Self::Abstracts => "abstracts",
        }
    }

    /// Field names and mapping types stored for this index.
    pub fn fields(self, mode: AbstractMode) -> Vec<(&'static str, &'static str)> {
        let mut fields = vec![
            ("cord_uid", KEYWORD),
            ("title", KEYWORD),
            ("publish_time", KEYWORD),
            ("url", KEYWORD),
            ("journal", KEYWORD),
            ("authors", TEXT),
            ("body", TEXT),
        ];
        if self == Self::Paragraphs {
            fields.push(("paragraph_id", KEYWORD));
        }
        if self != Self::Abstracts && mode.embeds_abstract() {
            fields.push(("abstract", TEXT));
        }
        fields
    }

    /// Index creation body: BM25 similarity plus the static field mapping.
    pub fn index_definition(self, mode: AbstractMode) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .fields(mode)
            .into_iter()
            .map(|(name, kind)| (name.to_string(), json!({ "type": kind })))
            .collect();
        json!({
            "settings": {
                "similarity": { "default": { "type": "BM25" } }
            },
            "mappings": { "properties": properties }
        })
    }
}
