//! Raw records as returned by each upstream catalog.
//!
//! Every field is optional: upstream payloads are inconsistent and the normalizer
//! substitutes defaults. Counts stay as raw JSON values so the normalizer can coerce
//! strings, floats and negatives.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SourceKind;

/// One record from one source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Crossref(CrossrefItem),
    Core(CoreItem),
    Arxiv(ArxivEntry),
    PapersWithCode(PwcResult),
}

impl RawRecord {
    /// Source catalog of this record.
    #[must_use]
    pub const fn source(&self) -> SourceKind {
        match self {
            Self::Crossref(_) => SourceKind::Crossref,
            Self::Core(_) => SourceKind::Core,
            Self::Arxiv(_) => SourceKind::Arxiv,
            Self::PapersWithCode(_) => SourceKind::PapersWithCode,
        }
    }
}

// =============================================================================
// Crossref
// =============================================================================

/// Crossref `/works` response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossrefResponse {
    #[serde(default)]
    pub message: CrossrefMessage,
}

/// Crossref message body. Items are kept as JSON so one bad item cannot spoil a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrossrefMessage {
    #[serde(default)]
    pub items: Vec<Value>,
}

/// A Crossref work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrossrefItem {
    #[serde(rename = "DOI", default)]
    pub doi: Option<String>,

    #[serde(default)]
    pub title: Option<Vec<String>>,

    #[serde(default)]
    pub author: Option<Vec<CrossrefAuthor>>,

    #[serde(default)]
    pub container_title: Option<Vec<String>>,

    #[serde(default)]
    pub published: Option<CrossrefDate>,

    /// JATS-marked-up abstract.
    #[serde(default)]
    pub r#abstract: Option<String>,

    #[serde(default)]
    pub subject: Option<Vec<String>>,

    #[serde(default)]
    pub is_referenced_by_count: Option<Value>,

    #[serde(default)]
    pub reference: Option<Vec<Value>>,
}

impl CrossrefItem {
    /// Crossref returns figure and table components as works; those, and works without
    /// title or abstract, are not articles.
    #[must_use]
    pub fn is_article(&self) -> bool {
        let has_title = self.title.as_ref().is_some_and(|t| t.iter().any(|s| !s.trim().is_empty()));
        let has_abstract = self.r#abstract.as_ref().is_some_and(|a| !a.trim().is_empty());
        let is_component = self
            .doi
            .as_deref()
            .is_some_and(|doi| doi.contains("/fig-") || doi.contains("/table-"));
        has_title && has_abstract && !is_component
    }
}

/// Crossref contributor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossrefAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub given: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
}

/// Crossref partial date: `[[year, month, day]]`, any part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossrefDate {
    #[serde(rename = "date-parts", default)]
    pub date_parts: Vec<Vec<Option<i32>>>,
}

// =============================================================================
// CORE
// =============================================================================

/// CORE `search/works` response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreResponse {
    #[serde(default)]
    pub total_hits: Option<u64>,
    #[serde(default)]
    pub results: Option<Vec<Value>>,
}

/// A CORE work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreItem {
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub authors: Option<Vec<CoreAuthor>>,

    #[serde(default)]
    pub date_published: Option<String>,

    #[serde(default)]
    pub year_published: Option<i32>,

    #[serde(default)]
    pub publisher: Option<String>,

    #[serde(default)]
    pub subjects: Option<Vec<String>>,

    #[serde(default)]
    pub topics: Option<Vec<String>>,

    #[serde(default)]
    pub r#abstract: Option<String>,

    #[serde(default)]
    pub doi: Option<String>,

    #[serde(default)]
    pub download_url: Option<String>,

    #[serde(default)]
    pub full_text_identifier: Option<String>,

    #[serde(default)]
    pub citation_count: Option<Value>,
}

/// CORE author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreAuthor {
    #[serde(default)]
    pub name: Option<String>,
}

// =============================================================================
// arXiv
// =============================================================================

/// An entry of the arXiv Atom feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArxivEntry {
    /// Abstract page URL, e.g. `http://arxiv.org/abs/1234.5678v1`.
    pub id: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub published: Option<String>,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub journal_ref: Option<String>,
}

// =============================================================================
// Papers with Code
// =============================================================================

/// Papers with Code `/search/` response envelope.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PwcResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub results: Vec<Value>,
}

/// One search hit: a paper plus its best repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PwcResult {
    #[serde(default)]
    pub paper: PwcPaper,
    #[serde(default)]
    pub repository: Option<PwcRepository>,
}

/// Papers with Code paper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwcPaper {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub arxiv_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub r#abstract: Option<String>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub conference: Option<String>,
    #[serde(default)]
    pub proceeding: Option<String>,
    #[serde(default)]
    pub url_abs: Option<String>,
    #[serde(default)]
    pub url_pdf: Option<String>,
}

/// Papers with Code repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PwcRepository {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub stars: Option<u64>,
}
