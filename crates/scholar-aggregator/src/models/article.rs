//! Canonical article records shared by every pipeline stage.

use serde::{Deserialize, Serialize};

use super::SourceKind;
use crate::config::placeholders;

/// A scholarly article in the canonical schema.
///
/// Produced by the normalizer. Required text fields are never empty: missing source
/// data is replaced by the strings in [`placeholders`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Article title.
    pub title: String,

    /// Comma-joined author display string.
    pub authors: String,

    /// Best-effort ISO-like publication date; may be year-only.
    pub date: String,

    /// Venue or publisher display name.
    pub journal: String,

    /// Subject or category labels.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Markup-free abstract.
    pub r#abstract: String,

    /// DOI or `arxiv:<id>`, or the "No DOI available" sentinel.
    pub doi: String,

    /// Citations received.
    #[serde(default)]
    pub citation_count: u64,

    /// References made.
    #[serde(default)]
    pub reference_count: u64,

    /// Full-text download link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,

    /// Linked code repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,

    /// arXiv identifier including version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arxiv_id: Option<String>,

    /// Catalog the record came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceKind>,
}

impl Article {
    /// Returns true if `doi` holds a real identifier rather than the sentinel.
    #[must_use]
    pub fn has_doi(&self) -> bool {
        let doi = self.doi.trim();
        !doi.is_empty() && doi != placeholders::NO_DOI
    }

    /// Returns true if the abstract is real text rather than the placeholder.
    #[must_use]
    pub fn has_abstract(&self) -> bool {
        self.r#abstract != placeholders::NO_ABSTRACT
    }

    /// Text used for relevance scoring: title and abstract.
    #[must_use]
    pub fn document_text(&self) -> String {
        format!("{} {}", self.title, self.r#abstract)
    }
}

impl Default for Article {
    fn default() -> Self {
        Self {
            title: placeholders::NO_TITLE.to_string(),
            authors: placeholders::NO_AUTHORS.to_string(),
            date: placeholders::NO_DATE.to_string(),
            journal: placeholders::NO_JOURNAL.to_string(),
            tags: Vec::new(),
            r#abstract: placeholders::NO_ABSTRACT.to_string(),
            doi: placeholders::NO_DOI.to_string(),
            citation_count: 0,
            reference_count: 0,
            download_url: None,
            repository_url: None,
            arxiv_id: None,
            source: None,
        }
    }
}

/// An article with query-dependent scores attached.
///
/// Scores only mean something relative to the search that produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhancedArticle {
    /// Canonical record.
    #[serde(flatten)]
    pub article: Article,

    /// Semantic vector; empty when no embedding was available.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Vec<f32>,

    /// Query relevance in `[0, 1]` (BM25 after min-max) or cosine similarity.
    #[serde(default)]
    pub relevance_score: f64,

    /// Composite score defining the default ordering.
    #[serde(default)]
    pub ranking_score: f64,
}

impl EnhancedArticle {
    /// Wrap an article with zeroed scores.
    #[must_use]
    pub fn unscored(article: Article) -> Self {
        Self { article, embedding: Vec::new(), relevance_score: 0.0, ranking_score: 0.0 }
    }
}

impl From<Article> for EnhancedArticle {
    fn from(article: Article) -> Self {
        Self::unscored(article)
    }
}

impl AsRef<Article> for Article {
    fn as_ref(&self) -> &Article {
        self
    }
}

impl AsRef<Article> for EnhancedArticle {
    fn as_ref(&self) -> &Article {
        &self.article
    }
}
