//! Input models for MCP tool parameters and view filters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ResponseFormat, ScoringMode, SortOption};

/// User-selected view predicates. All optional and AND-combined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterCriteria {
    /// Earliest publication date (inclusive).
    #[serde(default)]
    pub start_date: Option<NaiveDate>,

    /// Latest publication date (inclusive).
    #[serde(default)]
    pub end_date: Option<NaiveDate>,

    /// Allowed venues; empty means any venue.
    #[serde(default)]
    pub journals: Vec<String>,

    /// Minimum citation count.
    #[serde(default)]
    pub min_citations: Option<u64>,
}

impl FilterCriteria {
    /// Returns true if no predicate is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.journals.is_empty()
            && self.min_citations.is_none()
    }
}

/// Input for a fresh multi-source search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchArticlesInput {
    /// Free-text query (e.g., "quantum computing").
    pub query: String,

    /// Override the configured relevance scoring strategy.
    #[serde(default)]
    pub scoring_mode: Option<ScoringMode>,

    /// Maximum articles to render.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

fn default_limit() -> usize {
    20
}

/// Input for tools that only render the current view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewInput {
    /// Maximum articles to render.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

impl Default for ViewInput {
    fn default() -> Self {
        Self { limit: default_limit(), response_format: ResponseFormat::default() }
    }
}

/// Input for re-sorting the current view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortArticlesInput {
    /// Sort key.
    pub sort_by: SortOption,

    /// Maximum articles to render.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for applying view filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyFiltersInput {
    /// Filter predicates.
    #[serde(flatten)]
    pub criteria: FilterCriteria,

    /// Maximum articles to render.
    #[serde(default = "default_limit")]
    pub limit: usize,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}

/// Input for abstract feature extraction.
///
/// Exactly one of `abstract` or `doi` is expected; `doi` looks the abstract up in the
/// current corpus.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractFeaturesInput {
    /// Abstract text.
    #[serde(default)]
    pub r#abstract: Option<String>,

    /// DOI of an article already in the session corpus.
    #[serde(default)]
    pub doi: Option<String>,

    /// Output format.
    #[serde(default)]
    pub response_format: ResponseFormat,
}
