//! Enumeration types for pipeline configuration and tool parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// Machine-readable JSON format.
    Json,
}

impl ResponseFormat {
    /// Check if this is markdown format.
    #[must_use]
    pub const fn is_markdown(self) -> bool {
        matches!(self, Self::Markdown)
    }

    /// Check if this is JSON format.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

impl FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown response format '{other}' (expected markdown or json)")),
        }
    }
}

/// Sort key for the presentation view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOption {
    /// Descending relevance score.
    #[default]
    Relevance,
    /// Descending citation count.
    CitationCount,
    /// Descending publication date.
    Date,
}

impl SortOption {
    /// Wire name of the sort key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::CitationCount => "citationCount",
            Self::Date => "date",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', '-'], "").as_str() {
            "relevance" => Ok(Self::Relevance),
            "citationcount" | "citations" => Ok(Self::CitationCount),
            "date" => Ok(Self::Date),
            other => Err(format!(
                "unknown sort option '{other}' (expected relevance, citationCount or date)"
            )),
        }
    }
}

/// Relevance scoring strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// BM25 over the fetched corpus.
    #[default]
    Lexical,
    /// Cosine similarity of embeddings from an external model.
    Semantic,
}

impl FromStr for ScoringMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lexical" | "bm25" => Ok(Self::Lexical),
            "semantic" | "embedding" => Ok(Self::Semantic),
            other => Err(format!("unknown scoring mode '{other}' (expected lexical or semantic)")),
        }
    }
}

/// External catalog an article was fetched from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    Crossref,
    Core,
    Arxiv,
    PapersWithCode,
}

impl SourceKind {
    /// Human-readable source name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Crossref => "Crossref",
            Self::Core => "CORE",
            Self::Arxiv => "arXiv",
            Self::PapersWithCode => "Papers with Code",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_option_serde_names() {
        assert_eq!(serde_json::to_string(&SortOption::CitationCount).unwrap(), "\"citationCount\"");
        let parsed: SortOption = serde_json::from_str("\"date\"").unwrap();
        assert_eq!(parsed, SortOption::Date);
    }

    #[test]
    fn test_sort_option_from_str() {
        assert_eq!("citation_count".parse::<SortOption>().unwrap(), SortOption::CitationCount);
        assert_eq!("citationCount".parse::<SortOption>().unwrap(), SortOption::CitationCount);
        assert_eq!("Relevance".parse::<SortOption>().unwrap(), SortOption::Relevance);
        assert!("newest".parse::<SortOption>().is_err());
    }

    #[test]
    fn test_scoring_mode_from_str() {
        assert_eq!("bm25".parse::<ScoringMode>().unwrap(), ScoringMode::Lexical);
        assert_eq!("semantic".parse::<ScoringMode>().unwrap(), ScoringMode::Semantic);
        assert!("hybrid".parse::<ScoringMode>().is_err());
    }
}
