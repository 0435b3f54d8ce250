//! Aggregation and ranking pipeline.
//!
//! Data flows forward through the stages:
//! normalize -> dedup -> (citations) -> relevance -> ranking -> filter/sort.
//! Everything except the collaborator-backed stages is synchronous and infallible.

pub mod citations;
pub mod dedup;
pub mod filter;
pub mod normalize;
pub mod ranking;
pub mod relevance;

pub use citations::{CitationCache, CitationEnricher, MemoryCitationCache};
pub use dedup::{deduplicate, identity_key, merge_into_corpus, normalize_doi};
pub use filter::{apply_filters, available_journals, derive_view, parse_article_date, sort_articles};
pub use normalize::{clean_abstract, normalize, normalize_article};
pub use ranking::{fuzzy_title_match, rank_article, ranking_score};
pub use relevance::{Relevance, RelevanceScorer, SemanticSettings};
