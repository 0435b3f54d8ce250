//! Relevance scoring strategies.
//!
//! - `Lexical`: BM25 over the fetched corpus, min-max normalized to `[0, 1]`
//! - `Semantic`: cosine similarity between query and document embeddings
//!
//! Semantic scoring never fails the batch: when the query cannot be embedded every
//! article keeps its lexical score, and an article whose embedding is missing keeps
//! its own lexical score.

pub mod bm25;
pub mod semantic;

use std::sync::Arc;

use crate::config::Bm25Params;
use crate::embedding::Embedder;
use crate::models::{Article, ScoringMode};

pub use semantic::SemanticSettings;

/// Query relevance of one article.
#[derive(Debug, Clone, PartialEq)]
pub struct Relevance {
    /// Relevance score.
    pub score: f64,
    /// Document embedding, empty in lexical mode or when unavailable.
    pub embedding: Vec<f32>,
}

impl Relevance {
    fn lexical(score: f64) -> Self {
        Self { score, embedding: Vec::new() }
    }
}

/// Scoring strategy.
#[derive(Debug, Clone)]
pub enum RelevanceScorer {
    Lexical {
        params: Bm25Params,
    },
    Semantic {
        embedder: Arc<dyn Embedder>,
        params: Bm25Params,
        settings: SemanticSettings,
    },
}

impl RelevanceScorer {
    /// BM25 scorer.
    #[must_use]
    pub const fn lexical(params: Bm25Params) -> Self {
        Self::Lexical { params }
    }

    /// Embedding scorer with BM25 fallback.
    #[must_use]
    pub fn semantic(embedder: Arc<dyn Embedder>, params: Bm25Params, settings: SemanticSettings) -> Self {
        Self::Semantic { embedder, params, settings }
    }

    /// Active mode.
    #[must_use]
    pub const fn mode(&self) -> ScoringMode {
        match self {
            Self::Lexical { .. } => ScoringMode::Lexical,
            Self::Semantic { .. } => ScoringMode::Semantic,
        }
    }

    /// Score every article for `query`; the result is parallel to `articles`.
    pub async fn score(&self, query: &str, articles: &[Article]) -> Vec<Relevance> {
        let docs: Vec<String> = articles.iter().map(Article::document_text).collect();

        match self {
            Self::Lexical { params } => {
                bm25::bm25_relevance(query, &docs, *params).into_iter().map(Relevance::lexical).collect()
            }
            Self::Semantic { embedder, params, settings } => {
                let lexical = bm25::bm25_relevance(query, &docs, *params);

                let Some(query_vector) =
                    semantic::embed_query(embedder.as_ref(), query, *settings).await
                else {
                    tracing::warn!(query = %query, "Falling back to lexical relevance");
                    return lexical.into_iter().map(Relevance::lexical).collect();
                };

                let vectors = semantic::embed_documents(embedder.as_ref(), &docs, *settings).await;
                let missing = vectors.iter().filter(|v| v.is_none()).count();
                if missing > 0 {
                    tracing::debug!(missing, total = docs.len(), "Articles scored lexically");
                }

                vectors
                    .into_iter()
                    .zip(lexical)
                    .map(|(vector, fallback)| match vector {
                        Some(embedding) => Relevance {
                            score: semantic::cosine_similarity(&query_vector, &embedding),
                            embedding,
                        },
                        None => Relevance::lexical(fallback),
                    })
                    .collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::error::{EmbeddingError, EmbeddingResult};

    /// Embeds by keyword presence: `[quantum, biology]`.
    #[derive(Debug)]
    struct KeywordEmbedder {
        fail_on: Option<&'static str>,
    }

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            if let Some(marker) = self.fail_on {
                if texts.iter().any(|t| t.contains(marker)) {
                    return Err(EmbeddingError::InvalidResponse("forced".into()));
                }
            }
            Ok(texts
                .iter()
                .map(|t| {
                    let t = t.to_lowercase();
                    vec![f32::from(u8::from(t.contains("quantum"))), f32::from(u8::from(t.contains("biology")))]
                })
                .collect())
        }
    }

    /// Keyword embedder that stalls on any batch mentioning "slow".
    #[derive(Debug)]
    struct StallingEmbedder;

    #[async_trait]
    impl Embedder for StallingEmbedder {
        async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
            if texts.iter().any(|t| t.contains("slow")) {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            KeywordEmbedder { fail_on: None }.embed_batch(texts).await
        }
    }

    fn settings() -> SemanticSettings {
        SemanticSettings { batch_size: 1, concurrency: 2, timeout: Duration::from_secs(1) }
    }

    fn article(title: &str, abstract_text: &str) -> Article {
        Article { title: title.into(), r#abstract: abstract_text.into(), ..Default::default() }
    }

    #[tokio::test]
    async fn test_lexical_scores_are_normalized() {
        let scorer = RelevanceScorer::lexical(Bm25Params::default());
        let articles = vec![article("Quantum computing", "qubits"), article("Cell biology", "cells")];
        let scores = scorer.score("quantum", &articles).await;
        assert_eq!(scores[0].score, 1.0);
        assert_eq!(scores[1].score, 0.0);
        assert!(scores[0].embedding.is_empty());
        assert_eq!(scorer.mode(), ScoringMode::Lexical);
    }

    #[tokio::test]
    async fn test_semantic_uses_cosine() {
        let scorer = RelevanceScorer::semantic(
            Arc::new(KeywordEmbedder { fail_on: None }),
            Bm25Params::default(),
            settings(),
        );
        let articles = vec![article("Quantum walks", "x"), article("Marine biology", "y")];
        let scores = scorer.score("quantum", &articles).await;
        assert!((scores[0].score - 1.0).abs() < 1e-9);
        assert_eq!(scores[1].score, 0.0);
        assert_eq!(scores[0].embedding.len(), 2);
    }

    #[tokio::test]
    async fn test_semantic_failed_document_falls_back_to_lexical() {
        let scorer = RelevanceScorer::semantic(
            Arc::new(KeywordEmbedder { fail_on: Some("broken") }),
            Bm25Params::default(),
            settings(),
        );
        let articles = vec![article("Marine biology", "y"), article("Quantum broken", "x")];
        let scores = scorer.score("quantum", &articles).await;
        assert_eq!(scores[0].score, 0.0);
        assert_eq!(scores[1].score, 1.0);
        assert!(scores[1].embedding.is_empty());
    }

    #[test]
    fn test_semantic_score_future_is_send() {
        fn assert_send<T: Send>(_: T) {}

        let scorer = RelevanceScorer::semantic(
            Arc::new(KeywordEmbedder { fail_on: None }),
            Bm25Params::default(),
            settings(),
        );
        let articles = vec![article("Quantum walks", "x")];
        assert_send(scorer.score("quantum", &articles));
        assert_send(semantic::embed_documents(&KeywordEmbedder { fail_on: None }, &[], settings()));
    }

    #[tokio::test]
    async fn test_semantic_slow_document_times_out_to_lexical() {
        let scorer = RelevanceScorer::semantic(
            Arc::new(StallingEmbedder),
            Bm25Params::default(),
            SemanticSettings { batch_size: 1, concurrency: 2, timeout: Duration::from_millis(100) },
        );
        let articles = vec![article("Quantum slow", "x"), article("Marine biology", "y")];

        let start = std::time::Instant::now();
        let scores = scorer.score("quantum", &articles).await;

        assert!(start.elapsed() < Duration::from_secs(5));
        assert_eq!(scores[0].score, 1.0);
        assert!(scores[0].embedding.is_empty());
        assert_eq!(scores[1].score, 0.0);
        assert_eq!(scores[1].embedding.len(), 2);
    }

    #[tokio::test]
    async fn test_semantic_failed_query_falls_back_to_lexical() {
        let scorer = RelevanceScorer::semantic(
            Arc::new(KeywordEmbedder { fail_on: Some("quantum") }),
            Bm25Params::default(),
            settings(),
        );
        let articles = vec![article("Quantum walks", "x"), article("Marine biology", "y")];
        let scores = scorer.score("quantum", &articles).await;
        assert_eq!(scores[0].score, 1.0);
        assert_eq!(scores[1].score, 0.0);
    }
}
