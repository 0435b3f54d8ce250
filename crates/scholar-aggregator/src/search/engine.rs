//! End-to-end pipeline for one page of one query.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;

use crate::client::HttpClient;
use crate::config::{Bm25Params, Config, RankingWeights};
use crate::embedding::{Embedder, HttpEmbedder};
use crate::models::{Article, EnhancedArticle, ScoringMode};
use crate::pipeline::{
    CitationEnricher, MemoryCitationCache, RelevanceScorer, SemanticSettings, deduplicate,
    normalize, rank_article,
};
use crate::sources::{SourceAdapter, default_sources, fetch_all};

/// Runs fetch, normalize, dedup, enrichment, scoring and ranking.
#[derive(Debug, Clone)]
pub struct Aggregator {
    sources: Vec<Arc<dyn SourceAdapter>>,
    embedder: Option<Arc<dyn Embedder>>,
    enricher: Option<CitationEnricher>,
    default_mode: ScoringMode,
    bm25: Bm25Params,
    semantic: SemanticSettings,
    weights: RankingWeights,
}

impl Aggregator {
    /// Wire the public catalogs and configured collaborators.
    #[must_use]
    pub fn new(config: &Config, client: &HttpClient) -> Self {
        let embedder = HttpEmbedder::from_config(client.clone(), config)
            .map(|e| Arc::new(e) as Arc<dyn Embedder>);

        let enricher = config.enrich_citations.then(|| {
            let cache = MemoryCitationCache::new(
                config.citation_cache_ttl,
                crate::config::api::CITATION_CACHE_MAX_SIZE,
            );
            CitationEnricher::new(client.clone(), config, Arc::new(cache))
        });

        Self::with_sources(config, default_sources(client, config))
            .with_embedder(embedder)
            .with_citation_enricher(enricher)
    }

    /// Aggregator over explicit sources, without collaborators.
    #[must_use]
    pub fn with_sources(config: &Config, sources: Vec<Arc<dyn SourceAdapter>>) -> Self {
        Self {
            sources,
            embedder: None,
            enricher: None,
            default_mode: config.scoring_mode,
            bm25: config.bm25,
            semantic: SemanticSettings::from_config(config),
            weights: config.weights,
        }
    }

    /// Set the embedding collaborator used in semantic mode.
    #[must_use]
    pub fn with_embedder(mut self, embedder: Option<Arc<dyn Embedder>>) -> Self {
        self.embedder = embedder;
        self
    }

    /// Set the citation enricher run after deduplication.
    #[must_use]
    pub fn with_citation_enricher(mut self, enricher: Option<CitationEnricher>) -> Self {
        self.enricher = enricher;
        self
    }

    /// Configured scoring mode.
    #[must_use]
    pub const fn default_mode(&self) -> ScoringMode {
        self.default_mode
    }

    /// Scorer for `mode`; semantic without an embedder degrades to lexical.
    #[must_use]
    pub fn scorer(&self, mode: Option<ScoringMode>) -> RelevanceScorer {
        match (mode.unwrap_or(self.default_mode), &self.embedder) {
            (ScoringMode::Semantic, Some(embedder)) => {
                RelevanceScorer::semantic(Arc::clone(embedder), self.bm25, self.semantic)
            }
            (ScoringMode::Semantic, None) => {
                tracing::warn!("Semantic scoring requested without an embedding endpoint, using lexical");
                RelevanceScorer::lexical(self.bm25)
            }
            (ScoringMode::Lexical, _) => RelevanceScorer::lexical(self.bm25),
        }
    }

    /// Fetch and rank page `page` of `query`, ordered by ranking score.
    pub async fn search_page(
        &self,
        query: &str,
        page: u32,
        mode: Option<ScoringMode>,
    ) -> Vec<EnhancedArticle> {
        let start = Instant::now();
        let raw = fetch_all(&self.sources, query, page).await;
        tracing::debug!(count = raw.len(), elapsed_ms = start.elapsed().as_millis() as u64, "Fetched");

        let articles: Vec<Article> = raw.iter().map(normalize).collect();
        let fetched = articles.len();
        let mut articles = deduplicate(articles);
        tracing::debug!(fetched, unique = articles.len(), "Deduplicated");

        if let Some(enricher) = &self.enricher {
            let phase = Instant::now();
            articles = enricher.enrich(articles).await;
            tracing::debug!(elapsed_ms = phase.elapsed().as_millis() as u64, "Citations enriched");
        }

        let scorer = self.scorer(mode);
        let ranked = self.rank(&scorer, query, articles, today()).await;

        tracing::info!(
            query = %query,
            page,
            mode = ?scorer.mode(),
            count = ranked.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Search page ranked"
        );
        ranked
    }

    /// Score and rank already-normalized articles.
    pub async fn rank(
        &self,
        scorer: &RelevanceScorer,
        query: &str,
        articles: Vec<Article>,
        today: NaiveDate,
    ) -> Vec<EnhancedArticle> {
        let phase = Instant::now();
        let relevance = scorer.score(query, &articles).await;
        tracing::debug!(elapsed_ms = phase.elapsed().as_millis() as u64, "Relevance scored");

        let mut ranked: Vec<EnhancedArticle> = articles
            .into_iter()
            .zip(relevance)
            .map(|(article, relevance)| {
                let ranking_score =
                    rank_article(query, &article, relevance.score, today, &self.weights);
                EnhancedArticle {
                    article,
                    embedding: relevance.embedding,
                    relevance_score: relevance.score,
                    ranking_score,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.ranking_score.partial_cmp(&a.ranking_score).unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}

/// Current UTC date, the reference for recency and unparseable dates.
#[must_use]
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}
