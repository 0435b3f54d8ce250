//! Citation count enrichment by DOI.
//!
//! The cache is injected by the caller. Entries carry the time they were fetched and
//! expire after the configured TTL.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use moka::future::Cache;
use serde_json::Value;

use super::dedup::normalize_doi;
use super::normalize::coerce_count;
use crate::client::HttpClient;
use crate::config::{Config, api};
use crate::error::ClientResult;
use crate::models::Article;

/// Citation count cache keyed by normalized DOI.
#[async_trait]
pub trait CitationCache: Send + Sync + std::fmt::Debug {
    /// Cached count, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Option<u64>;

    /// Store `value` as fetched at `timestamp`.
    async fn put(&self, key: String, value: u64, timestamp: DateTime<Utc>);
}

/// In-memory [`CitationCache`].
#[derive(Clone)]
pub struct MemoryCitationCache {
    entries: Cache<String, (u64, DateTime<Utc>)>,
    ttl: Duration,
}

impl MemoryCitationCache {
    /// Create a cache whose entries live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let entries = Cache::builder().max_capacity(max_entries).time_to_live(ttl).build();
        Self { entries, ttl }
    }

    fn is_fresh(&self, timestamp: DateTime<Utc>) -> bool {
        chrono::Duration::from_std(self.ttl)
            .is_ok_and(|ttl| Utc::now().signed_duration_since(timestamp) < ttl)
    }
}

impl Default for MemoryCitationCache {
    fn default() -> Self {
        Self::new(api::CITATION_CACHE_TTL, api::CITATION_CACHE_MAX_SIZE)
    }
}

impl std::fmt::Debug for MemoryCitationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCitationCache")
            .field("entries", &self.entries.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[async_trait]
impl CitationCache for MemoryCitationCache {
    async fn get(&self, key: &str) -> Option<u64> {
        let (value, timestamp) = self.entries.get(key).await?;
        if self.is_fresh(timestamp) {
            Some(value)
        } else {
            self.entries.invalidate(key).await;
            None
        }
    }

    async fn put(&self, key: String, value: u64, timestamp: DateTime<Utc>) {
        self.entries.insert(key, (value, timestamp)).await;
    }
}

/// Looks up citation counts for articles that carry a registered DOI.
#[derive(Debug, Clone)]
pub struct CitationEnricher {
    client: HttpClient,
    base_url: String,
    cache: Arc<dyn CitationCache>,
    concurrency: usize,
}

impl CitationEnricher {
    pub fn new(client: HttpClient, config: &Config, cache: Arc<dyn CitationCache>) -> Self {
        Self {
            client,
            base_url: config.opencitations_api_url.clone(),
            cache,
            concurrency: api::CITATION_CONCURRENCY,
        }
    }

    /// Citation count for `doi`, from cache or upstream.
    ///
    /// # Errors
    ///
    /// Returns error if the upstream lookup fails.
    pub async fn citation_count(&self, doi: &str) -> ClientResult<u64> {
        let Some(key) = normalize_doi(doi) else {
            return Ok(0);
        };
        if let Some(count) = self.cache.get(&key).await {
            return Ok(count);
        }

        let url = format!("{}/citation-count/{}", self.base_url, key);
        let response: Value = self.client.get_json(&url, &[]).await?;
        let count = response
            .as_array()
            .and_then(|rows| rows.first())
            .map_or(0, |row| coerce_count(row.get("count")));

        self.cache.put(key, count, Utc::now()).await;
        Ok(count)
    }

    /// Raise each article's citation count to the looked-up value. Never lowers a count;
    /// lookup failures leave the article unchanged.
    pub async fn enrich(&self, mut articles: Vec<Article>) -> Vec<Article> {
        let lookups: Vec<(usize, String)> = articles
            .iter()
            .enumerate()
            .filter(|(_, a)| is_registered_doi(&a.doi))
            .map(|(i, a)| (i, a.doi.clone()))
            .collect();

        let mut results = stream::iter(lookups.into_iter().map(|(index, doi)| async move {
            let outcome = self.citation_count(&doi).await;
            (index, doi, outcome)
        }))
        .buffer_unordered(self.concurrency.max(1));

        let mut raised = 0_usize;
        while let Some((index, doi, outcome)) = results.next().await {
            match outcome {
                Ok(count) if count > articles[index].citation_count => {
                    articles[index].citation_count = count;
                    raised += 1;
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(doi = %doi, error = %e, "Citation lookup failed"),
            }
        }

        tracing::debug!(raised, total = articles.len(), "Citation enrichment finished");
        articles
    }
}

/// Registered DOIs only; `arxiv:` identifiers are unknown to the citation index.
fn is_registered_doi(doi: &str) -> bool {
    normalize_doi(doi).is_some_and(|d| !d.starts_with("arxiv:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_round_trip() {
        let cache = MemoryCitationCache::default();
        tokio_test::block_on(async {
            assert_eq!(cache.get("10.1/x").await, None);
            cache.put("10.1/x".into(), 42, Utc::now()).await;
            assert_eq!(cache.get("10.1/x").await, Some(42));
        });
    }

    #[tokio::test]
    async fn test_cache_rejects_stale_timestamp() {
        let cache = MemoryCitationCache::default();
        let stale = Utc::now() - chrono::Duration::hours(25);
        cache.put("10.1/old".into(), 7, stale).await;
        assert_eq!(cache.get("10.1/old").await, None);
    }

    #[test]
    fn test_registered_doi() {
        assert!(is_registered_doi("10.1000/abc"));
        assert!(!is_registered_doi("arxiv:2101.00001v1"));
        assert!(!is_registered_doi("No DOI available"));
    }
}
