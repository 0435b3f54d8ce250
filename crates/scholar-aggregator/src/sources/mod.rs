//! Source adapters for the external catalogs.
//!
//! Each adapter fetches one page of raw records for a query. [`fetch_all`] runs every
//! adapter concurrently and waits for all of them; a failing adapter contributes
//! nothing and its error is logged.

mod arxiv;
mod core_api;
mod crossref;
mod paperswithcode;

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::client::HttpClient;
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{RawRecord, SourceKind};

pub use arxiv::{ArxivSource, parse_feed};
pub use core_api::CoreSource;
pub use crossref::CrossrefSource;
pub use paperswithcode::PapersWithCodeSource;

/// One external catalog.
#[async_trait]
pub trait SourceAdapter: Send + Sync + std::fmt::Debug {
    /// Catalog this adapter reads.
    fn kind(&self) -> SourceKind;

    /// Fetch page `page` (1-based) of raw records for `query`.
    ///
    /// Items that fail to decode are skipped; envelope or transport failures are
    /// returned as errors.
    async fn fetch(&self, query: &str, page: u32) -> ClientResult<Vec<RawRecord>>;
}

/// Every catalog enabled by `config`, in a fixed order.
#[must_use]
pub fn default_sources(client: &HttpClient, config: &Config) -> Vec<Arc<dyn SourceAdapter>> {
    vec![
        Arc::new(CrossrefSource::new(client.clone(), config)),
        Arc::new(CoreSource::new(client.clone(), config)),
        Arc::new(ArxivSource::new(client.clone(), config)),
        Arc::new(PapersWithCodeSource::new(client.clone(), config)),
    ]
}

/// Fetch one page from every adapter concurrently.
///
/// Results are concatenated in adapter order regardless of completion order.
pub async fn fetch_all(
    adapters: &[Arc<dyn SourceAdapter>],
    query: &str,
    page: u32,
) -> Vec<RawRecord> {
    let mut pending: FuturesUnordered<_> = adapters
        .iter()
        .enumerate()
        .map(|(index, adapter)| async move {
            let start = Instant::now();
            let result = adapter.fetch(query, page).await;
            (index, adapter.kind(), result, start.elapsed())
        })
        .collect();

    let mut pages: Vec<(usize, Vec<RawRecord>)> = Vec::with_capacity(adapters.len());
    while let Some((index, kind, result, elapsed)) = pending.next().await {
        match result {
            Ok(records) => {
                tracing::debug!(
                    source = %kind,
                    count = records.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Source fetched"
                );
                pages.push((index, records));
            }
            Err(e) => {
                tracing::warn!(
                    source = %kind,
                    query = %query,
                    page,
                    retryable = e.is_retryable(),
                    retry_after = ?e.retry_after(),
                    error = %e,
                    "Source failed"
                );
            }
        }
    }

    pages.sort_by_key(|(index, _)| *index);
    pages.into_iter().flat_map(|(_, records)| records).collect()
}

/// Zero-based offset of a 1-based page.
pub(crate) fn page_offset(page: u32, per_page: u32) -> u32 {
    page.saturating_sub(1).saturating_mul(per_page)
}

/// Decode each item independently, skipping the ones that do not fit `T`.
pub(crate) fn decode_items<T: DeserializeOwned>(source: SourceKind, items: Vec<Value>) -> Vec<T> {
    let total = items.len();
    let decoded: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::debug!(source = %source, error = %e, "Skipping malformed item");
                None
            }
        })
        .collect();

    if decoded.len() < total {
        tracing::debug!(source = %source, skipped = total - decoded.len(), "Malformed items skipped");
    }
    decoded
}
