//! Embedding cosine-similarity relevance.

use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::embedding::Embedder;

/// Batching, concurrency and timeout for embedding calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SemanticSettings {
    pub batch_size: usize,
    pub concurrency: usize,
    pub timeout: Duration,
}

impl SemanticSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            batch_size: config.embedding_batch_size.max(1),
            concurrency: config.embedding_concurrency.max(1),
            timeout: config.embedding_timeout,
        }
    }
}

/// Dot product over the product of magnitudes.
///
/// Returns 0 for a zero-magnitude vector, mismatched lengths or empty input.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold((0.0_f64, 0.0_f64, 0.0_f64), |acc, (x, y)| {
        let (x, y) = (f64::from(*x), f64::from(*y));
        (acc.0 + x * y, acc.1 + x * x, acc.2 + y * y)
    });

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator > 0.0 { dot / denominator } else { 0.0 }
}

/// Embed the query under the call timeout. `None` on failure or timeout.
pub async fn embed_query(
    embedder: &dyn Embedder,
    query: &str,
    settings: SemanticSettings,
) -> Option<Vec<f32>> {
    match tokio::time::timeout(settings.timeout, embedder.embed(query)).await {
        Ok(Ok(vector)) if !vector.is_empty() => Some(vector),
        Ok(Ok(_)) => {
            tracing::warn!("Empty query embedding");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Query embedding failed");
            None
        }
        Err(_) => {
            tracing::warn!(timeout = ?settings.timeout, "Query embedding timed out");
            None
        }
    }
}

/// Embed `texts` in batches with bounded concurrency.
///
/// One slot per input; a slot is `None` when its batch failed or timed out.
pub async fn embed_documents(
    embedder: &dyn Embedder,
    texts: &[String],
    settings: SemanticSettings,
) -> Vec<Option<Vec<f32>>> {
    let batch_size = settings.batch_size.max(1);
    let mut slots: Vec<Option<Vec<f32>>> = vec![None; texts.len()];

    let jobs: Vec<_> = texts
        .chunks(batch_size)
        .enumerate()
        .map(|(index, chunk)| async move {
            let outcome = tokio::time::timeout(settings.timeout, embedder.embed_batch(chunk)).await;
            (index, chunk.len(), outcome)
        })
        .collect();
    let mut batches = stream::iter(jobs).buffer_unordered(settings.concurrency.max(1));

    while let Some((index, len, outcome)) = batches.next().await {
        match outcome {
            Ok(Ok(vectors)) if vectors.len() == len => {
                let offset = index * batch_size;
                for (slot, vector) in slots[offset..offset + len].iter_mut().zip(vectors) {
                    *slot = (!vector.is_empty()).then_some(vector);
                }
            }
            Ok(Ok(vectors)) => {
                tracing::warn!(batch = index, expected = len, got = vectors.len(), "Embedding batch size mismatch");
            }
            Ok(Err(e)) => {
                tracing::warn!(batch = index, error = %e, "Embedding batch failed");
            }
            Err(_) => {
                tracing::warn!(batch = index, timeout = ?settings.timeout, "Embedding batch timed out");
            }
        }
    }

    slots
}
