//! Embedding collaborator.
//!
//! Maps text to dense vectors for semantic relevance. The HTTP implementation talks to
//! a feature-extraction inference endpoint that returns either pooled vectors or a
//! token-by-dimension matrix per input; matrices are mean-pooled and every vector is
//! L2-normalized.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::client::HttpClient;
use crate::config::Config;
use crate::error::{EmbeddingError, EmbeddingResult};

/// Text embedding provider.
#[async_trait]
pub trait Embedder: Send + Sync + std::fmt::Debug {
    /// Embed several texts; the result has one vector per input, in input order.
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::InvalidResponse("empty embedding batch".to_string()))
    }
}

/// Embedder backed by a feature-extraction inference endpoint.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: HttpClient,
    url: String,
    api_key: Option<String>,
}

impl HttpEmbedder {
    /// Create an embedder for `url`.
    #[must_use]
    pub fn new(client: HttpClient, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self { client, url: url.into(), api_key }
    }

    /// Build from configuration; `None` when no embedding endpoint is configured.
    #[must_use]
    pub fn from_config(client: HttpClient, config: &Config) -> Option<Self> {
        let url = config.embedding_api_url.clone()?;
        Some(Self::new(client, url, config.embedding_api_key.clone()))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "inputs": texts,
            "options": { "wait_for_model": true }
        });

        let response: Value =
            self.client.post_json(&self.url, &body, self.api_key.as_deref()).await?;

        let items = response
            .as_array()
            .ok_or_else(|| EmbeddingError::InvalidResponse("expected a JSON array".to_string()))?;

        if items.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                items.len()
            )));
        }

        items
            .iter()
            .map(|item| {
                parse_embedding(item)
                    .map(|v| l2_normalize(&v))
                    .ok_or_else(|| EmbeddingError::InvalidResponse("non-numeric embedding".into()))
            })
            .collect()
    }
}

/// Vector, token matrix, or a single-element batch of either.
fn parse_embedding(value: &Value) -> Option<Vec<f32>> {
    let items = value.as_array()?;
    match items.first() {
        Some(Value::Number(_)) => parse_vector(value),
        Some(Value::Array(inner)) if matches!(inner.first(), Some(Value::Array(_))) => {
            if items.len() == 1 { parse_embedding(&items[0]) } else { None }
        }
        Some(Value::Array(_)) => {
            let rows: Vec<Vec<f32>> = items.iter().map(parse_vector).collect::<Option<_>>()?;
            Some(mean_pool(&rows))
        }
        _ => None,
    }
}

fn parse_vector(value: &Value) -> Option<Vec<f32>> {
    value.as_array()?.iter().map(|n| n.as_f64().map(|f| f as f32)).collect()
}

/// Element-wise mean of token vectors. Rows whose width differs from the first are
/// ignored.
#[must_use]
pub fn mean_pool(rows: &[Vec<f32>]) -> Vec<f32> {
    let Some(first) = rows.first() else {
        return Vec::new();
    };
    let dim = first.len();
    let mut sum = vec![0.0_f32; dim];
    let mut count = 0_usize;

    for row in rows.iter().filter(|r| r.len() == dim) {
        for (acc, x) in sum.iter_mut().zip(row) {
            *acc += x;
        }
        count += 1;
    }

    let count = count as f32;
    sum.iter_mut().for_each(|x| *x /= count);
    sum
}

/// Scale to unit length; a zero vector is returned unchanged.
#[must_use]
pub fn l2_normalize(vector: &[f32]) -> Vec<f32> {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter().map(|x| x / norm).collect()
    } else {
        vector.to_vec()
    }
}
