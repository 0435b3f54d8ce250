//! Feature-extraction collaborator.
//!
//! Asks an extractive question-answering model a fixed set of questions about an
//! abstract. Purely for display; nothing here feeds into ranking.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;

use crate::client::HttpClient;
use crate::config::Config;
use crate::error::{EmbeddingError, EmbeddingResult};

/// Named findings and the question that extracts each one.
pub const FEATURE_QUESTIONS: &[(&str, &str)] = &[
    ("main_outcome", "What is the main finding or outcome of this research?"),
    ("methodology", "What methodology or approach was used in this research?"),
];

/// Finding name to extracted text span.
pub type Features = BTreeMap<String, String>;

static SENTENCE_MARKERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?s>").expect("valid sentence marker regex"));

static PUNCTUATION_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\w\s]+$").expect("valid punctuation regex"));

/// Extractive question answering over an abstract.
#[async_trait]
pub trait FeatureExtractor: Send + Sync + std::fmt::Debug {
    /// Answer `question` from `context`.
    async fn answer(&self, question: &str, context: &str) -> EmbeddingResult<String>;

    /// Answer every question of [`FEATURE_QUESTIONS`] and clean the answers.
    async fn extract_features(&self, abstract_text: &str) -> EmbeddingResult<Features> {
        let answers = futures::future::join_all(
            FEATURE_QUESTIONS.iter().map(|(_, question)| self.answer(question, abstract_text)),
        )
        .await;

        let mut raw = Features::new();
        for ((name, _), answer) in FEATURE_QUESTIONS.iter().zip(answers) {
            raw.insert((*name).to_string(), answer?);
        }
        Ok(clean_features(raw))
    }
}

/// Strip `<s>`/`</s>` markers and drop empty or punctuation-only answers.
#[must_use]
pub fn clean_features(raw: Features) -> Features {
    raw.into_iter()
        .filter_map(|(name, value)| {
            let cleaned = SENTENCE_MARKERS.replace_all(&value, "").trim().to_string();
            (!cleaned.is_empty() && !PUNCTUATION_ONLY.is_match(&cleaned)).then_some((name, cleaned))
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    answer: String,
}

/// Question-answering inference endpoint.
#[derive(Debug, Clone)]
pub struct HttpFeatureExtractor {
    client: HttpClient,
    url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpFeatureExtractor {
    #[must_use]
    pub fn new(
        client: HttpClient,
        url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self { client, url: url.into(), api_key, timeout }
    }

    /// Build from configuration; `None` when no feature endpoint is configured.
    #[must_use]
    pub fn from_config(client: HttpClient, config: &Config) -> Option<Self> {
        let url = config.features_api_url.clone()?;
        Some(Self::new(client, url, config.embedding_api_key.clone(), config.embedding_timeout))
    }
}

#[async_trait]
impl FeatureExtractor for HttpFeatureExtractor {
    async fn answer(&self, question: &str, context: &str) -> EmbeddingResult<String> {
        let body = json!({
            "inputs": { "question": question, "context": context }
        });

        let call = self.client.post_json::<AnswerResponse>(&self.url, &body, self.api_key.as_deref());
        let response = tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| EmbeddingError::Timeout(self.timeout))??;

        Ok(response.answer)
    }
}
