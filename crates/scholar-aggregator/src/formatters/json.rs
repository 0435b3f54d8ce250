//! JSON output formatting with token efficiency.

use serde_json::{Value, json};

use crate::features::Features;
use crate::models::EnhancedArticle;

/// Compact article representation: placeholders and embeddings are left out.
#[must_use]
pub fn compact_article(enhanced: &EnhancedArticle) -> Value {
    let article = &enhanced.article;
    let mut obj = json!({
        "title": article.title,
        "authors": article.authors,
        "date": article.date,
        "venue": article.journal,
        "citations": article.citation_count,
        "relevance": round3(enhanced.relevance_score),
        "rankScore": round3(enhanced.ranking_score),
    });

    if article.has_doi() {
        obj["doi"] = json!(article.doi);
    }

    if article.has_abstract() {
        obj["abstract"] = json!(article.r#abstract);
    }

    if article.reference_count > 0 {
        obj["references"] = json!(article.reference_count);
    }

    if !article.tags.is_empty() {
        obj["tags"] = json!(article.tags);
    }

    if let Some(source) = article.source {
        obj["source"] = json!(source.name());
    }

    if let Some(arxiv) = &article.arxiv_id {
        obj["arxiv"] = json!(arxiv);
    }

    if let Some(url) = &article.download_url {
        obj["pdf"] = json!(url);
    }

    if let Some(url) = &article.repository_url {
        obj["code"] = json!(url);
    }

    obj
}

/// Compact list of articles.
#[must_use]
pub fn compact_articles(articles: &[EnhancedArticle]) -> Value {
    Value::Array(articles.iter().map(compact_article).collect())
}

/// Findings as a JSON object.
#[must_use]
pub fn features_json(doi: Option<&str>, features: &Features) -> Value {
    let mut obj = json!({ "features": features });
    if let Some(doi) = doi {
        obj["doi"] = json!(doi);
    }
    obj
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
