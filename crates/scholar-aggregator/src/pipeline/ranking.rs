//! Composite ranking score.
//!
//! `score = w_r * relevance + w_c * ln(c + 1) / ln(base) + w_d * recency + w_e * exact`

use chrono::{Datelike, NaiveDate};

use super::filter::parse_article_date;
use crate::config::RankingWeights;
use crate::models::Article;

/// Log-scaled citation count; reaches 1.0 at `log_base - 1` citations and keeps growing.
#[must_use]
pub fn normalized_citations(citation_count: u64, log_base: f64) -> f64 {
    if log_base <= 1.0 {
        return 0.0;
    }
    (citation_count as f64 + 1.0).ln() / log_base.ln()
}

/// Linear decay from 1 (this year) to 0 at `horizon_years`. Future years count as 0 years old.
#[must_use]
pub fn recency(publication_year: i32, current_year: i32, horizon_years: f64) -> f64 {
    if horizon_years <= 0.0 {
        return 0.0;
    }
    let years = f64::from((current_year - publication_year).max(0));
    (1.0 - years / horizon_years).max(0.0)
}

/// `1 - levenshtein / max(len)`, over characters. Two empty words are identical.
#[must_use]
pub fn word_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - strsim::levenshtein(a, b) as f64 / max_len as f64
}

/// True if at least `threshold` of the query words have a title word at least
/// `threshold` similar.
#[must_use]
pub fn fuzzy_title_match(query: &str, title: &str, threshold: f64) -> bool {
    let query_words: Vec<String> = query.split_whitespace().map(str::to_lowercase).collect();
    if query_words.is_empty() {
        return false;
    }
    let title_words: Vec<String> = title.split_whitespace().map(str::to_lowercase).collect();

    let matched = query_words
        .iter()
        .filter(|q| title_words.iter().any(|t| word_similarity(q, t) >= threshold))
        .count();

    matched as f64 / query_words.len() as f64 >= threshold
}

/// Weighted sum of the four ranking signals.
#[must_use]
pub fn ranking_score(
    relevance: f64,
    citation_count: u64,
    publication_year: i32,
    exact_match: bool,
    current_year: i32,
    weights: &RankingWeights,
) -> f64 {
    weights.relevance * relevance
        + weights.citations * normalized_citations(citation_count, weights.citation_log_base)
        + weights.recency * recency(publication_year, current_year, weights.recency_horizon_years)
        + weights.exact_match * if exact_match { 1.0 } else { 0.0 }
}

/// Ranking score of `article` for `query` given its relevance.
#[must_use]
pub fn rank_article(
    query: &str,
    article: &Article,
    relevance: f64,
    today: NaiveDate,
    weights: &RankingWeights,
) -> f64 {
    let year = parse_article_date(&article.date, today).year();
    let exact = fuzzy_title_match(query, &article.title, weights.match_threshold);
    ranking_score(relevance, article.citation_count, year, exact, today.year(), weights)
}
