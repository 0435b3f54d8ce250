//! Filter/sort stage: derives the presentation view from the scored corpus.
//!
//! Every function here leaves the corpus untouched and returns a new view. Dates that
//! cannot be parsed are treated as `today`, so a malformed record passes any date range
//! that contains today and sorts as the most recent.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate};

use crate::config::placeholders;
use crate::models::{Article, EnhancedArticle, FilterCriteria, SortOption};

/// Parse `YYYY-MM-DD`, `YYYY-MM`, `YYYY` or RFC 3339; `None` if nothing fits.
#[must_use]
pub fn try_parse_article_date(date: &str) -> Option<NaiveDate> {
    let date = date.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(date) {
        return Some(timestamp.date_naive());
    }

    let day_part = date.split(['T', ' ']).next()?;
    let mut parts = day_part.split('-');

    let year = parts.next().filter(|y| !y.is_empty() && y.chars().all(|c| c.is_ascii_digit()))?;
    let year: i32 = year.parse().ok()?;
    let month: u32 = match parts.next() {
        Some(m) => m.parse().ok()?,
        None => 1,
    };
    let day: u32 = match parts.next() {
        Some(d) => d.parse().ok()?,
        None => 1,
    };
    if parts.next().is_some() {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an article date, falling back to `today` on failure.
#[must_use]
pub fn parse_article_date(date: &str, today: NaiveDate) -> NaiveDate {
    try_parse_article_date(date).unwrap_or_else(|| {
        tracing::debug!(date = %date, "Unparseable article date, using today");
        today
    })
}

impl FilterCriteria {
    /// Returns true if `article` satisfies every set predicate.
    #[must_use]
    pub fn matches(&self, article: &Article, today: NaiveDate) -> bool {
        if self.start_date.is_some() || self.end_date.is_some() {
            let date = parse_article_date(&article.date, today);
            if self.start_date.is_some_and(|start| date < start) {
                return false;
            }
            if self.end_date.is_some_and(|end| date > end) {
                return false;
            }
        }

        if !self.journals.is_empty() && !self.journals.iter().any(|j| j == &article.journal) {
            return false;
        }

        self.min_citations.is_none_or(|min| article.citation_count >= min)
    }
}

/// Articles of `corpus` that satisfy `criteria`, in corpus order.
#[must_use]
pub fn apply_filters(
    corpus: &[EnhancedArticle],
    criteria: &FilterCriteria,
    today: NaiveDate,
) -> Vec<EnhancedArticle> {
    if criteria.is_empty() {
        return corpus.to_vec();
    }
    corpus.iter().filter(|a| criteria.matches(&a.article, today)).cloned().collect()
}

/// Stable descending sort by `option`.
///
/// Equal keys keep their relative order.
pub fn sort_articles(articles: &mut [EnhancedArticle], option: SortOption, today: NaiveDate) {
    match option {
        SortOption::Relevance => {
            articles.sort_by(|a, b| descending(a.relevance_score, b.relevance_score));
        }
        SortOption::CitationCount => {
            articles.sort_by(|a, b| b.article.citation_count.cmp(&a.article.citation_count));
        }
        SortOption::Date => {
            articles.sort_by_cached_key(|a| std::cmp::Reverse(parse_article_date(&a.article.date, today)));
        }
    }
}

/// Filtered then sorted view of `corpus`.
#[must_use]
pub fn derive_view(
    corpus: &[EnhancedArticle],
    criteria: &FilterCriteria,
    sort: SortOption,
    today: NaiveDate,
) -> Vec<EnhancedArticle> {
    let mut view = apply_filters(corpus, criteria, today);
    sort_articles(&mut view, sort, today);
    view
}

/// Distinct venues of `corpus` in first-seen order, without the placeholder.
#[must_use]
pub fn available_journals<T: AsRef<Article>>(corpus: &[T]) -> Vec<String> {
    let mut journals: Vec<String> = Vec::new();
    for article in corpus {
        let journal = &article.as_ref().journal;
        if journal != placeholders::NO_JOURNAL && !journals.contains(journal) {
            journals.push(journal.clone());
        }
    }
    journals
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}
