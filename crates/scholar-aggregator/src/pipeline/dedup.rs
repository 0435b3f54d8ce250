//! Deduplication of articles that describe the same work.
//!
//! The identity key is the normalized DOI when the article carries a real identifier,
//! otherwise the case-folded title. arXiv identifiers collapse across versions and
//! across the `arxiv:` and `10.48550/arXiv.` spellings.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::config::placeholders;
use crate::models::Article;

static ARXIV_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\d{4}\.\d{4,5}|[a-z][a-z.\-]*/\d{7})(?:v\d+)?$").expect("valid arXiv id regex")
});

static VERSION_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"v\d+$").expect("valid version suffix regex"));

const DOI_PREFIXES: &[&str] =
    &["https://doi.org/", "http://doi.org/", "https://dx.doi.org/", "http://dx.doi.org/", "doi:"];

const ARXIV_PREFIXES: &[&str] = &["arxiv:", "10.48550/arxiv."];

/// Normalize a DOI for comparison.
///
/// Returns `None` for the "No DOI available" sentinel and for blank input.
#[must_use]
pub fn normalize_doi(doi: &str) -> Option<String> {
    let doi = doi.trim();
    if doi.is_empty() || doi == placeholders::NO_DOI {
        return None;
    }

    let mut doi = doi.to_lowercase();
    if let Some(stripped) = DOI_PREFIXES.iter().find_map(|p| doi.strip_prefix(p)) {
        doi = stripped.to_string();
    }

    if let Some(id) = ARXIV_PREFIXES.iter().find_map(|p| doi.strip_prefix(p)) {
        if ARXIV_ID.is_match(id) {
            return Some(format!("arxiv:{}", VERSION_SUFFIX.replace(id, "")));
        }
        return Some(format!("arxiv:{id}"));
    }

    Some(doi)
}

/// Case-folded, whitespace-collapsed title.
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Key under which two articles are considered the same work.
#[must_use]
pub fn identity_key(article: &Article) -> String {
    match normalize_doi(&article.doi) {
        Some(doi) => format!("doi:{doi}"),
        None => format!("title:{}", normalize_title(&article.title)),
    }
}

/// Keep exactly one article per identity key.
///
/// On collision the higher `citation_count` wins; ties keep the first encountered.
/// Surviving articles keep the position of the first occurrence of their key.
#[must_use]
pub fn deduplicate<T: AsRef<Article>>(articles: Vec<T>) -> Vec<T> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(articles.len());
    let mut unique: Vec<T> = Vec::with_capacity(articles.len());

    for article in articles {
        let key = identity_key(article.as_ref());
        match positions.get(&key) {
            Some(&index) => {
                if article.as_ref().citation_count > unique[index].as_ref().citation_count {
                    unique[index] = article;
                }
            }
            None => {
                positions.insert(key, unique.len());
                unique.push(article);
            }
        }
    }

    unique
}

/// Drop incoming articles whose DOI or title already exists in `corpus`.
///
/// Returns the survivors, which the caller appends to the corpus.
#[must_use]
pub fn merge_into_corpus<T, U>(corpus: &[T], incoming: Vec<U>) -> Vec<U>
where
    T: AsRef<Article>,
    U: AsRef<Article>,
{
    let mut dois: HashSet<String> = HashSet::with_capacity(corpus.len());
    let mut titles: HashSet<String> = HashSet::with_capacity(corpus.len());
    for existing in corpus {
        let existing = existing.as_ref();
        if let Some(doi) = normalize_doi(&existing.doi) {
            dois.insert(doi);
        }
        titles.insert(normalize_title(&existing.title));
    }

    incoming
        .into_iter()
        .filter(|candidate| {
            let candidate = candidate.as_ref();
            let doi_seen = normalize_doi(&candidate.doi).is_some_and(|doi| dois.contains(&doi));
            !doi_seen && !titles.contains(&normalize_title(&candidate.title))
        })
        .collect()
}
