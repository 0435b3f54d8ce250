//! Raw source records to canonical [`Article`]s.
//!
//! Pure functions. Markup is stripped when a raw record is mapped; re-normalizing a
//! canonical article only re-applies whitespace and placeholder rules, so it is
//! idempotent.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::config::placeholders;
use crate::models::{
    Article, ArxivEntry, CoreItem, CrossrefAuthor, CrossrefDate, CrossrefItem, PwcResult,
    RawRecord, SourceKind,
};

static JATS_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?jats:\w+(?:\s+[^>]*)?>").expect("valid JATS tag regex"));

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"</?[^>]+(?:>|$)").expect("valid markup tag regex"));

/// Named entities decoded from abstracts, in decode order.
const ENTITIES: &[(&str, &str)] = &[
    ("&nbsp;", " "),
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&amp;", "&"),
    ("&quot;", "\""),
    ("&#39;", "'"),
];

const ARXIV_ABS_PREFIXES: &[&str] = &["http://arxiv.org/abs/", "https://arxiv.org/abs/"];

/// Strip JATS and HTML/XML tags, then decode the fixed entity set.
#[must_use]
pub fn clean_abstract(text: &str) -> String {
    let without_jats = JATS_TAG.replace_all(text, "");
    let mut cleaned = ANY_TAG.replace_all(&without_jats, "").into_owned();
    for (entity, replacement) in ENTITIES {
        if cleaned.contains(entity) {
            cleaned = cleaned.replace(entity, replacement);
        }
    }
    collapse_whitespace(&cleaned)
}

/// Map one raw record to the canonical schema.
#[must_use]
pub fn normalize(record: &RawRecord) -> Article {
    let article = match record {
        RawRecord::Crossref(item) => from_crossref(item),
        RawRecord::Core(item) => from_core(item),
        RawRecord::Arxiv(entry) => from_arxiv(entry),
        RawRecord::PapersWithCode(result) => from_papers_with_code(result),
    };
    normalize_article(article)
}

/// Re-apply whitespace and placeholder rules to a canonical article.
#[must_use]
pub fn normalize_article(article: Article) -> Article {
    let mut tags: Vec<String> = Vec::with_capacity(article.tags.len());
    for tag in article.tags {
        let tag = collapse_whitespace(&tag);
        if !tag.is_empty() && !tags.contains(&tag) {
            tags.push(tag);
        }
    }

    Article {
        title: or_placeholder(collapse_whitespace(&article.title), placeholders::NO_TITLE),
        authors: or_placeholder(collapse_whitespace(&article.authors), placeholders::NO_AUTHORS),
        date: or_placeholder(article.date.trim().to_string(), placeholders::NO_DATE),
        journal: or_placeholder(collapse_whitespace(&article.journal), placeholders::NO_JOURNAL),
        tags,
        r#abstract: or_placeholder(
            collapse_whitespace(&article.r#abstract),
            placeholders::NO_ABSTRACT,
        ),
        doi: or_placeholder(article.doi.trim().to_string(), placeholders::NO_DOI),
        citation_count: article.citation_count,
        reference_count: article.reference_count,
        download_url: non_empty(article.download_url.as_deref()),
        repository_url: non_empty(article.repository_url.as_deref()),
        arxiv_id: non_empty(article.arxiv_id.as_deref()),
        source: article.source,
    }
}

/// Coerce a raw count to a non-negative integer; absent or non-numeric is 0.
#[must_use]
pub fn coerce_count(value: Option<&Value>) -> u64 {
    match value {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f > 0.0).map(|f| f.floor() as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite() && *f > 0.0)
                        .map(|f| f.floor() as u64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn from_crossref(item: &CrossrefItem) -> Article {
    Article {
        title: first_non_empty(item.title.as_deref()).map(clean_abstract).unwrap_or_default(),
        authors: item
            .author
            .as_deref()
            .map(|authors| join_names(authors.iter().map(crossref_author_name)))
            .unwrap_or_default(),
        date: item.published.as_ref().map(crossref_date).unwrap_or_default(),
        journal: first_non_empty(item.container_title.as_deref()).unwrap_or_default().to_string(),
        tags: item.subject.clone().unwrap_or_default(),
        r#abstract: item.r#abstract.as_deref().map(clean_abstract).unwrap_or_default(),
        doi: item.doi.clone().unwrap_or_default(),
        citation_count: coerce_count(item.is_referenced_by_count.as_ref()),
        reference_count: item.reference.as_ref().map_or(0, |r| r.len() as u64),
        source: Some(SourceKind::Crossref),
        ..empty_article()
    }
}

fn from_core(item: &CoreItem) -> Article {
    let date = item
        .date_published
        .clone()
        .filter(|d| !d.trim().is_empty())
        .or_else(|| item.year_published.map(|y| y.to_string()))
        .unwrap_or_default();

    let tags = item
        .subjects
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| item.topics.clone())
        .unwrap_or_default();

    Article {
        title: item.title.as_deref().map(clean_abstract).unwrap_or_default(),
        authors: item
            .authors
            .as_deref()
            .map(|authors| join_names(authors.iter().map(|a| a.name.clone().unwrap_or_default())))
            .unwrap_or_default(),
        date,
        journal: item.publisher.clone().unwrap_or_default(),
        tags,
        r#abstract: item.r#abstract.as_deref().map(clean_abstract).unwrap_or_default(),
        doi: item.doi.clone().unwrap_or_default(),
        citation_count: coerce_count(item.citation_count.as_ref()),
        reference_count: 0,
        download_url: non_empty(item.download_url.as_deref())
            .or_else(|| non_empty(item.full_text_identifier.as_deref())),
        source: Some(SourceKind::Core),
        ..empty_article()
    }
}

fn from_arxiv(entry: &ArxivEntry) -> Article {
    let arxiv_id = entry.id.as_deref().map(strip_arxiv_prefix).filter(|id| !id.is_empty());

    Article {
        title: entry.title.as_deref().map(clean_abstract).unwrap_or_default(),
        authors: join_names(entry.authors.iter().cloned()),
        date: entry.published.clone().unwrap_or_default(),
        journal: non_empty(entry.journal_ref.as_deref()).unwrap_or_else(|| "arXiv".to_string()),
        tags: entry.categories.clone(),
        r#abstract: entry.summary.as_deref().map(clean_abstract).unwrap_or_default(),
        doi: arxiv_id.as_ref().map(|id| format!("arxiv:{id}")).unwrap_or_default(),
        download_url: arxiv_id.as_ref().map(|id| format!("https://arxiv.org/pdf/{id}")),
        arxiv_id,
        source: Some(SourceKind::Arxiv),
        ..empty_article()
    }
}

fn from_papers_with_code(result: &PwcResult) -> Article {
    let paper = &result.paper;
    let arxiv_id = non_empty(paper.arxiv_id.as_deref());
    let journal = non_empty(paper.proceeding.as_deref())
        .or_else(|| non_empty(paper.conference.as_deref()))
        .unwrap_or_else(|| SourceKind::PapersWithCode.name().to_string());

    Article {
        title: paper.title.as_deref().map(clean_abstract).unwrap_or_default(),
        authors: join_names(paper.authors.iter().cloned()),
        date: paper.published.clone().unwrap_or_default(),
        journal,
        r#abstract: paper.r#abstract.as_deref().map(clean_abstract).unwrap_or_default(),
        doi: arxiv_id.as_ref().map(|id| format!("arxiv:{id}")).unwrap_or_default(),
        download_url: non_empty(paper.url_pdf.as_deref()),
        repository_url: result.repository.as_ref().and_then(|r| non_empty(r.url.as_deref())),
        arxiv_id,
        source: Some(SourceKind::PapersWithCode),
        ..empty_article()
    }
}

fn crossref_author_name(author: &CrossrefAuthor) -> String {
    match author.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!(
            "{} {}",
            author.given.as_deref().unwrap_or_default(),
            author.family.as_deref().unwrap_or_default()
        )
        .trim()
        .to_string(),
    }
}

/// `[[2021, 5, 3]]` to `2021-05-03`; shorter part lists give `2021-05` or `2021`.
fn crossref_date(date: &CrossrefDate) -> String {
    let Some(parts) = date.date_parts.first() else {
        return String::new();
    };
    let parts: Vec<i32> = parts.iter().take(3).map_while(|p| *p).collect();
    match parts.as_slice() {
        [year] => format!("{year:04}"),
        [year, month] => format!("{year:04}-{month:02}"),
        [year, month, day] => format!("{year:04}-{month:02}-{day:02}"),
        _ => String::new(),
    }
}

fn strip_arxiv_prefix(id: &str) -> String {
    let id = id.trim();
    ARXIV_ABS_PREFIXES
        .iter()
        .find_map(|prefix| id.strip_prefix(prefix))
        .unwrap_or(id)
        .to_string()
}

fn join_names(names: impl Iterator<Item = String>) -> String {
    names
        .map(|n| collapse_whitespace(&n))
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

fn first_non_empty(values: Option<&[String]>) -> Option<&str> {
    values?.iter().map(|v| v.trim()).find(|v| !v.is_empty())
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn or_placeholder(value: String, placeholder: &str) -> String {
    if value.is_empty() { placeholder.to_string() } else { value }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Article with empty text fields; `normalize_article` fills the placeholders.
fn empty_article() -> Article {
    Article {
        title: String::new(),
        authors: String::new(),
        date: String::new(),
        journal: String::new(),
        tags: Vec::new(),
        r#abstract: String::new(),
        doi: String::new(),
        citation_count: 0,
        reference_count: 0,
        download_url: None,
        repository_url: None,
        arxiv_id: None,
        source: None,
    }
}
