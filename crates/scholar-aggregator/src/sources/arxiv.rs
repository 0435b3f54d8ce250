//! arXiv Atom export adapter.
//!
//! The feed is read with a handful of patterns rather than a full XML parser: only
//! `entry` blocks and a few child elements are needed. Title and summary keep their
//! entity escapes so the normalizer decodes them after stripping markup.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{SourceAdapter, page_offset};
use crate::client::HttpClient;
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{ArxivEntry, RawRecord, SourceKind};

fn element(name: &str) -> Regex {
    Regex::new(&format!(r"(?s)<{name}\b[^>]*>(.*?)</{name}>")).expect("valid element regex")
}

static FEED: LazyLock<Regex> = LazyLock::new(|| element("feed"));
static ENTRY: LazyLock<Regex> = LazyLock::new(|| element("entry"));
static ID: LazyLock<Regex> = LazyLock::new(|| element("id"));
static TITLE: LazyLock<Regex> = LazyLock::new(|| element("title"));
static SUMMARY: LazyLock<Regex> = LazyLock::new(|| element("summary"));
static PUBLISHED: LazyLock<Regex> = LazyLock::new(|| element("published"));
static AUTHOR: LazyLock<Regex> = LazyLock::new(|| element("author"));
static NAME: LazyLock<Regex> = LazyLock::new(|| element("name"));
static JOURNAL_REF: LazyLock<Regex> = LazyLock::new(|| element("arxiv:journal_ref"));
static CATEGORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<category\b[^>]*\bterm="([^"]*)""#).expect("valid category regex")
});

#[derive(Debug, Clone)]
pub struct ArxivSource {
    client: HttpClient,
    base_url: String,
    per_page: u32,
}

impl ArxivSource {
    #[must_use]
    pub fn new(client: HttpClient, config: &Config) -> Self {
        Self { client, base_url: config.arxiv_api_url.clone(), per_page: config.items_per_source }
    }
}

#[async_trait]
impl SourceAdapter for ArxivSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Arxiv
    }

    async fn fetch(&self, query: &str, page: u32) -> ClientResult<Vec<RawRecord>> {
        let url = format!("{}/query", self.base_url);
        let params = vec![
            ("search_query".to_string(), query.to_string()),
            ("start".to_string(), page_offset(page, self.per_page).to_string()),
            ("max_results".to_string(), self.per_page.to_string()),
        ];

        let xml = self.client.get_text(&url, &params).await?;
        if !FEED.is_match(&xml) {
            return Err(ClientError::malformed("arXiv response is not an Atom feed"));
        }

        Ok(parse_feed(&xml).into_iter().map(RawRecord::Arxiv).collect())
    }
}

/// Extract the entries of an arXiv Atom feed. Never panics; unknown input yields no
/// entries.
#[must_use]
pub fn parse_feed(xml: &str) -> Vec<ArxivEntry> {
    ENTRY
        .captures_iter(xml)
        .filter_map(|caps| caps.get(1))
        .map(|block| parse_entry(block.as_str()))
        .collect()
}

fn parse_entry(block: &str) -> ArxivEntry {
    ArxivEntry {
        id: first_text(&ID, block).map(|id| decode_xml(&id)),
        title: first_text(&TITLE, block),
        summary: first_text(&SUMMARY, block),
        published: first_text(&PUBLISHED, block),
        authors: AUTHOR
            .captures_iter(block)
            .filter_map(|caps| caps.get(1))
            .filter_map(|author| first_text(&NAME, author.as_str()))
            .map(|name| decode_xml(&name))
            .collect(),
        categories: CATEGORY
            .captures_iter(block)
            .filter_map(|caps| caps.get(1))
            .map(|term| decode_xml(term.as_str()))
            .collect(),
        journal_ref: first_text(&JOURNAL_REF, block).map(|j| decode_xml(&j)),
    }
}

fn first_text(pattern: &Regex, block: &str) -> Option<String> {
    let text = pattern.captures(block)?.get(1)?.as_str().trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn decode_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
