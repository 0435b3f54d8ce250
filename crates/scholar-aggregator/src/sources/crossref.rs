//! Crossref `/works` adapter.
//!
//! Runs a bibliographic best-match query (one row) next to the paged relevance query
//! and concatenates both, best match first.

use std::collections::HashSet;

use async_trait::async_trait;

use super::{SourceAdapter, decode_items, page_offset};
use crate::client::HttpClient;
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{CrossrefItem, CrossrefResponse, RawRecord, SourceKind};

const SELECT_FIELDS: &str =
    "DOI,title,author,container-title,published,abstract,subject,type,is-referenced-by-count,reference";

const JOURNAL_ARTICLE_FILTER: &str = "type:journal-article";

#[derive(Debug, Clone)]
pub struct CrossrefSource {
    client: HttpClient,
    base_url: String,
    per_page: u32,
}

impl CrossrefSource {
    #[must_use]
    pub fn new(client: HttpClient, config: &Config) -> Self {
        Self {
            client,
            base_url: config.crossref_api_url.clone(),
            per_page: config.items_per_source,
        }
    }

    fn exact_match_params(query: &str) -> Vec<(String, String)> {
        vec![
            ("query.bibliographic".to_string(), query.to_string()),
            ("rows".to_string(), "1".to_string()),
            ("sort".to_string(), "relevance".to_string()),
            ("order".to_string(), "desc".to_string()),
            ("select".to_string(), SELECT_FIELDS.to_string()),
            ("filter".to_string(), JOURNAL_ARTICLE_FILTER.to_string()),
        ]
    }

    fn paged_params(&self, query: &str, page: u32) -> Vec<(String, String)> {
        vec![
            ("query".to_string(), query.to_string()),
            ("rows".to_string(), self.per_page.to_string()),
            ("offset".to_string(), page_offset(page, self.per_page).to_string()),
            ("sort".to_string(), "relevance".to_string()),
            ("order".to_string(), "desc".to_string()),
            ("select".to_string(), SELECT_FIELDS.to_string()),
            ("filter".to_string(), JOURNAL_ARTICLE_FILTER.to_string()),
        ]
    }
}

#[async_trait]
impl SourceAdapter for CrossrefSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Crossref
    }

    async fn fetch(&self, query: &str, page: u32) -> ClientResult<Vec<RawRecord>> {
        let url = format!("{}/works", self.base_url);
        let exact_params = Self::exact_match_params(query);
        let paged_params = self.paged_params(query, page);

        let (exact, paged) = tokio::join!(
            self.client.get_json::<CrossrefResponse>(&url, &exact_params),
            self.client.get_json::<CrossrefResponse>(&url, &paged_params),
        );
        let (exact, paged) = (exact?, paged?);

        let items = exact.message.items.into_iter().chain(paged.message.items).collect();
        let items: Vec<CrossrefItem> = decode_items(SourceKind::Crossref, items);

        let mut seen = HashSet::new();
        let records = items
            .into_iter()
            .filter(CrossrefItem::is_article)
            .filter(|item| match &item.doi {
                Some(doi) => seen.insert(doi.to_lowercase()),
                None => true,
            })
            .map(RawRecord::Crossref)
            .collect();

        Ok(records)
    }
}
