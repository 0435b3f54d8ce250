//! Papers with Code `/search/` adapter.

use async_trait::async_trait;

use super::{SourceAdapter, decode_items};
use crate::client::HttpClient;
use crate::config::Config;
use crate::error::ClientResult;
use crate::models::{PwcResponse, PwcResult, RawRecord, SourceKind};

#[derive(Debug, Clone)]
pub struct PapersWithCodeSource {
    client: HttpClient,
    base_url: String,
    per_page: u32,
}

impl PapersWithCodeSource {
    #[must_use]
    pub fn new(client: HttpClient, config: &Config) -> Self {
        Self {
            client,
            base_url: config.papers_with_code_api_url.clone(),
            per_page: config.items_per_source,
        }
    }
}

#[async_trait]
impl SourceAdapter for PapersWithCodeSource {
    fn kind(&self) -> SourceKind {
        SourceKind::PapersWithCode
    }

    async fn fetch(&self, query: &str, page: u32) -> ClientResult<Vec<RawRecord>> {
        let url = format!("{}/search/", self.base_url);
        let params = vec![
            ("q".to_string(), query.to_string()),
            ("page".to_string(), page.max(1).to_string()),
            ("items_per_page".to_string(), self.per_page.to_string()),
        ];

        let response: PwcResponse = self.client.get_json(&url, &params).await?;
        let results: Vec<PwcResult> = decode_items(SourceKind::PapersWithCode, response.results);
        Ok(results.into_iter().map(RawRecord::PapersWithCode).collect())
    }
}
