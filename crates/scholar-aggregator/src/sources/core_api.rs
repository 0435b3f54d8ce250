//! CORE v3 `search/works` adapter. Requires an API key.

use async_trait::async_trait;

use super::{SourceAdapter, decode_items, page_offset};
use crate::client::HttpClient;
use crate::config::Config;
use crate::error::{ClientError, ClientResult};
use crate::models::{CoreItem, CoreResponse, RawRecord, SourceKind};

#[derive(Debug, Clone)]
pub struct CoreSource {
    client: HttpClient,
    base_url: String,
    api_key: Option<String>,
    per_page: u32,
}

impl CoreSource {
    #[must_use]
    pub fn new(client: HttpClient, config: &Config) -> Self {
        Self {
            client,
            base_url: config.core_api_url.clone(),
            api_key: config.core_api_key.clone(),
            per_page: config.items_per_source,
        }
    }
}

#[async_trait]
impl SourceAdapter for CoreSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Core
    }

    async fn fetch(&self, query: &str, page: u32) -> ClientResult<Vec<RawRecord>> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("CORE_API_KEY not set, skipping CORE");
            return Ok(Vec::new());
        };

        let url = format!("{}/search/works/", self.base_url);
        let params = vec![
            ("q".to_string(), query.to_string()),
            ("limit".to_string(), self.per_page.to_string()),
            ("offset".to_string(), page_offset(page, self.per_page).to_string()),
            ("api_key".to_string(), api_key.clone()),
        ];

        let response: CoreResponse = self.client.get_json(&url, &params).await?;
        let results = response
            .results
            .ok_or_else(|| ClientError::malformed("CORE response has no results array"))?;

        let items: Vec<CoreItem> = decode_items(SourceKind::Core, results);
        Ok(items.into_iter().map(RawRecord::Core).collect())
    }
}
