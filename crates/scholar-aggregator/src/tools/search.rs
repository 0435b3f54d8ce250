//! Search tools: search_articles, load_more, clear_search.

use serde_json::json;

use super::{McpTool, ToolContext, render_view, view_properties};
use crate::error::{ToolError, ToolResult};
use crate::models::{SearchArticlesInput, ViewInput};

/// Fresh multi-source search.
pub struct SearchArticlesTool;

#[async_trait::async_trait]
impl McpTool for SearchArticlesTool {
    fn name(&self) -> &'static str {
        "search_articles"
    }

    fn description(&self) -> &'static str {
        "Search Crossref, CORE, arXiv and Papers with Code at once. Results are \
         deduplicated by DOI and title, then ranked by relevance, citations, recency and \
         title match. Replaces the current result set."
    }

    fn input_schema(&self) -> serde_json::Value {
        let mut props = view_properties();
        props.insert(
            "query".to_string(),
            json!({
                "type": "string",
                "description": "Search query (e.g., 'quantum error correction')"
            }),
        );
        props.insert(
            "scoringMode".to_string(),
            json!({
                "type": "string",
                "enum": ["lexical", "semantic"],
                "description": "Relevance strategy; defaults to the server setting"
            }),
        );
        json!({
            "type": "object",
            "properties": props,
            "required": ["query"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SearchArticlesInput = serde_json::from_value(input)?;

        let query = params.query.trim();
        if query.is_empty() {
            return Err(ToolError::validation("query", "cannot be empty"));
        }

        let mut session = ctx.session.lock().await;
        session.search(&ctx.aggregator, query, params.scoring_mode).await;

        render_view(&session, params.limit, params.response_format)
    }
}

/// Next page of the current query.
pub struct LoadMoreTool;

#[async_trait::async_trait]
impl McpTool for LoadMoreTool {
    fn name(&self) -> &'static str {
        "load_more"
    }

    fn description(&self) -> &'static str {
        "Fetch the next page of the current search and append articles not already in \
         the result set. Requires a prior search_articles call."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": view_properties()
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ViewInput = serde_json::from_value(input)?;

        let mut session = ctx.session.lock().await;
        let added = session
            .load_more(&ctx.aggregator)
            .await
            .ok_or_else(|| ToolError::validation("query", "no active search; call search_articles first"))?;

        let body = render_view(&session, params.limit, params.response_format)?;
        if params.response_format.is_json() {
            return Ok(body);
        }
        Ok(format!("Added {added} new articles.\n\n{body}"))
    }
}

/// Reset the session.
pub struct ClearSearchTool;

#[async_trait::async_trait]
impl McpTool for ClearSearchTool {
    fn name(&self) -> &'static str {
        "clear_search"
    }

    fn description(&self) -> &'static str {
        "Discard the current query, results and filters. The sort order is kept."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, ctx: &ToolContext, _input: serde_json::Value) -> ToolResult<String> {
        ctx.session.lock().await.clear();
        Ok("Search cleared.".to_string())
    }
}
