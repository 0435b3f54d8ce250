//! View tools: sort_articles, apply_filters, clear_filters, list_venues.
//!
//! These never refetch; they recompute the view from the session corpus.

use serde_json::json;

use super::{McpTool, ToolContext, render_view, view_properties};
use crate::error::{ToolError, ToolResult};
use crate::formatters;
use crate::models::{ApplyFiltersInput, ResponseFormat, SortArticlesInput, ViewInput};

/// Reorder the current results.
pub struct SortArticlesTool;

#[async_trait::async_trait]
impl McpTool for SortArticlesTool {
    fn name(&self) -> &'static str {
        "sort_articles"
    }

    fn description(&self) -> &'static str {
        "Reorder the current results by relevance, citation count or publication date. \
         Scores are not recomputed."
    }

    fn input_schema(&self) -> serde_json::Value {
        let mut props = view_properties();
        props.insert(
            "sortBy".to_string(),
            json!({
                "type": "string",
                "enum": ["relevance", "citationCount", "date"]
            }),
        );
        json!({
            "type": "object",
            "properties": props,
            "required": ["sortBy"]
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: SortArticlesInput = serde_json::from_value(input)?;

        let mut session = ctx.session.lock().await;
        session.set_sort(params.sort_by);
        tracing::info!(sort = %params.sort_by, "View re-sorted");

        render_view(&session, params.limit, params.response_format)
    }
}

/// Restrict the current results.
pub struct ApplyFiltersTool;

#[async_trait::async_trait]
impl McpTool for ApplyFiltersTool {
    fn name(&self) -> &'static str {
        "apply_filters"
    }

    fn description(&self) -> &'static str {
        "Filter the current results by publication date range, venue and minimum \
         citation count. Replaces any previous filters."
    }

    fn input_schema(&self) -> serde_json::Value {
        let mut props = view_properties();
        props.insert(
            "startDate".to_string(),
            json!({
                "type": "string",
                "format": "date",
                "description": "Earliest publication date, inclusive (YYYY-MM-DD)"
            }),
        );
        props.insert(
            "endDate".to_string(),
            json!({
                "type": "string",
                "format": "date",
                "description": "Latest publication date, inclusive (YYYY-MM-DD)"
            }),
        );
        props.insert(
            "journals".to_string(),
            json!({
                "type": "array",
                "items": {"type": "string"},
                "description": "Allowed venues (see list_venues)"
            }),
        );
        props.insert(
            "minCitations".to_string(),
            json!({
                "type": "integer",
                "minimum": 0
            }),
        );
        json!({
            "type": "object",
            "properties": props
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ApplyFiltersInput = serde_json::from_value(input)?;

        if let (Some(start), Some(end)) = (params.criteria.start_date, params.criteria.end_date) {
            if start > end {
                return Err(ToolError::validation("startDate", "must not be after endDate"));
            }
        }

        let mut session = ctx.session.lock().await;
        session.apply_filters(params.criteria);
        tracing::info!(
            visible = session.filtered_articles().len(),
            corpus = session.all_articles().len(),
            "Filters applied"
        );

        render_view(&session, params.limit, params.response_format)
    }
}

/// Drop every filter.
pub struct ClearFiltersTool;

#[async_trait::async_trait]
impl McpTool for ClearFiltersTool {
    fn name(&self) -> &'static str {
        "clear_filters"
    }

    fn description(&self) -> &'static str {
        "Remove all filters and show the full result set in the current sort order."
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
        session.clear_filters();

        render_view(&session, params.limit, params.response_format)
    }
}

/// Venues present in the current results.
pub struct ListVenuesTool;

#[async_trait::async_trait]
impl McpTool for ListVenuesTool {
    fn name(&self) -> &'static str {
        "list_venues"
    }

    fn description(&self) -> &'static str {
        "List the journals and venues present in the current results, for use with \
         apply_filters."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ViewInput = serde_json::from_value(input)?;

        let session = ctx.session.lock().await;
        let venues = session.available_journals();

        match params.response_format {
            ResponseFormat::Markdown => Ok(formatters::format_venues_markdown(venues)),
            ResponseFormat::Json => Ok(serde_json::to_string_pretty(&json!({ "venues": venues }))?),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Config;
    use crate::models::{Article, EnhancedArticle};
    use crate::search::Aggregator;

    async fn seeded_context() -> ToolContext {
        let config = Config::for_testing("http://localhost");
        let ctx = ToolContext::new(Arc::new(Aggregator::with_sources(&config, Vec::new())), None);
        let articles = [("10.1/a", "Nature", "2018", 3), ("10.1/b", "Science", "2022", 40)]
            .into_iter()
            .map(|(doi, journal, date, citations)| {
                EnhancedArticle::unscored(Article {
                    doi: doi.into(),
                    title: doi.into(),
                    journal: journal.into(),
                    date: date.into(),
                    citation_count: citations,
                    ..Default::default()
                })
            })
            .collect();
        ctx.session.lock().await.replace_corpus("test", articles);
        ctx
    }

    #[tokio::test]
    async fn test_apply_filters_rejects_inverted_range() {
        let ctx = seeded_context().await;
        let err = ApplyFiltersTool
            .execute(&ctx, json!({"startDate": "2023-01-01", "endDate": "2020-01-01"}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_filter_then_clear() {
        let ctx = seeded_context().await;
        let out = ApplyFiltersTool
            .execute(&ctx, json!({"minCitations": 10, "responseFormat": "json"}))
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["visible"], 1);
        assert_eq!(json["total"], 2);

        ClearFiltersTool.execute(&ctx, json!({})).await.unwrap();
        assert_eq!(ctx.session.lock().await.filtered_articles().len(), 2);
    }

    #[tokio::test]
    async fn test_sort_by_citations() {
        let ctx = seeded_context().await;
        let out = SortArticlesTool
            .execute(&ctx, json!({"sortBy": "citationCount", "responseFormat": "json"}))
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(json["articles"][0]["doi"], "10.1/b");
    }

    #[tokio::test]
    async fn test_list_venues() {
        let ctx = seeded_context().await;
        let out = ListVenuesTool.execute(&ctx, json!({})).await.unwrap();
        assert!(out.contains("# Venues (2)"));
        assert!(out.contains("- Nature"));
    }
}
