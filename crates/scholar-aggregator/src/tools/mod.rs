//! MCP tool implementations.
//!
//! Each tool:
//! 1. Parses and validates input parameters
//! 2. Runs the aggregation pipeline or updates the session view
//! 3. Formats results as Markdown or JSON

mod insights;
mod search;
mod view;

pub use insights::*;
pub use search::*;
pub use view::*;

use std::sync::Arc;

use serde_json::json;
use tokio::sync::Mutex;

use crate::error::ToolResult;
use crate::features::FeatureExtractor;
use crate::formatters;
use crate::models::ResponseFormat;
use crate::search::{Aggregator, SearchSession};

/// Tool execution context.
///
/// Cloning shares the aggregator and the session; use [`ToolContext::with_session`] to
/// bind a context to a different client session.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Search pipeline.
    pub aggregator: Arc<Aggregator>,

    /// Search state of the calling client.
    pub session: Arc<Mutex<SearchSession>>,

    /// Question-answering collaborator, if configured.
    pub features: Option<Arc<dyn FeatureExtractor>>,
}

impl ToolContext {
    /// Create a new tool context with an empty session.
    #[must_use]
    pub fn new(aggregator: Arc<Aggregator>, features: Option<Arc<dyn FeatureExtractor>>) -> Self {
        Self { aggregator, session: Arc::new(Mutex::new(SearchSession::new())), features }
    }

    /// Same collaborators, different session.
    #[must_use]
    pub fn with_session(&self, session: Arc<Mutex<SearchSession>>) -> Self {
        Self { aggregator: Arc::clone(&self.aggregator), session, features: self.features.clone() }
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "search_articles").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Search (3)
        Box::new(search::SearchArticlesTool),
        Box::new(search::LoadMoreTool),
        Box::new(search::ClearSearchTool),
        // View (4)
        Box::new(view::SortArticlesTool),
        Box::new(view::ApplyFiltersTool),
        Box::new(view::ClearFiltersTool),
        Box::new(view::ListVenuesTool),
        // Insights (1)
        Box::new(insights::ExtractFeaturesTool),
    ]
}

/// Render the first `limit` articles of the session view.
pub fn render_view(session: &SearchSession, limit: usize, format: ResponseFormat) -> ToolResult<String> {
    let view = session.filtered_articles();
    let shown = &view[..limit.min(view.len())];

    match format {
        ResponseFormat::Markdown => {
            let mut output = view_summary(session);
            output.push_str(&formatters::format_articles_markdown(shown, view.len()));
            Ok(output)
        }
        ResponseFormat::Json => {
            let body = json!({
                "query": session.query(),
                "page": session.page(),
                "total": session.all_articles().len(),
                "visible": view.len(),
                "sortBy": session.sort_option(),
                "filters": session.filters(),
                "articles": formatters::compact_articles(shown),
            });
            Ok(serde_json::to_string_pretty(&body)?)
        }
    }
}

fn view_summary(session: &SearchSession) -> String {
    let mut parts = vec![
        format!("**Query**: {}", session.query().unwrap_or("-")),
        format!("**Page**: {}", session.page()),
        format!("**Corpus**: {}", session.all_articles().len()),
        format!("**Sort**: {}", session.sort_option()),
    ];
    if session.filters_active() {
        parts.push(format!("**Filtered**: {} visible", session.filtered_articles().len()));
    }
    format!("{}\n\n", parts.join(" | "))
}

/// Shared schema properties for view-rendering tools.
pub(crate) fn view_properties() -> serde_json::Map<String, serde_json::Value> {
    let mut props = serde_json::Map::new();
    props.insert(
        "limit".to_string(),
        json!({
            "type": "integer",
            "default": 20,
            "description": "Maximum articles to show"
        }),
    );
    props.insert(
        "responseFormat".to_string(),
        json!({
            "type": "string",
            "enum": ["markdown", "json"],
            "default": "markdown"
        }),
    );
    props
}
