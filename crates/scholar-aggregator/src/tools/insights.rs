//! Insight tools: extract_features.

use serde_json::json;

use super::{McpTool, ToolContext};
use crate::error::{EmbeddingError, ToolError, ToolResult};
use crate::formatters;
use crate::models::{ExtractFeaturesInput, ResponseFormat};

/// Extract key findings from an abstract.
pub struct ExtractFeaturesTool;

#[async_trait::async_trait]
impl McpTool for ExtractFeaturesTool {
    fn name(&self) -> &'static str {
        "extract_features"
    }

    fn description(&self) -> &'static str {
        "Extract the main outcome and methodology from an abstract using a \
         question-answering model. Pass the abstract directly or the DOI of an article \
         in the current results."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "abstract": {
                    "type": "string",
                    "description": "Abstract text"
                },
                "doi": {
                    "type": "string",
                    "description": "DOI of an article in the current results"
                },
                "responseFormat": {
                    "type": "string",
                    "enum": ["markdown", "json"],
                    "default": "markdown"
                }
            }
        })
    }

    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String> {
        let params: ExtractFeaturesInput = serde_json::from_value(input)?;

        let extractor = ctx
            .features
            .as_ref()
            .ok_or_else(|| EmbeddingError::NotConfigured("Feature extraction".to_string()))?;

        let (title, text) = match (params.r#abstract.as_deref(), params.doi.as_deref()) {
            (Some(text), _) if !text.trim().is_empty() => (None, text.trim().to_string()),
            (_, Some(doi)) => {
                let session = ctx.session.lock().await;
                let article = session.find_by_doi(doi).ok_or_else(|| {
                    ToolError::validation("doi", format!("'{doi}' is not in the current results"))
                })?;
                if !article.article.has_abstract() {
                    return Err(ToolError::unavailable(format!("no abstract for '{doi}'")));
                }
                (Some(article.article.title.clone()), article.article.r#abstract.clone())
            }
            _ => return Err(ToolError::validation("abstract", "provide an abstract or a doi")),
        };

        let features = extractor.extract_features(&text).await?;
        tracing::debug!(count = features.len(), "Features extracted");

        match params.response_format {
            ResponseFormat::Markdown => {
                Ok(formatters::format_features_markdown(title.as_deref(), &features))
            }
            ResponseFormat::Json => Ok(serde_json::to_string_pretty(&formatters::features_json(
                params.doi.as_deref(),
                &features,
            ))?),
        }
    }
}
