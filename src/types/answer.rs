//! Types for the `/answer` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::search::SearchResult;

/// Search-phase metadata attached to the final answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchMetadata {
    #[serde(default)]
    pub tx_ids: Vec<String>,
    #[serde(default)]
    pub number_of_results: i64,
    #[serde(default)]
    pub total_characters: i64,
}

/// AI token usage.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AiUsage {
    #[serde(default)]
    pub input_tokens: i64,
    #[serde(default)]
    pub output_tokens: i64,
}

/// Cost breakdown in dollars.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(default)]
    pub total_deduction_dollars: f64,
    #[serde(default)]
    pub search_deduction_dollars: f64,
    #[serde(default)]
    pub ai_deduction_dollars: f64,
    #[serde(default)]
    pub contents_deduction_dollars: f64,
}

/// Extraction metadata, populated only when content extraction ran.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    #[serde(default)]
    pub urls_requested: i64,
    #[serde(default)]
    pub urls_processed: i64,
    #[serde(default)]
    pub urls_failed: i64,
    #[serde(default)]
    pub total_characters: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract_effort: Option<String>,
}

/// Raw final-metadata frame from the answer stream.
///
/// Every field the service may omit defaults to its zero value so the
/// collecting decoder never fails on sparse metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerMetadata {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub tx_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_query: Option<String>,
    /// Answer text, or a JSON structure when `structured_output` was used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contents: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_results: Option<Vec<SearchResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_metadata: Option<SearchMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_usage: Option<AiUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<CostBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_metadata: Option<ExtractionMetadata>,
}

/// Collected response from the `/answer` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub tx_id: String,
    #[serde(default)]
    pub original_query: String,
    #[serde(default)]
    pub contents: String,
    #[serde(default)]
    pub search_results: Vec<SearchResult>,
    #[serde(default)]
    pub search_metadata: SearchMetadata,
    #[serde(default)]
    pub ai_usage: AiUsage,
    #[serde(default)]
    pub cost: CostBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraction_metadata: Option<ExtractionMetadata>,
}

impl AnswerResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}
