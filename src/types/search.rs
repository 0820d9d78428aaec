//! Types for the `/deepsearch` endpoint.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One search hit. `content` is plain text for unstructured sources and a
/// JSON structure for data sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default)]
    pub length: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Result counts split by backend.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ResultsBySource {
    #[serde(default)]
    pub web: i64,
    #[serde(default)]
    pub proprietary: i64,
}

/// Response from the `/deepsearch` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub tx_id: String,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub results_by_source: ResultsBySource,
    #[serde(default)]
    pub total_deduction_dollars: f64,
    #[serde(default)]
    pub total_characters: i64,
}

impl SearchResponse {
    pub(crate) fn failure(
        query: impl Into<String>,
        tx_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            tx_id: tx_id.into(),
            query: query.into(),
            ..Default::default()
        }
    }
}
