//! Types for the `/datasources` listing endpoints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DatasourcePricing {
    /// Cost per thousand queries.
    #[serde(default)]
    pub cpm: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasourceCoverage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

/// One datasource available for `included_sources`/`excluded_sources`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Datasource {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modality: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub languages: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Example queries suitable for few-shot prompting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_queries: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<DatasourcePricing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_frequency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coverage: Option<DatasourceCoverage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasourcesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub datasources: Vec<Datasource>,
}

impl DatasourcesResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            datasources: Vec::new(),
        }
    }
}

/// One datasource category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasourceCategory {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub dataset_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasourceCategoriesResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub categories: Vec<DatasourceCategory>,
}

impl DatasourceCategoriesResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            categories: Vec::new(),
        }
    }
}
