//! Types for the `/contents` endpoint and its async job lifecycle.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::polling::{Disposition, PollSnapshot};

/// One per-URL extraction result, tagged by its `status` discriminator.
///
/// Responses that omit the discriminator are normalized before decoding;
/// see [`crate::normalize::normalize_content_results`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ContentsResult {
    Success {
        url: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        content: Value,
        #[serde(default)]
        length: i64,
        #[serde(default)]
        source: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary_success: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        screenshot_url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        publication_date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        citation: Option<String>,
    },
    Failed {
        url: String,
        error: String,
    },
}

impl ContentsResult {
    pub fn url(&self) -> &str {
        match self {
            ContentsResult::Success { url, .. } => url,
            ContentsResult::Failed { url, .. } => url,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ContentsResult::Success { .. })
    }
}

/// Response from a synchronous `/contents` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub tx_id: String,
    #[serde(default)]
    pub urls_requested: i64,
    #[serde(default)]
    pub urls_processed: i64,
    #[serde(default)]
    pub urls_failed: i64,
    #[serde(default)]
    pub results: Vec<ContentsResult>,
    #[serde(default)]
    pub total_cost_dollars: f64,
    #[serde(default)]
    pub total_characters: i64,
}

impl ContentsResponse {
    pub(crate) fn failure(
        urls_requested: usize,
        tx_id: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            tx_id: tx_id.into(),
            urls_requested: urls_requested as i64,
            urls_failed: urls_requested as i64,
            ..Default::default()
        }
    }
}

/// 202 response when `/contents` accepts an async job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentsJobCreateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub job_id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub urls_total: i64,
    /// Shared secret for verifying completion webhooks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// State of an async contents job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentsJobState {
    Pending,
    Processing,
    Completed,
    Partial,
    Failed,
}

impl ContentsJobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentsJobState::Pending => "pending",
            ContentsJobState::Processing => "processing",
            ContentsJobState::Completed => "completed",
            ContentsJobState::Partial => "partial",
            ContentsJobState::Failed => "failed",
        }
    }

    /// Completed, partial, and failed jobs are all terminal; the wait helper
    /// returns each of them as a final snapshot rather than raising.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ContentsJobState::Completed | ContentsJobState::Partial | ContentsJobState::Failed
        )
    }
}

/// Status snapshot of an async contents job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentsJobStatus {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub job_id: String,
    pub status: ContentsJobState,
    #[serde(default)]
    pub urls_total: i64,
    #[serde(default)]
    pub urls_processed: i64,
    #[serde(default)]
    pub urls_failed: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ContentsResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_cost_dollars: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ContentsJobStatus {
    pub(crate) fn failure(job_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            job_id: job_id.into(),
            status: ContentsJobState::Failed,
            urls_total: 0,
            urls_processed: 0,
            urls_failed: 0,
            created_at: None,
            updated_at: None,
            results: None,
            actual_cost_dollars: None,
            error: Some(error.into()),
        }
    }
}

impl PollSnapshot for ContentsJobStatus {
    fn disposition(&self) -> Disposition {
        if !self.success {
            return Disposition::Unavailable(format!(
                "Failed to get job status: {}",
                self.error.as_deref().unwrap_or_default()
            ));
        }
        if self.status.is_terminal() {
            Disposition::Done
        } else {
            Disposition::Continue
        }
    }
}
