//! Types for deep research tasks and batches.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Metadata;
use crate::normalize;
use crate::polling::{Disposition, PollSnapshot};

/// Research mode. `Lite` is deprecated and normalized to `Standard` on
/// outbound payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeepResearchMode {
    Fast,
    Standard,
    Lite,
    Heavy,
}

impl DeepResearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeepResearchMode::Fast => "fast",
            DeepResearchMode::Standard => "standard",
            DeepResearchMode::Lite => "lite",
            DeepResearchMode::Heavy => "heavy",
        }
    }
}

/// Task status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeepResearchStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl DeepResearchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeepResearchStatus::Queued => "queued",
            DeepResearchStatus::Running => "running",
            DeepResearchStatus::Completed => "completed",
            DeepResearchStatus::Failed => "failed",
            DeepResearchStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeepResearchStatus::Completed
                | DeepResearchStatus::Failed
                | DeepResearchStatus::Cancelled
        )
    }
}

/// Batch status. `CompletedWithErrors` is terminal success with failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Open,
    Processing,
    Completed,
    CompletedWithErrors,
    Cancelled,
}

impl BatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchStatus::Open => "open",
            BatchStatus::Processing => "processing",
            BatchStatus::Completed => "completed",
            BatchStatus::CompletedWithErrors => "completed_with_errors",
            BatchStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BatchStatus::Completed | BatchStatus::CompletedWithErrors | BatchStatus::Cancelled
        )
    }
}

/// File attachment for research input. The wire name for the MIME type is
/// `mediaType`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileAttachment {
    /// Data URL (base64 encoded).
    pub data: String,
    pub filename: String,
    #[serde(rename = "mediaType")]
    pub media_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

/// MCP server configuration for custom tools.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerConfig {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_tools: Option<Vec<String>>,
}

/// Additional file output to generate alongside the report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deliverable {
    /// File type: "csv", "xlsx", "pptx", "docx", or "pdf".
    pub r#type: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_headers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slides: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

/// Deliverable generation result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeliverableResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub request: String,
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Token-signed authenticated download URL.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub s3_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub created_at: i64,
}

/// Search configuration for tasks and batches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included_sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Step progress for a running task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub current_step: u32,
    #[serde(default)]
    pub total_steps: u32,
}

/// Generated image metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(default)]
    pub image_id: String,
    #[serde(default)]
    pub image_type: String,
    #[serde(default)]
    pub deepresearch_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub s3_key: String,
    #[serde(default)]
    pub created_at: i64,
}

/// Cited source for a completed task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepResearchSource {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<i64>,
}

/// Response from creating a deep research task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepResearchCreateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepresearch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeepResearchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DeepResearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<DeepResearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeepResearchCreateResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Status snapshot of a deep research task.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepResearchStatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deepresearch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<DeepResearchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DeepResearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_formats: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    /// Markdown text, or structured JSON when a schema was requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<ImageMetadata>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliverables: Option<Vec<DeliverableResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<DeepResearchSource>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeepResearchStatusResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

impl PollSnapshot for DeepResearchStatusResponse {
    fn disposition(&self) -> Disposition {
        if !self.success {
            return Disposition::Unavailable(format!(
                "Failed to get status: {}",
                self.error.as_deref().unwrap_or_default()
            ));
        }
        match self.status {
            Some(DeepResearchStatus::Completed) => Disposition::Done,
            Some(DeepResearchStatus::Failed) => Disposition::Failed(format!(
                "Task failed: {}",
                self.error.as_deref().unwrap_or_default()
            )),
            Some(DeepResearchStatus::Cancelled) => {
                Disposition::Failed("Task was cancelled".to_string())
            }
            _ => Disposition::Continue,
        }
    }
}

/// Response from listing tasks; entries are raw task summaries.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeepResearchListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeepResearchListResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

macro_rules! simple_task_response {
    ($(#[$doc:meta])* $name:ident { $($(#[$fdoc:meta])* $field:ident: $ty:ty),* $(,)? }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default, Serialize, Deserialize)]
        pub struct $name {
            #[serde(default)]
            pub success: bool,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub message: Option<String>,
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub deepresearch_id: Option<String>,
            $(
                $(#[$fdoc])*
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub $field: Option<$ty>,
            )*
            #[serde(default, skip_serializing_if = "Option::is_none")]
            pub error: Option<String>,
        }

        impl $name {
            pub(crate) fn failure(error: impl Into<String>) -> Self {
                Self {
                    success: false,
                    error: Some(error.into()),
                    ..Default::default()
                }
            }
        }
    };
}

simple_task_response!(
    /// Response from adding a follow-up instruction.
    DeepResearchUpdateResponse {}
);
simple_task_response!(
    /// Response from cancelling a task.
    DeepResearchCancelResponse {}
);
simple_task_response!(
    /// Response from deleting a task.
    DeepResearchDeleteResponse {}
);
simple_task_response!(
    /// Response from toggling the public flag.
    DeepResearchTogglePublicResponse { public: bool }
);

/// Task counts within a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCounts {
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub queued: i64,
    #[serde(default)]
    pub running: i64,
    #[serde(default)]
    pub completed: i64,
    #[serde(default)]
    pub failed: i64,
    #[serde(default)]
    pub cancelled: i64,
}

/// Aggregated cost breakdown for a batch (legacy shape; see the flat
/// `cost` field on [`DeepResearchBatch`]).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BatchUsage {
    #[serde(default)]
    pub search_cost: f64,
    #[serde(default)]
    pub contents_cost: f64,
    #[serde(default)]
    pub ai_cost: f64,
    #[serde(default)]
    pub total_cost: f64,
}

/// Input for one batch task. `query` is preferred over the legacy `input`;
/// both are synced before transmission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchTaskInput {
    /// User-provided task ID; the service generates one when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl BatchTaskInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    /// Resolve the `query`/`input` alias pair and populate both fields.
    /// Returns false when neither carries a value.
    pub(crate) fn sync_aliases(&mut self) -> bool {
        match normalize::resolve_query(self.query.as_deref(), self.input.as_deref()) {
            Some(resolved) => {
                self.query = Some(resolved.clone());
                self.input = Some(resolved);
                true
            }
            None => false,
        }
    }
}

/// A batch of deep research tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeepResearchBatch {
    pub batch_id: String,
    pub status: BatchStatus,
    pub mode: DeepResearchMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_formats: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_params: Option<Value>,
    #[serde(default)]
    pub counts: BatchCounts,
    /// Flat total cost; derivable from `usage.total_cost` and vice versa.
    #[serde(default)]
    pub cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<DeepResearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<BatchUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Response from creating a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchCreateResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DeepResearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<DeepResearchMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_formats: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_params: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<BatchCounts>,
    /// Tasks created when the batch was built through the combined
    /// create-and-add path, in submission order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<BatchTaskCreated>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_collection_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchCreateResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// One task created by an add-tasks call. Task identity is dual: the
/// batch-scoped `task_id` and the global `deepresearch_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchTaskCreated {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub deepresearch_id: String,
    #[serde(default)]
    pub status: String,
}

/// Response from adding tasks to a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchAddTasksResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub added: Option<i64>,
    /// Created tasks in submission order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<BatchTaskCreated>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<BatchCounts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchAddTasksResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Status snapshot of a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchStatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch: Option<DeepResearchBatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchStatusResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            batch: None,
            error: Some(error.into()),
        }
    }
}

impl PollSnapshot for BatchStatusResponse {
    fn disposition(&self) -> Disposition {
        if !self.success {
            return Disposition::Unavailable(format!(
                "Failed to get status: {}",
                self.error.as_deref().unwrap_or_default()
            ));
        }
        match self.batch.as_ref().map(|b| b.status) {
            Some(BatchStatus::Completed) | Some(BatchStatus::CompletedWithErrors) => {
                Disposition::Done
            }
            Some(BatchStatus::Cancelled) => {
                Disposition::Failed("Batch was cancelled".to_string())
            }
            _ => Disposition::Continue,
        }
    }
}

/// Minimal task info in a batch task listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTaskListItem {
    pub deepresearch_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(default)]
    pub query: String,
    pub status: DeepResearchStatus,
    #[serde(default)]
    pub created_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// Pagination cursor for batch task listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchPagination {
    #[serde(default)]
    pub count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_key: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Response from listing tasks in a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchTasksListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<BatchTaskListItem>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<BatchPagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchTasksListResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Response from cancelling a batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchCancelResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BatchStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchCancelResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Response from listing batches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batches: Option<Vec<DeepResearchBatch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchListResponse {
    pub(crate) fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            batches: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_serde_names() {
        assert_eq!(
            serde_json::to_value(BatchStatus::CompletedWithErrors).unwrap(),
            json!("completed_with_errors")
        );
        assert_eq!(
            serde_json::from_value::<DeepResearchStatus>(json!("running")).unwrap(),
            DeepResearchStatus::Running
        );
    }

    #[test]
    fn test_task_dispositions() {
        let mut status = DeepResearchStatusResponse {
            success: true,
            status: Some(DeepResearchStatus::Running),
            ..Default::default()
        };
        assert_eq!(status.disposition(), Disposition::Continue);

        status.status = Some(DeepResearchStatus::Failed);
        status.error = Some("budget exhausted".to_string());
        assert_eq!(
            status.disposition(),
            Disposition::Failed("Task failed: budget exhausted".to_string())
        );

        status.status = Some(DeepResearchStatus::Cancelled);
        assert_eq!(
            status.disposition(),
            Disposition::Failed("Task was cancelled".to_string())
        );
    }

    #[test]
    fn test_completed_wins_over_stray_error() {
        // Defensive tie-break: a completed state alongside an error message
        // still returns the snapshot; the error stays visible on it.
        let status = DeepResearchStatusResponse {
            success: true,
            status: Some(DeepResearchStatus::Completed),
            error: Some("late warning".to_string()),
            ..Default::default()
        };
        assert_eq!(status.disposition(), Disposition::Done);
        assert_eq!(status.error.as_deref(), Some("late warning"));
    }

    #[test]
    fn test_batch_dispositions() {
        let batch = |status: BatchStatus| BatchStatusResponse {
            success: true,
            batch: Some(DeepResearchBatch {
                batch_id: "b1".to_string(),
                status,
                mode: DeepResearchMode::Standard,
                name: None,
                output_formats: None,
                search_params: None,
                counts: BatchCounts::default(),
                cost: 0.0,
                webhook_url: None,
                webhook_secret: None,
                created_at: String::new(),
                completed_at: None,
                metadata: None,
                model: None,
                usage: None,
                updated_at: None,
            }),
            error: None,
        };
        assert_eq!(batch(BatchStatus::Open).disposition(), Disposition::Continue);
        assert_eq!(batch(BatchStatus::Completed).disposition(), Disposition::Done);
        assert_eq!(
            batch(BatchStatus::CompletedWithErrors).disposition(),
            Disposition::Done
        );
        assert!(matches!(
            batch(BatchStatus::Cancelled).disposition(),
            Disposition::Failed(_)
        ));
    }

    #[test]
    fn test_task_input_alias_sync() {
        let mut legacy = BatchTaskInput {
            input: Some("legacy question".to_string()),
            ..Default::default()
        };
        assert!(legacy.sync_aliases());
        assert_eq!(legacy.query.as_deref(), Some("legacy question"));
        assert_eq!(legacy.input.as_deref(), Some("legacy question"));

        let mut empty = BatchTaskInput::default();
        assert!(!empty.sync_aliases());
    }
}
