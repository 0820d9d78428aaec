//! Deep research batch operations.

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::client::Valyu;
use crate::errors::{Result, ValyuError};
use crate::normalize::{resolve_mode, sync_batch_aliases};
use crate::polling::{wait_until_terminal, PollOptions};
use crate::types::{
    BatchAddTasksResponse, BatchCancelResponse, BatchCreateResponse, BatchListResponse,
    BatchStatusResponse, BatchTaskInput, BatchTasksListResponse, DeepResearchBatch,
    DeepResearchMode, Metadata, SearchConfig,
};

/// Client for `/deepresearch/batches` endpoints, borrowed from [`Valyu`].
#[derive(Debug, Clone, Copy)]
pub struct BatchClient<'a> {
    client: &'a Valyu,
}

impl<'a> BatchClient<'a> {
    pub(crate) fn new(client: &'a Valyu) -> Self {
        Self { client }
    }

    /// Start building a batch.
    pub fn create(&self) -> BatchCreateBuilder<'a> {
        BatchCreateBuilder::new(self.client)
    }

    /// Add tasks to an open batch.
    ///
    /// Tasks keep their submission order in the response; callers that rely
    /// on positional correlation for id-less tasks depend on this.
    pub async fn add_tasks(
        &self,
        batch_id: &str,
        mut tasks: Vec<BatchTaskInput>,
    ) -> BatchAddTasksResponse {
        if tasks.is_empty() {
            return BatchAddTasksResponse::failure("tasks list cannot be empty");
        }
        for task in &mut tasks {
            if !task.sync_aliases() {
                return BatchAddTasksResponse::failure(
                    "Either 'query' or 'input' must be provided",
                );
            }
        }

        let payload = match serde_json::to_value(&tasks) {
            Ok(value) => json!({ "tasks": value }),
            Err(err) => {
                return BatchAddTasksResponse::failure(format!("Failed to encode tasks: {err}"))
            }
        };
        debug!(batch_id, count = tasks.len(), "batch add tasks");
        let outcome = match self
            .client
            .http
            .post_outcome(&format!("/deepresearch/batches/{batch_id}/tasks"), &payload)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return BatchAddTasksResponse::failure(format!("Request failed: {err}")),
        };
        if !outcome.ok {
            return BatchAddTasksResponse::failure(outcome.error_message());
        }
        match serde_json::from_value::<BatchAddTasksResponse>(outcome.body) {
            Ok(mut response) => {
                response.success = true;
                if response.batch_id.is_none() {
                    response.batch_id = Some(batch_id.to_string());
                }
                response
            }
            Err(err) => BatchAddTasksResponse::failure(format!("Failed to parse response: {err}")),
        }
    }

    /// Fetch the status of a batch.
    pub async fn status(&self, batch_id: &str) -> BatchStatusResponse {
        let outcome = match self
            .client
            .http
            .get_outcome(&format!("/deepresearch/batches/{batch_id}"), None)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return BatchStatusResponse::failure(format!("Request failed: {err}")),
        };
        if !outcome.ok {
            return BatchStatusResponse::failure(outcome.error_message());
        }
        let mut body = outcome.body;
        // Some responses nest the batch under a "batch" key.
        if let Some(nested) = body.get_mut("batch").map(Value::take) {
            body = nested;
        }
        sync_batch_aliases(&mut body);
        match serde_json::from_value::<DeepResearchBatch>(body) {
            Ok(batch) => BatchStatusResponse {
                success: true,
                batch: Some(batch),
                error: None,
            },
            Err(err) => BatchStatusResponse::failure(format!("Failed to parse response: {err}")),
        }
    }

    /// List tasks in a batch, optionally filtered by status and paginated
    /// with the `last_key` cursor from a previous page.
    pub async fn list_tasks(
        &self,
        batch_id: &str,
        status: Option<&str>,
        limit: Option<u32>,
        last_key: Option<&str>,
    ) -> BatchTasksListResponse {
        let limit_str = limit.map(|n| n.to_string());
        let mut params: Vec<(&str, &str)> = Vec::new();
        if let Some(status) = status {
            params.push(("status", status));
        }
        if let Some(limit) = limit_str.as_deref() {
            params.push(("limit", limit));
        }
        if let Some(key) = last_key {
            params.push(("last_key", key));
        }
        let query = if params.is_empty() {
            None
        } else {
            Some(params.as_slice())
        };

        let outcome = match self
            .client
            .http
            .get_outcome(&format!("/deepresearch/batches/{batch_id}/tasks"), query)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return BatchTasksListResponse::failure(format!("Request failed: {err}")),
        };
        if !outcome.ok {
            return BatchTasksListResponse::failure(outcome.error_message());
        }
        match serde_json::from_value::<BatchTasksListResponse>(outcome.body) {
            Ok(mut response) => {
                response.success = true;
                if response.batch_id.is_none() {
                    response.batch_id = Some(batch_id.to_string());
                }
                response
            }
            Err(err) => BatchTasksListResponse::failure(format!("Failed to parse response: {err}")),
        }
    }

    /// Cancel a batch and its queued tasks.
    pub async fn cancel(&self, batch_id: &str) -> BatchCancelResponse {
        let outcome = match self
            .client
            .http
            .post_outcome(&format!("/deepresearch/batches/{batch_id}/cancel"), &json!({}))
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return BatchCancelResponse::failure(format!("Request failed: {err}")),
        };
        if !outcome.ok {
            return BatchCancelResponse::failure(outcome.error_message());
        }
        match serde_json::from_value::<BatchCancelResponse>(outcome.body) {
            Ok(mut response) => {
                response.success = true;
                response
            }
            Err(err) => BatchCancelResponse::failure(format!("Failed to parse response: {err}")),
        }
    }

    /// List recent batches.
    pub async fn list(&self, limit: Option<u32>) -> BatchListResponse {
        let limit_str = limit.map(|n| n.to_string());
        let params = limit_str.as_deref().map(|n| vec![("limit", n)]);
        let outcome = match self
            .client
            .http
            .get_outcome("/deepresearch/batches", params.as_deref())
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return BatchListResponse::failure(format!("Request failed: {err}")),
        };
        if !outcome.ok {
            return BatchListResponse::failure(outcome.error_message());
        }
        let mut raw = match outcome.body {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("batches") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        for batch in &mut raw {
            sync_batch_aliases(batch);
        }
        match serde_json::from_value::<Vec<DeepResearchBatch>>(Value::Array(raw)) {
            Ok(batches) => BatchListResponse {
                success: true,
                batches: Some(batches),
                error: None,
            },
            Err(err) => BatchListResponse::failure(format!("Failed to parse response: {err}")),
        }
    }

    /// Poll a batch until every task has finished.
    ///
    /// `completed_with_errors` is returned as a snapshot like `completed`;
    /// cancellation raises [`crate::ValyuError::JobFailed`].
    pub async fn wait_for_completion(&self, batch_id: &str) -> Result<BatchStatusResponse> {
        self.wait_for_completion_with_options(batch_id, PollOptions::batch(), None)
            .await
    }

    pub async fn wait_for_completion_with_options(
        &self,
        batch_id: &str,
        options: PollOptions,
        on_progress: Option<&mut dyn FnMut(&BatchStatusResponse)>,
    ) -> Result<BatchStatusResponse> {
        wait_until_terminal(move || self.status(batch_id), options, on_progress).await
    }
}

/// Builder for creating a batch.
#[derive(Debug)]
#[must_use = "builders do nothing until run() is awaited"]
pub struct BatchCreateBuilder<'a> {
    client: &'a Valyu,
    name: Option<String>,
    mode: Option<DeepResearchMode>,
    model: Option<DeepResearchMode>,
    output_formats: Option<Vec<Value>>,
    search: Option<SearchConfig>,
    webhook_url: Option<String>,
    brand_collection_id: Option<String>,
    metadata: Option<Metadata>,
}

impl<'a> BatchCreateBuilder<'a> {
    fn new(client: &'a Valyu) -> Self {
        Self {
            client,
            name: None,
            mode: None,
            model: None,
            output_formats: None,
            search: None,
            webhook_url: None,
            brand_collection_id: None,
            metadata: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn mode(mut self, mode: DeepResearchMode) -> Self {
        self.mode = Some(mode);
        self
    }

    /// Legacy alias for `mode`.
    pub fn model(mut self, model: DeepResearchMode) -> Self {
        self.model = Some(model);
        self
    }

    pub fn output_formats<I>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.output_formats = Some(formats.into_iter().collect());
        self
    }

    /// Search configuration applied to every task in the batch.
    pub fn search(mut self, search: SearchConfig) -> Self {
        self.search = Some(search);
        self
    }

    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn brand_collection_id(mut self, id: impl Into<String>) -> Self {
        self.brand_collection_id = Some(id.into());
        self
    }

    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    fn payload(&self) -> Value {
        let mut payload = Map::new();
        let mode = resolve_mode(
            self.mode.map(|m| m.as_str()),
            self.model.map(|m| m.as_str()),
        );
        payload.insert("mode".to_string(), json!(mode));
        if self.mode.is_none() && self.model.is_some() {
            payload.insert("model".to_string(), json!(mode));
        }
        if let Some(name) = &self.name {
            payload.insert("name".to_string(), json!(name));
        }
        if let Some(formats) = &self.output_formats {
            payload.insert("output_formats".to_string(), Value::Array(formats.clone()));
        }
        if let Some(search) = &self.search {
            payload.insert(
                "search".to_string(),
                serde_json::to_value(search).unwrap_or(Value::Null),
            );
        }
        if let Some(url) = &self.webhook_url {
            payload.insert("webhook_url".to_string(), json!(url));
        }
        if let Some(id) = &self.brand_collection_id {
            payload.insert("brand_collection_id".to_string(), json!(id));
        }
        if let Some(metadata) = &self.metadata {
            payload.insert(
                "metadata".to_string(),
                serde_json::to_value(metadata).unwrap_or(Value::Null),
            );
        }
        Value::Object(payload)
    }

    /// Create the batch.
    pub async fn run(self) -> BatchCreateResponse {
        let payload = self.payload();
        debug!("batch create");
        let outcome = match self
            .client
            .http
            .post_outcome("/deepresearch/batches", &payload)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return BatchCreateResponse::failure(format!("Request failed: {err}")),
        };
        if !outcome.ok {
            return BatchCreateResponse::failure(outcome.error_message());
        }
        match serde_json::from_value::<BatchCreateResponse>(outcome.body) {
            Ok(mut response) => {
                response.success = true;
                response
            }
            Err(err) => BatchCreateResponse::failure(format!("Failed to parse response: {err}")),
        }
    }

    /// Create the batch and immediately add `tasks`.
    ///
    /// When the add fails after a successful create, the returned response
    /// keeps the new `batch_id` so the caller can retry or cancel.
    pub async fn run_with_tasks(self, tasks: Vec<BatchTaskInput>) -> BatchCreateResponse {
        let client = BatchClient::new(self.client);
        let mut created = self.run().await;
        if !created.success {
            return created;
        }
        let Some(batch_id) = created.batch_id.clone() else {
            created.success = false;
            created.error = Some("create response carried no batch_id".to_string());
            return created;
        };

        let added = client.add_tasks(&batch_id, tasks).await;
        if !added.success {
            created.success = false;
            created.error = Some(format!(
                "Failed to add tasks: {}",
                added.error.as_deref().unwrap_or_default()
            ));
            return created;
        }
        if let Some(counts) = added.counts {
            created.counts = Some(counts);
        }
        created.tasks = added.tasks;
        created
    }

    /// Like [`run_with_tasks`](Self::run_with_tasks), then block until the
    /// batch reaches a terminal state.
    ///
    /// A polling error is folded into the returned response as
    /// `Error while waiting: {e}` with the `batch_id` preserved.
    pub async fn run_with_tasks_and_wait(
        self,
        tasks: Vec<BatchTaskInput>,
        options: PollOptions,
        on_progress: Option<&mut dyn FnMut(&BatchStatusResponse)>,
    ) -> BatchCreateResponse {
        let client = BatchClient::new(self.client);
        let mut created = self.run_with_tasks(tasks).await;
        if !created.success {
            return created;
        }
        let Some(batch_id) = created.batch_id.clone() else {
            return created;
        };

        if let Err(err) = client
            .wait_for_completion_with_options(&batch_id, options, on_progress)
            .await
        {
            let message = match err {
                ValyuError::JobFailed(m) | ValyuError::Timeout(m) => m,
                other => other.to_string(),
            };
            created.success = false;
            created.error = Some(format!("Error while waiting: {message}"));
        }
        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> Valyu {
        Valyu::with_base_url("test_key", "http://127.0.0.1:9").unwrap()
    }

    #[tokio::test]
    async fn test_add_tasks_rejects_empty_list() {
        let valyu = client();
        let response = valyu.batch().add_tasks("batch_1", Vec::new()).await;
        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("tasks list cannot be empty"));
    }

    #[tokio::test]
    async fn test_add_tasks_rejects_blank_task() {
        let valyu = client();
        let tasks = vec![BatchTaskInput::new("real question"), BatchTaskInput::default()];
        let response = valyu.batch().add_tasks("batch_1", tasks).await;
        assert!(!response.success);
        assert_eq!(
            response.error.as_deref(),
            Some("Either 'query' or 'input' must be provided")
        );
    }

    #[test]
    fn test_create_payload_mode_resolution() {
        let valyu = client();

        let payload = valyu.batch().create().payload();
        assert_eq!(payload["mode"], "standard");
        assert!(payload.get("model").is_none());

        let payload = valyu
            .batch()
            .create()
            .model(DeepResearchMode::Lite)
            .payload();
        assert_eq!(payload["mode"], "standard");
        assert_eq!(payload["model"], "standard");

        // An explicit mode wins and the legacy field is dropped.
        let payload = valyu
            .batch()
            .create()
            .mode(DeepResearchMode::Fast)
            .model(DeepResearchMode::Heavy)
            .payload();
        assert_eq!(payload["mode"], "fast");
        assert!(payload.get("model").is_none());
    }

    #[test]
    fn test_create_payload_optionals() {
        let valyu = client();
        let payload = valyu
            .batch()
            .create()
            .name("q3 coverage")
            .webhook_url("https://hooks.example.com/batch")
            .payload();
        assert_eq!(payload["name"], "q3 coverage");
        assert_eq!(payload["webhook_url"], "https://hooks.example.com/batch");
        assert!(payload.get("search").is_none());
    }
}
