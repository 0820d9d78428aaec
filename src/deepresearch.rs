//! Deep research task operations.

use serde_json::{json, Map, Value};
use tokio::time::Instant;
use tracing::debug;

use crate::client::Valyu;
use crate::errors::{Result, ValyuError};
use crate::normalize::{canonical_mode, resolve_mode, resolve_query};
use crate::polling::{wait_until_terminal, PollOptions};
use crate::types::{
    DeepResearchCancelResponse, DeepResearchCreateResponse, DeepResearchDeleteResponse,
    DeepResearchListResponse, DeepResearchMode, DeepResearchStatus, DeepResearchStatusResponse,
    DeepResearchTogglePublicResponse, DeepResearchUpdateResponse, Deliverable, FileAttachment,
    McpServerConfig, Metadata, SearchConfig,
};

/// Client for `/deepresearch` task endpoints, borrowed from [`Valyu`].
#[derive(Debug, Clone, Copy)]
pub struct DeepResearchClient<'a> {
    client: &'a Valyu,
}

impl<'a> DeepResearchClient<'a> {
    pub(crate) fn new(client: &'a Valyu) -> Self {
        Self { client }
    }

    /// Start building a research task. An empty query is allowed here when
    /// the legacy `input` field is set on the builder instead.
    pub fn create(&self, query: impl Into<String>) -> DeepResearchBuilder<'a> {
        DeepResearchBuilder::new(self.client, query.into())
    }

    /// Fetch the status of a task.
    pub async fn status(&self, task_id: &str) -> DeepResearchStatusResponse {
        let outcome = match self
            .client
            .http
            .get_outcome(&format!("/deepresearch/tasks/{task_id}/status"), None)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                return DeepResearchStatusResponse::failure(format!("Request failed: {err}"))
            }
        };
        if !outcome.ok {
            return DeepResearchStatusResponse::failure(outcome.error_message());
        }
        match serde_json::from_value::<DeepResearchStatusResponse>(outcome.body) {
            Ok(mut status) => {
                status.success = true;
                status
            }
            Err(err) => {
                DeepResearchStatusResponse::failure(format!("Failed to parse response: {err}"))
            }
        }
    }

    /// Poll a task until it completes. Failure and cancellation raise
    /// [`ValyuError::JobFailed`].
    pub async fn wait(&self, task_id: &str) -> Result<DeepResearchStatusResponse> {
        self.wait_with_options(task_id, PollOptions::deepresearch(), None)
            .await
    }

    pub async fn wait_with_options(
        &self,
        task_id: &str,
        options: PollOptions,
        on_progress: Option<&mut dyn FnMut(&DeepResearchStatusResponse)>,
    ) -> Result<DeepResearchStatusResponse> {
        wait_until_terminal(move || self.status(task_id), options, on_progress).await
    }

    /// Poll a task while surfacing step progress and new agent messages.
    ///
    /// `on_progress` receives `(current_step, total_steps)` whenever the
    /// reported progress changes; `on_message` receives each message not seen
    /// on a previous poll, in order.
    pub async fn stream(
        &self,
        task_id: &str,
        on_progress: Option<&mut dyn FnMut(u32, u32)>,
        on_message: Option<&mut dyn FnMut(&Value)>,
    ) -> Result<DeepResearchStatusResponse> {
        self.stream_with_options(task_id, PollOptions::deepresearch(), on_progress, on_message)
            .await
    }

    pub async fn stream_with_options(
        &self,
        task_id: &str,
        options: PollOptions,
        mut on_progress: Option<&mut dyn FnMut(u32, u32)>,
        mut on_message: Option<&mut dyn FnMut(&Value)>,
    ) -> Result<DeepResearchStatusResponse> {
        let start = Instant::now();
        let mut seen_messages = 0usize;
        let mut last_progress = None;

        loop {
            let status = self.status(task_id).await;
            if !status.success {
                return Err(ValyuError::JobFailed(format!(
                    "Failed to get status: {}",
                    status.error.as_deref().unwrap_or_default()
                )));
            }

            if let Some(messages) = &status.messages {
                for message in messages.iter().skip(seen_messages) {
                    if let Some(callback) = on_message.as_deref_mut() {
                        callback(message);
                    }
                }
                seen_messages = seen_messages.max(messages.len());
            }

            if let Some(progress) = status.progress {
                let current = (progress.current_step, progress.total_steps);
                if last_progress != Some(current) {
                    last_progress = Some(current);
                    if let Some(callback) = on_progress.as_deref_mut() {
                        callback(current.0, current.1);
                    }
                }
            }

            match status.status {
                Some(DeepResearchStatus::Completed) => return Ok(status),
                Some(state @ DeepResearchStatus::Failed)
                | Some(state @ DeepResearchStatus::Cancelled) => {
                    return Err(ValyuError::JobFailed(format!(
                        "Task {}: {}",
                        state.as_str(),
                        status.error.as_deref().unwrap_or_default()
                    )));
                }
                _ => {}
            }

            if start.elapsed() > options.max_wait {
                return Err(ValyuError::Timeout(format!(
                    "did not reach a terminal state within {} seconds",
                    options.max_wait.as_secs()
                )));
            }
            tokio::time::sleep(options.interval).await;
        }
    }

    /// List recent tasks.
    pub async fn list(&self, limit: Option<u32>) -> DeepResearchListResponse {
        let limit_str = limit.map(|n| n.to_string());
        let params = limit_str.as_deref().map(|n| vec![("limit", n)]);
        let outcome = match self
            .client
            .http
            .get_outcome("/deepresearch/tasks", params.as_deref())
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return DeepResearchListResponse::failure(format!("Request failed: {err}")),
        };
        if !outcome.ok {
            return DeepResearchListResponse::failure(outcome.error_message());
        }
        // The endpoint returns a bare array; tolerate a wrapped one too.
        let data = match outcome.body {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("data") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };
        DeepResearchListResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Add a follow-up instruction to a running task.
    pub async fn update(&self, task_id: &str, instruction: &str) -> DeepResearchUpdateResponse {
        if instruction.trim().is_empty() {
            return DeepResearchUpdateResponse::failure("instruction is required and cannot be empty");
        }
        let payload = json!({ "instruction": instruction });
        self.post_simple(&format!("/deepresearch/tasks/{task_id}/update"), &payload)
            .await
    }

    /// Cancel a running task.
    pub async fn cancel(&self, task_id: &str) -> DeepResearchCancelResponse {
        self.post_simple(&format!("/deepresearch/tasks/{task_id}/cancel"), &json!({}))
            .await
    }

    /// Delete a task and its artifacts.
    pub async fn delete(&self, task_id: &str) -> DeepResearchDeleteResponse {
        let outcome = match self
            .client
            .http
            .delete_outcome(&format!("/deepresearch/tasks/{task_id}/delete"))
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                return DeepResearchDeleteResponse::failure(format!("Request failed: {err}"))
            }
        };
        parse_simple(outcome)
    }

    /// Make a task report public or private.
    pub async fn toggle_public(
        &self,
        task_id: &str,
        public: bool,
    ) -> DeepResearchTogglePublicResponse {
        let payload = json!({ "public": public });
        self.post_simple(&format!("/deepresearch/tasks/{task_id}/public"), &payload)
            .await
    }

    /// Download a task asset (image, deliverable file) as raw bytes.
    ///
    /// `token` is the access token embedded in signed asset URLs; it is
    /// required for assets of public reports fetched without an API key.
    pub async fn get_asset(
        &self,
        task_id: &str,
        asset_id: &str,
        token: Option<&str>,
    ) -> Result<Vec<u8>> {
        let params = token.map(|t| vec![("token", t)]);
        let bytes = self
            .client
            .http
            .get_bytes(
                &format!("/deepresearch/tasks/{task_id}/assets/{asset_id}"),
                params.as_deref(),
            )
            .await?;
        Ok(bytes)
    }

    async fn post_simple<T>(&self, path: &str, payload: &Value) -> T
    where
        T: serde::de::DeserializeOwned + SimpleResponse,
    {
        let outcome = match self.client.http.post_outcome(path, payload).await {
            Ok(outcome) => outcome,
            Err(err) => return T::failure_response(format!("Request failed: {err}")),
        };
        parse_simple(outcome)
    }
}

fn parse_simple<T>(outcome: crate::http::JsonOutcome) -> T
where
    T: serde::de::DeserializeOwned + SimpleResponse,
{
    if !outcome.ok {
        return T::failure_response(outcome.error_message());
    }
    match serde_json::from_value::<T>(outcome.body) {
        Ok(mut response) => {
            response.mark_success();
            response
        }
        Err(err) => T::failure_response(format!("Failed to parse response: {err}")),
    }
}

/// Shared shape of the small task mutation responses.
trait SimpleResponse {
    fn failure_response(error: String) -> Self;
    fn mark_success(&mut self);
}

macro_rules! impl_simple_response {
    ($($ty:ty),* $(,)?) => {
        $(
            impl SimpleResponse for $ty {
                fn failure_response(error: String) -> Self {
                    Self::failure(error)
                }
                fn mark_success(&mut self) {
                    self.success = true;
                }
            }
        )*
    };
}

impl_simple_response!(
    DeepResearchUpdateResponse,
    DeepResearchCancelResponse,
    DeepResearchDeleteResponse,
    DeepResearchTogglePublicResponse,
);

/// Builder for creating a deep research task.
#[derive(Debug)]
#[must_use = "builders do nothing until run() is awaited"]
pub struct DeepResearchBuilder<'a> {
    client: &'a Valyu,
    query: String,
    input: Option<String>,
    mode: Option<DeepResearchMode>,
    model: Option<DeepResearchMode>,
    output_formats: Option<Vec<Value>>,
    strategy: Option<String>,
    search: Option<SearchConfig>,
    urls: Option<Vec<String>>,
    files: Option<Vec<FileAttachment>>,
    deliverables: Option<Vec<Deliverable>>,
    mcp_servers: Option<Vec<McpServerConfig>>,
    code_execution: bool,
    previous_reports: Option<Vec<String>>,
    webhook_url: Option<String>,
    alert_email: Option<Value>,
    brand_collection_id: Option<String>,
    metadata: Option<Metadata>,
}

impl<'a> DeepResearchBuilder<'a> {
    fn new(client: &'a Valyu, query: String) -> Self {
        Self {
            client,
            query,
            input: None,
            mode: None,
            model: None,
            output_formats: None,
            strategy: None,
            search: None,
            urls: None,
            files: None,
            deliverables: None,
            mcp_servers: None,
            code_execution: true,
            previous_reports: None,
            webhook_url: None,
            alert_email: None,
            brand_collection_id: None,
            metadata: None,
        }
    }

    /// Legacy alias for the query; used when `query` is empty.
    pub fn input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
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

    /// Output formats: "markdown", "pdf", or a JSON schema object.
    pub fn output_formats<I>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.output_formats = Some(formats.into_iter().collect());
        self
    }

    pub fn strategy(mut self, strategy: impl Into<String>) -> Self {
        self.strategy = Some(strategy.into());
        self
    }

    pub fn search(mut self, search: SearchConfig) -> Self {
        self.search = Some(search);
        self
    }

    /// Seed URLs the researcher must read.
    pub fn urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    pub fn files(mut self, files: Vec<FileAttachment>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn deliverables(mut self, deliverables: Vec<Deliverable>) -> Self {
        self.deliverables = Some(deliverables);
        self
    }

    pub fn mcp_servers(mut self, servers: Vec<McpServerConfig>) -> Self {
        self.mcp_servers = Some(servers);
        self
    }

    pub fn code_execution(mut self, enabled: bool) -> Self {
        self.code_execution = enabled;
        self
    }

    /// IDs of earlier tasks to build on.
    pub fn previous_reports<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.previous_reports = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    /// One address or a list of addresses to notify on completion.
    pub fn alert_email(mut self, email: impl Into<String>) -> Self {
        self.alert_email = Some(Value::String(email.into()));
        self
    }

    pub fn alert_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alert_email = Some(Value::Array(
            emails
                .into_iter()
                .map(|e| Value::String(e.into()))
                .collect(),
        ));
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

    fn payload(&self, query: &str) -> Value {
        let mut payload = Map::new();
        payload.insert("query".to_string(), json!(query));
        if self.input.is_some() {
            payload.insert("input".to_string(), json!(query));
        }
        let mode = resolve_mode(
            self.mode.map(|m| m.as_str()),
            self.model.map(|m| m.as_str()),
        );
        payload.insert("mode".to_string(), json!(mode));
        if let Some(model) = self.model {
            payload.insert("model".to_string(), json!(canonical_mode(model.as_str())));
        }
        payload.insert(
            "output_formats".to_string(),
            match &self.output_formats {
                Some(formats) => Value::Array(formats.clone()),
                None => json!(["markdown"]),
            },
        );
        payload.insert("code_execution".to_string(), json!(self.code_execution));
        if let Some(strategy) = &self.strategy {
            payload.insert("strategy".to_string(), json!(strategy));
        }
        if let Some(search) = &self.search {
            payload.insert(
                "search".to_string(),
                serde_json::to_value(search).unwrap_or(Value::Null),
            );
        }
        if let Some(urls) = &self.urls {
            payload.insert("urls".to_string(), json!(urls));
        }
        if let Some(files) = &self.files {
            payload.insert(
                "files".to_string(),
                serde_json::to_value(files).unwrap_or(Value::Null),
            );
        }
        if let Some(deliverables) = &self.deliverables {
            payload.insert(
                "deliverables".to_string(),
                serde_json::to_value(deliverables).unwrap_or(Value::Null),
            );
        }
        if let Some(servers) = &self.mcp_servers {
            payload.insert(
                "mcp_servers".to_string(),
                serde_json::to_value(servers).unwrap_or(Value::Null),
            );
        }
        if let Some(reports) = &self.previous_reports {
            payload.insert("previous_reports".to_string(), json!(reports));
        }
        if let Some(url) = &self.webhook_url {
            payload.insert("webhook_url".to_string(), json!(url));
        }
        if let Some(email) = &self.alert_email {
            payload.insert("alert_email".to_string(), email.clone());
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

    /// Submit the task.
    pub async fn run(self) -> DeepResearchCreateResponse {
        let Some(query) = resolve_query(Some(&self.query), self.input.as_deref()) else {
            return DeepResearchCreateResponse::failure("'query' is required and cannot be empty");
        };
        let payload = self.payload(&query);
        debug!(query = %query, "deepresearch create");

        let outcome = match self.client.http.post_outcome("/deepresearch/tasks", &payload).await {
            Ok(outcome) => outcome,
            Err(err) => {
                return DeepResearchCreateResponse::failure(format!("Request failed: {err}"))
            }
        };
        if !outcome.ok {
            return DeepResearchCreateResponse::failure(outcome.error_message());
        }
        match serde_json::from_value::<DeepResearchCreateResponse>(outcome.body) {
            Ok(mut response) => {
                response.success = true;
                response
            }
            Err(err) => {
                DeepResearchCreateResponse::failure(format!("Failed to parse response: {err}"))
            }
        }
    }
}
