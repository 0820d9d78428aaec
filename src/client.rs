//! Valyu API client facade.
//!
//! Per-call methods never return `Err` for remote failures: every response
//! type carries a `success` flag and an `error` string, so a failed exchange
//! comes back as a typed response the caller can inspect. Only construction,
//! the blocking wait helpers, and binary asset fetches return [`Result`].

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::batch::BatchClient;
use crate::deepresearch::DeepResearchClient;
use crate::errors::{Result, ValyuError};
use crate::http::HttpClient;
use crate::normalize;
use crate::polling::{wait_until_terminal, PollOptions};
use crate::streaming::AnswerStream;
use crate::types::{
    AnswerResponse, ContentsJobCreateResponse, ContentsJobStatus, ContentsResponse, Datasource,
    DatasourceCategoriesResponse, DatasourceCategory, DatasourcesResponse, ResponseLength,
    SearchResponse,
};
use crate::validation::{
    country_code_error, format_validation_error, is_supported_country_code, validate_sources,
};

pub const DEFAULT_BASE_URL: &str = "https://api.valyu.ai/v1";
pub const API_KEY_ENV: &str = "VALYU_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

const MAX_CONTENTS_URLS: usize = 50;
const MAX_SYNC_CONTENTS_URLS: usize = 10;
const MAX_SYSTEM_INSTRUCTIONS_CHARS: usize = 2000;

/// Client for the Valyu API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct Valyu {
    pub(crate) http: HttpClient,
    base_url: String,
}

impl Valyu {
    /// Create a client with the default base URL and timeout.
    pub fn new(api_key: &str) -> Result<Self> {
        Self::with_config(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client against a non-default endpoint.
    pub fn with_base_url(api_key: &str, base_url: &str) -> Result<Self> {
        Self::with_config(api_key, base_url, DEFAULT_TIMEOUT_SECS)
    }

    /// Create a client with full control over endpoint and timeout.
    pub fn with_config(api_key: &str, base_url: &str, timeout_secs: u64) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(ValyuError::MissingApiKey);
        }
        Ok(Self {
            http: HttpClient::new(base_url, api_key, timeout_secs)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `VALYU_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Self::new(&key),
            _ => Err(ValyuError::MissingApiKey),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Deep research task operations.
    pub fn deepresearch(&self) -> DeepResearchClient<'_> {
        DeepResearchClient::new(self)
    }

    /// Deep research batch operations.
    pub fn batch(&self) -> BatchClient<'_> {
        BatchClient::new(self)
    }

    /// Start building a `/deepsearch` request.
    pub fn search(&self, query: impl Into<String>) -> SearchBuilder<'_> {
        SearchBuilder::new(self, query.into())
    }

    /// Start building a `/contents` extraction request.
    pub fn contents<I, S>(&self, urls: I) -> ContentsBuilder<'_>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ContentsBuilder::new(self, urls.into_iter().map(Into::into).collect())
    }

    /// Start building an `/answer` request.
    pub fn answer(&self, query: impl Into<String>) -> AnswerBuilder<'_> {
        AnswerBuilder::new(self, query.into())
    }

    /// Fetch the status of an async contents job.
    pub async fn get_contents_job(&self, job_id: &str) -> ContentsJobStatus {
        let outcome = match self
            .http
            .get_outcome(&format!("/contents/jobs/{job_id}"), None)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => return ContentsJobStatus::failure(job_id, format!("Request failed: {err}")),
        };
        if !outcome.ok {
            return ContentsJobStatus::failure(job_id, outcome.error_message());
        }
        let mut body = outcome.body;
        normalize::normalize_content_results(&mut body);
        match serde_json::from_value::<ContentsJobStatus>(body) {
            Ok(mut status) => {
                status.success = true;
                status
            }
            Err(err) => ContentsJobStatus::failure(job_id, format!("Failed to parse response: {err}")),
        }
    }

    /// Poll a contents job until it reaches a terminal state.
    ///
    /// Completed, partial, and failed jobs are all returned as snapshots;
    /// `Err` means the status could not be read or the deadline passed.
    pub async fn wait_for_contents_job(&self, job_id: &str) -> Result<ContentsJobStatus> {
        self.wait_for_contents_job_with_options(job_id, PollOptions::contents(), None)
            .await
    }

    pub async fn wait_for_contents_job_with_options(
        &self,
        job_id: &str,
        options: PollOptions,
        on_progress: Option<&mut dyn FnMut(&ContentsJobStatus)>,
    ) -> Result<ContentsJobStatus> {
        wait_until_terminal(move || self.get_contents_job(job_id), options, on_progress).await
    }

    /// List available datasources, optionally filtered by category.
    pub async fn datasources(&self, category: Option<&str>) -> DatasourcesResponse {
        let params = category.map(|c| vec![("category", c)]);
        let outcome = match self.http.get_outcome("/datasources", params.as_deref()).await {
            Ok(outcome) => outcome,
            Err(err) => return DatasourcesResponse::failure(format!("Request failed: {err}")),
        };
        if !outcome.ok {
            return DatasourcesResponse::failure(outcome.error_message());
        }
        let raw = outcome
            .body
            .get("datasources")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        match serde_json::from_value::<Vec<Datasource>>(raw) {
            Ok(datasources) => DatasourcesResponse {
                success: true,
                error: None,
                datasources,
            },
            Err(err) => DatasourcesResponse::failure(format!("Failed to parse response: {err}")),
        }
    }

    /// List datasource categories.
    pub async fn datasource_categories(&self) -> DatasourceCategoriesResponse {
        let outcome = match self.http.get_outcome("/datasources/categories", None).await {
            Ok(outcome) => outcome,
            Err(err) => {
                return DatasourceCategoriesResponse::failure(format!("Request failed: {err}"))
            }
        };
        if !outcome.ok {
            return DatasourceCategoriesResponse::failure(outcome.error_message());
        }
        let raw = outcome
            .body
            .get("categories")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new()));
        match serde_json::from_value::<Vec<DatasourceCategory>>(raw) {
            Ok(categories) => DatasourceCategoriesResponse {
                success: true,
                error: None,
                categories,
            },
            Err(err) => {
                DatasourceCategoriesResponse::failure(format!("Failed to parse response: {err}"))
            }
        }
    }
}

/// Builder for `/deepsearch` requests.
#[derive(Debug)]
#[must_use = "builders do nothing until run() is awaited"]
pub struct SearchBuilder<'a> {
    client: &'a Valyu,
    query: String,
    search_type: String,
    max_num_results: u32,
    is_tool_call: bool,
    relevance_threshold: f64,
    max_price: Option<f64>,
    fast_mode: bool,
    url_only: bool,
    included_sources: Option<Vec<String>>,
    excluded_sources: Option<Vec<String>>,
    category: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    country_code: Option<String>,
    response_length: Option<ResponseLength>,
}

impl<'a> SearchBuilder<'a> {
    fn new(client: &'a Valyu, query: String) -> Self {
        Self {
            client,
            query,
            search_type: "all".to_string(),
            max_num_results: 10,
            is_tool_call: true,
            relevance_threshold: 0.5,
            max_price: None,
            fast_mode: false,
            url_only: false,
            included_sources: None,
            excluded_sources: None,
            category: None,
            start_date: None,
            end_date: None,
            country_code: None,
            response_length: None,
        }
    }

    /// Restrict to "web" or "proprietary" backends; the default "all" uses both.
    pub fn search_type(mut self, search_type: impl Into<String>) -> Self {
        self.search_type = search_type.into();
        self
    }

    pub fn max_num_results(mut self, n: u32) -> Self {
        self.max_num_results = n;
        self
    }

    pub fn is_tool_call(mut self, is_tool_call: bool) -> Self {
        self.is_tool_call = is_tool_call;
        self
    }

    pub fn relevance_threshold(mut self, threshold: f64) -> Self {
        self.relevance_threshold = threshold;
        self
    }

    pub fn max_price(mut self, dollars: f64) -> Self {
        self.max_price = Some(dollars);
        self
    }

    pub fn fast_mode(mut self, fast_mode: bool) -> Self {
        self.fast_mode = fast_mode;
        self
    }

    /// Return shortened snippets only.
    pub fn url_only(mut self, url_only: bool) -> Self {
        self.url_only = url_only;
        self
    }

    pub fn included_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    pub fn excluded_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn response_length(mut self, length: ResponseLength) -> Self {
        self.response_length = Some(length);
        self
    }

    fn validation_failure(&self) -> Option<SearchResponse> {
        if let Some(sources) = &self.included_sources {
            let (valid, invalid) = validate_sources(sources);
            if !valid {
                return Some(SearchResponse::failure(
                    self.query.clone(),
                    "validation-error-included",
                    format_validation_error(&invalid),
                ));
            }
        }
        if let Some(sources) = &self.excluded_sources {
            let (valid, invalid) = validate_sources(sources);
            if !valid {
                return Some(SearchResponse::failure(
                    self.query.clone(),
                    "validation-error-excluded",
                    format_validation_error(&invalid),
                ));
            }
        }
        if let Some(code) = &self.country_code {
            if !is_supported_country_code(code) {
                return Some(SearchResponse::failure(
                    self.query.clone(),
                    "validation-error-country",
                    country_code_error(),
                ));
            }
        }
        None
    }

    fn payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("query".to_string(), json!(self.query));
        payload.insert("search_type".to_string(), json!(self.search_type));
        payload.insert("max_num_results".to_string(), json!(self.max_num_results));
        payload.insert("is_tool_call".to_string(), json!(self.is_tool_call));
        payload.insert(
            "relevance_threshold".to_string(),
            json!(self.relevance_threshold),
        );
        payload.insert("fast_mode".to_string(), json!(self.fast_mode));
        payload.insert("url_only".to_string(), json!(self.url_only));
        if let Some(dollars) = self.max_price {
            payload.insert("max_price".to_string(), json!(dollars));
        }
        if let Some(sources) = &self.included_sources {
            payload.insert("included_sources".to_string(), json!(sources));
        }
        if let Some(sources) = &self.excluded_sources {
            payload.insert("excluded_sources".to_string(), json!(sources));
        }
        if let Some(category) = &self.category {
            payload.insert("category".to_string(), json!(category));
        }
        if let Some(date) = &self.start_date {
            payload.insert("start_date".to_string(), json!(date));
        }
        if let Some(date) = &self.end_date {
            payload.insert("end_date".to_string(), json!(date));
        }
        if let Some(code) = &self.country_code {
            payload.insert(
                "country_code".to_string(),
                json!(code.trim().to_ascii_uppercase()),
            );
        }
        if let Some(length) = &self.response_length {
            payload.insert(
                "response_length".to_string(),
                serde_json::to_value(length).unwrap_or(Value::Null),
            );
        }
        Value::Object(payload)
    }

    /// Execute the search.
    pub async fn run(self) -> SearchResponse {
        if let Some(failure) = self.validation_failure() {
            return failure;
        }
        let query = self.query.clone();
        let payload = self.payload();
        debug!(query = %query, "search");

        let outcome = match self.client.http.post_outcome("/deepsearch", &payload).await {
            Ok(outcome) => outcome,
            Err(err) => {
                return SearchResponse::failure(query, "0x0", format!("Request failed: {err}"))
            }
        };
        if !outcome.ok {
            let error = outcome.error_message();
            let tx_id = outcome
                .body
                .get("tx_id")
                .and_then(Value::as_str)
                .map(str::to_owned)
                .unwrap_or_else(|| format!("error-{}", outcome.status));
            return SearchResponse::failure(query, tx_id, error);
        }
        match serde_json::from_value::<SearchResponse>(outcome.body) {
            Ok(mut response) => {
                response.success = true;
                if response.tx_id.is_empty() {
                    response.tx_id = "0x0".to_string();
                }
                if response.query.is_empty() {
                    response.query = query;
                }
                response
            }
            Err(err) => {
                SearchResponse::failure(query, "0x0", format!("Failed to parse response: {err}"))
            }
        }
    }
}

/// Summarization request for `/contents`: automatic, free-form instructions,
/// or a JSON schema for structured output.
#[derive(Debug, Clone)]
pub enum SummaryConfig {
    Auto,
    Instructions(String),
    Schema(Value),
}

impl SummaryConfig {
    fn to_value(&self) -> Value {
        match self {
            SummaryConfig::Auto => Value::Bool(true),
            SummaryConfig::Instructions(text) => Value::String(text.clone()),
            SummaryConfig::Schema(schema) => schema.clone(),
        }
    }
}

impl From<&str> for SummaryConfig {
    fn from(v: &str) -> Self {
        SummaryConfig::Instructions(v.to_string())
    }
}

impl From<String> for SummaryConfig {
    fn from(v: String) -> Self {
        SummaryConfig::Instructions(v)
    }
}

impl From<Value> for SummaryConfig {
    fn from(v: Value) -> Self {
        SummaryConfig::Schema(v)
    }
}

/// Result of a `/contents` call: either a completed synchronous extraction
/// or a 202 acknowledgment of an async job.
#[derive(Debug, Clone)]
pub enum ContentsOutcome {
    Completed(ContentsResponse),
    Accepted(ContentsJobCreateResponse),
}

/// Builder for `/contents` requests.
#[derive(Debug)]
#[must_use = "builders do nothing until run() is awaited"]
pub struct ContentsBuilder<'a> {
    client: &'a Valyu,
    urls: Vec<String>,
    summary: Option<SummaryConfig>,
    extract_effort: Option<String>,
    response_length: Option<ResponseLength>,
    max_price_dollars: Option<f64>,
    screenshot: bool,
    async_mode: bool,
    webhook_url: Option<String>,
}

impl<'a> ContentsBuilder<'a> {
    fn new(client: &'a Valyu, urls: Vec<String>) -> Self {
        Self {
            client,
            urls,
            summary: None,
            extract_effort: None,
            response_length: None,
            max_price_dollars: None,
            screenshot: false,
            async_mode: false,
            webhook_url: None,
        }
    }

    pub fn summary(mut self, summary: impl Into<SummaryConfig>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Extraction effort: "normal", "high", or "auto".
    pub fn extract_effort(mut self, effort: impl Into<String>) -> Self {
        self.extract_effort = Some(effort.into());
        self
    }

    pub fn response_length(mut self, length: ResponseLength) -> Self {
        self.response_length = Some(length);
        self
    }

    pub fn max_price_dollars(mut self, dollars: f64) -> Self {
        self.max_price_dollars = Some(dollars);
        self
    }

    pub fn screenshot(mut self, screenshot: bool) -> Self {
        self.screenshot = screenshot;
        self
    }

    /// Process as an async job; required above ten URLs.
    pub fn async_mode(mut self, async_mode: bool) -> Self {
        self.async_mode = async_mode;
        self
    }

    /// Completion webhook for async jobs.
    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    fn payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("urls".to_string(), json!(self.urls));
        if self.async_mode {
            payload.insert("async".to_string(), Value::Bool(true));
        }
        if let Some(summary) = &self.summary {
            payload.insert("summary".to_string(), summary.to_value());
        }
        if let Some(effort) = &self.extract_effort {
            payload.insert("extract_effort".to_string(), json!(effort));
        }
        if let Some(length) = &self.response_length {
            payload.insert(
                "response_length".to_string(),
                serde_json::to_value(length).unwrap_or(Value::Null),
            );
        }
        if let Some(dollars) = self.max_price_dollars {
            payload.insert("max_price_dollars".to_string(), json!(dollars));
        }
        if self.screenshot {
            payload.insert("screenshot".to_string(), Value::Bool(true));
        }
        if let Some(url) = &self.webhook_url {
            payload.insert("webhook_url".to_string(), json!(url));
        }
        Value::Object(payload)
    }

    /// Execute the extraction.
    pub async fn run(self) -> ContentsOutcome {
        let requested = self.urls.len();
        if requested > MAX_CONTENTS_URLS {
            return ContentsOutcome::Completed(ContentsResponse::failure(
                requested,
                "error-max-urls",
                format!("Maximum {MAX_CONTENTS_URLS} URLs allowed per request"),
            ));
        }
        if requested > MAX_SYNC_CONTENTS_URLS && !self.async_mode {
            return ContentsOutcome::Completed(ContentsResponse::failure(
                requested,
                "error-async-required",
                format!("Requests with more than {MAX_SYNC_CONTENTS_URLS} URLs require async mode"),
            ));
        }

        let payload = self.payload();
        debug!(urls = requested, async_mode = self.async_mode, "contents");
        let outcome = match self.client.http.post_outcome("/contents", &payload).await {
            Ok(outcome) => outcome,
            Err(err) => {
                return ContentsOutcome::Completed(ContentsResponse::failure(
                    requested,
                    "",
                    format!("Request failed: {err}"),
                ))
            }
        };

        if outcome.status == 202 {
            return match serde_json::from_value::<ContentsJobCreateResponse>(outcome.body) {
                Ok(mut job) => {
                    job.success = true;
                    ContentsOutcome::Accepted(job)
                }
                Err(err) => ContentsOutcome::Completed(ContentsResponse::failure(
                    requested,
                    "",
                    format!("Failed to parse response: {err}"),
                )),
            };
        }

        if !outcome.ok {
            let error = outcome.error_message();
            let tx_id = outcome
                .body
                .get("tx_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            return ContentsOutcome::Completed(ContentsResponse::failure(requested, tx_id, error));
        }

        let mut body = outcome.body;
        normalize::normalize_content_results(&mut body);
        match serde_json::from_value::<ContentsResponse>(body) {
            Ok(mut response) => {
                response.success = true;
                ContentsOutcome::Completed(response)
            }
            Err(err) => ContentsOutcome::Completed(ContentsResponse::failure(
                requested,
                "",
                format!("Failed to parse response: {err}"),
            )),
        }
    }
}

/// Builder for `/answer` requests.
#[derive(Debug)]
#[must_use = "builders do nothing until send() or stream() is awaited"]
pub struct AnswerBuilder<'a> {
    client: &'a Valyu,
    query: String,
    search_type: String,
    fast_mode: bool,
    system_instructions: Option<String>,
    structured_output: Option<Value>,
    included_sources: Option<Vec<String>>,
    excluded_sources: Option<Vec<String>>,
    data_max_price: Option<f64>,
    start_date: Option<String>,
    end_date: Option<String>,
    country_code: Option<String>,
}

impl<'a> AnswerBuilder<'a> {
    fn new(client: &'a Valyu, query: String) -> Self {
        Self {
            client,
            query,
            search_type: "all".to_string(),
            fast_mode: false,
            system_instructions: None,
            structured_output: None,
            included_sources: None,
            excluded_sources: None,
            data_max_price: None,
            start_date: None,
            end_date: None,
            country_code: None,
        }
    }

    pub fn search_type(mut self, search_type: impl Into<String>) -> Self {
        self.search_type = search_type.into();
        self
    }

    pub fn fast_mode(mut self, fast_mode: bool) -> Self {
        self.fast_mode = fast_mode;
        self
    }

    pub fn system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = Some(instructions.into());
        self
    }

    /// JSON schema for structured answer output.
    pub fn structured_output(mut self, schema: Value) -> Self {
        self.structured_output = Some(schema);
        self
    }

    pub fn included_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.included_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    pub fn excluded_sources<I, S>(mut self, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_sources = Some(sources.into_iter().map(Into::into).collect());
        self
    }

    /// Maximum spend in dollars for data retrieval, separate from AI costs.
    pub fn data_max_price(mut self, dollars: f64) -> Self {
        self.data_max_price = Some(dollars);
        self
    }

    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = Some(date.into());
        self
    }

    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    pub fn country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    fn validation_error(&self) -> Option<String> {
        for sources in [&self.included_sources, &self.excluded_sources]
            .into_iter()
            .flatten()
        {
            let (valid, invalid) = validate_sources(sources);
            if !valid {
                return Some(format_validation_error(&invalid));
            }
        }
        if let Some(code) = &self.country_code {
            if !is_supported_country_code(code) {
                return Some(country_code_error());
            }
        }
        if let Some(instructions) = &self.system_instructions {
            if instructions.trim().chars().count() > MAX_SYSTEM_INSTRUCTIONS_CHARS {
                return Some(format!(
                    "system_instructions cannot exceed {MAX_SYSTEM_INSTRUCTIONS_CHARS} characters"
                ));
            }
        }
        None
    }

    fn payload(&self) -> Value {
        let mut payload = Map::new();
        payload.insert("query".to_string(), json!(self.query));
        payload.insert("search_type".to_string(), json!(self.search_type));
        payload.insert("fast_mode".to_string(), json!(self.fast_mode));
        if let Some(instructions) = &self.system_instructions {
            payload.insert("system_instructions".to_string(), json!(instructions.trim()));
        }
        if let Some(schema) = &self.structured_output {
            payload.insert("structured_output".to_string(), schema.clone());
        }
        if let Some(sources) = &self.included_sources {
            payload.insert("included_sources".to_string(), json!(sources));
        }
        if let Some(sources) = &self.excluded_sources {
            payload.insert("excluded_sources".to_string(), json!(sources));
        }
        if let Some(dollars) = self.data_max_price {
            payload.insert("data_max_price".to_string(), json!(dollars));
        }
        if let Some(date) = &self.start_date {
            payload.insert("start_date".to_string(), json!(date));
        }
        if let Some(date) = &self.end_date {
            payload.insert("end_date".to_string(), json!(date));
        }
        if let Some(code) = &self.country_code {
            payload.insert(
                "country_code".to_string(),
                json!(code.trim().to_ascii_uppercase()),
            );
        }
        Value::Object(payload)
    }

    async fn start(self) -> std::result::Result<AnswerStream, String> {
        if let Some(message) = self.validation_error() {
            return Err(message);
        }
        let payload = self.payload();
        debug!(query = %self.query, "answer");
        let response = self
            .client
            .http
            .post_event_stream("/answer", &payload)
            .await
            .map_err(|err| format!("Request failed: {err}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(str::to_owned))
                .unwrap_or_else(|| format!("HTTP Error: {}", status.as_u16()));
            return Err(error);
        }
        Ok(AnswerStream::from_response(response))
    }

    /// Execute the request and collect the full answer.
    pub async fn send(self) -> AnswerResponse {
        let query = self.query.clone();
        match self.start().await {
            Ok(stream) => stream.collect_answer(&query).await,
            Err(message) => AnswerResponse::failure(message),
        }
    }

    /// Execute the request and stream decoded chunks as they arrive.
    ///
    /// Failures surface as a single [`crate::AnswerChunk::Error`] chunk.
    pub async fn stream(self) -> AnswerStream {
        match self.start().await {
            Ok(stream) => stream,
            Err(message) => AnswerStream::error(message),
        }
    }
}
