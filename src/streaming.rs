//! Streaming decoder for the `/answer` SSE response.
//!
//! The service emits a sequence of JSON frames terminated by a literal
//! `[DONE]` marker. Frames are classified by shape rather than by an event
//! name: an early `search_results` frame, incremental `choices` deltas, and
//! one final metadata frame carrying `success` and the cost breakdown.

use std::pin::Pin;
use std::task::{Context, Poll};

use eventsource_stream::Eventsource;
use futures_util::{future, stream, Stream, StreamExt};
use serde_json::Value;
use tracing::warn;

use crate::types::{AnswerMetadata, AnswerResponse, SearchResult};

const DONE_MARKER: &str = "[DONE]";
const UNKNOWN_STREAM_ERROR: &str = "Unknown error occurred";

/// One decoded frame from the answer stream.
#[derive(Debug, Clone)]
pub enum AnswerChunk {
    /// Early search-phase results, sent before generation starts.
    SearchResults(Vec<SearchResult>),
    /// Incremental answer text.
    Content {
        content: String,
        finish_reason: Option<String>,
    },
    /// Final metadata frame with usage and cost.
    Metadata(Box<AnswerMetadata>),
    /// End-of-stream marker.
    Done,
    /// Transport or service failure; the stream ends after this.
    Error(String),
}

/// Classify one SSE data payload. Returns `None` for frames that carry
/// nothing useful (malformed JSON, empty deltas, unrecognized shapes).
fn classify_frame(data: &str) -> Option<AnswerChunk> {
    if data.trim() == DONE_MARKER {
        return Some(AnswerChunk::Done);
    }

    let value: Value = match serde_json::from_str(data) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "skipping malformed answer frame");
            return None;
        }
    };

    let Some(obj) = value.as_object() else {
        return None;
    };

    if obj.contains_key("search_results") && !obj.contains_key("success") {
        match serde_json::from_value::<Vec<SearchResult>>(obj["search_results"].clone()) {
            Ok(results) => return Some(AnswerChunk::SearchResults(results)),
            Err(err) => {
                warn!(error = %err, "skipping undecodable search_results frame");
                return None;
            }
        }
    }

    if let Some(choices) = obj.get("choices").and_then(Value::as_array) {
        let first = choices.first()?;
        let content = first
            .get("delta")
            .and_then(|d| d.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let finish_reason = first
            .get("finish_reason")
            .and_then(Value::as_str)
            .map(str::to_string);
        if content.is_empty() && finish_reason.is_none() {
            return None;
        }
        return Some(AnswerChunk::Content {
            content,
            finish_reason,
        });
    }

    if obj.contains_key("success") {
        match serde_json::from_value::<AnswerMetadata>(value) {
            Ok(metadata) => return Some(AnswerChunk::Metadata(Box::new(metadata))),
            Err(err) => {
                warn!(error = %err, "skipping undecodable metadata frame");
                return None;
            }
        }
    }

    None
}

/// Stream of [`AnswerChunk`]s from the `/answer` endpoint.
///
/// The stream ends after the first `Done` or `Error` chunk even if the
/// connection keeps producing frames.
pub struct AnswerStream {
    inner: Pin<Box<dyn Stream<Item = AnswerChunk> + Send>>,
}

impl AnswerStream {
    pub(crate) fn from_response(response: reqwest::Response) -> Self {
        let chunks = response
            .bytes_stream()
            .eventsource()
            .map(|item| match item {
                Ok(event) => classify_frame(&event.data),
                Err(err) => Some(AnswerChunk::Error(format!("Stream error: {err}"))),
            })
            .scan(false, |finished, chunk| {
                if *finished {
                    return future::ready(None);
                }
                if matches!(chunk, Some(AnswerChunk::Done) | Some(AnswerChunk::Error(_))) {
                    *finished = true;
                }
                future::ready(Some(chunk))
            })
            .filter_map(future::ready);
        Self {
            inner: Box::pin(chunks),
        }
    }

    /// A stream that yields one error chunk and ends. Used when the request
    /// fails before any bytes arrive.
    pub(crate) fn error(message: impl Into<String>) -> Self {
        Self {
            inner: Box::pin(stream::iter([AnswerChunk::Error(message.into())])),
        }
    }

    /// Drain the stream and assemble the collected [`AnswerResponse`].
    pub async fn collect_answer(mut self, fallback_query: &str) -> AnswerResponse {
        let mut acc = AnswerAccumulator::default();
        while let Some(chunk) = self.next().await {
            acc.push(chunk);
        }
        acc.finish(fallback_query)
    }
}

impl Stream for AnswerStream {
    type Item = AnswerChunk;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl std::fmt::Debug for AnswerStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerStream").finish_non_exhaustive()
    }
}

/// Folds chunks into the final collected response.
#[derive(Debug, Default)]
struct AnswerAccumulator {
    content: String,
    search_results: Vec<SearchResult>,
    metadata: Option<AnswerMetadata>,
    error: Option<String>,
}

impl AnswerAccumulator {
    fn push(&mut self, chunk: AnswerChunk) {
        match chunk {
            AnswerChunk::SearchResults(results) => self.search_results = results,
            AnswerChunk::Content { content, .. } => self.content.push_str(&content),
            AnswerChunk::Metadata(metadata) => self.metadata = Some(*metadata),
            AnswerChunk::Done => {}
            AnswerChunk::Error(error) => self.error = Some(error),
        }
    }

    fn finish(self, fallback_query: &str) -> AnswerResponse {
        if let Some(error) = self.error {
            return AnswerResponse::failure(error);
        }
        let Some(metadata) = self.metadata else {
            return AnswerResponse::failure(UNKNOWN_STREAM_ERROR);
        };
        if !metadata.success {
            return AnswerResponse::failure(
                metadata
                    .error
                    .unwrap_or_else(|| UNKNOWN_STREAM_ERROR.to_string()),
            );
        }

        // The final metadata frame wins only when it actually carries
        // results; otherwise the early search frame stands.
        let search_results = match metadata.search_results {
            Some(results) if !results.is_empty() => results,
            _ => self.search_results,
        };
        let contents = match metadata.contents {
            Some(Value::String(text)) if !text.is_empty() => text,
            Some(Value::String(_)) | Some(Value::Null) | None => self.content,
            Some(structured) => serde_json::to_string(&structured).unwrap_or_default(),
        };

        AnswerResponse {
            success: true,
            error: None,
            tx_id: metadata.tx_id,
            original_query: metadata
                .original_query
                .unwrap_or_else(|| fallback_query.to_string()),
            contents,
            search_results,
            search_metadata: metadata.search_metadata.unwrap_or_default(),
            ai_usage: metadata.ai_usage.unwrap_or_default(),
            cost: metadata.cost.unwrap_or_default(),
            extraction_metadata: metadata.extraction_metadata,
        }
    }
}
