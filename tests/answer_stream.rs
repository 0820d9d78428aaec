mod common;

use std::sync::Arc;

use futures_util::StreamExt;
use hyper::StatusCode;
use serde_json::json;

use common::{spawn_server, Handler, MockResponse};
use valyu::{AnswerChunk, Valyu};

fn answer_frames() -> Vec<String> {
    vec![
        json!({"search_results": [
            {"title": "Attention Is All You Need", "url": "https://arxiv.org/abs/1706.03762"}
        ]})
        .to_string(),
        "{not valid json".to_string(),
        json!({"choices": [{"delta": {"content": "ab"}, "finish_reason": null}]}).to_string(),
        json!({"choices": [{"delta": {"content": "cd"}, "finish_reason": "stop"}]}).to_string(),
        json!({
            "success": true,
            "tx_id": "x1",
            "original_query": "what is attention?",
            "search_metadata": {"tx_ids": ["x0"], "number_of_results": 1, "total_characters": 840},
            "ai_usage": {"input_tokens": 120, "output_tokens": 40},
            "cost": {"total_deduction_dollars": 0.02, "search_deduction_dollars": 0.01,
                     "ai_deduction_dollars": 0.01, "contents_deduction_dollars": 0.0}
        })
        .to_string(),
        "[DONE]".to_string(),
    ]
}

fn sse_handler() -> Handler {
    Arc::new(|method, path, body, _| {
        assert_eq!((method, path), ("POST", "/answer"));
        assert_eq!(body["query"], "what is attention?");
        assert_eq!(body["search_type"], "all");
        MockResponse::sse(&answer_frames())
    })
}

#[tokio::test]
async fn test_collected_answer() {
    let base_url = spawn_server(sse_handler()).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let answer = valyu.answer("what is attention?").send().await;

    assert!(answer.success, "error: {:?}", answer.error);
    assert_eq!(answer.contents, "abcd");
    assert_eq!(answer.tx_id, "x1");
    assert_eq!(answer.original_query, "what is attention?");
    assert_eq!(answer.search_results.len(), 1);
    assert_eq!(answer.search_results[0].title, "Attention Is All You Need");
    assert_eq!(answer.ai_usage.input_tokens, 120);
    assert_eq!(answer.cost.total_deduction_dollars, 0.02);
}

#[tokio::test]
async fn test_incremental_chunks_skip_malformed_frames() {
    let base_url = spawn_server(sse_handler()).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let mut stream = valyu.answer("what is attention?").stream().await;
    let mut chunks = Vec::new();
    while let Some(chunk) = stream.next().await {
        chunks.push(chunk);
    }

    assert_eq!(chunks.len(), 5);
    assert!(matches!(&chunks[0], AnswerChunk::SearchResults(r) if r.len() == 1));
    assert!(matches!(&chunks[1], AnswerChunk::Content { content, .. } if content == "ab"));
    assert!(matches!(
        &chunks[2],
        AnswerChunk::Content { finish_reason: Some(reason), .. } if reason == "stop"
    ));
    assert!(matches!(&chunks[3], AnswerChunk::Metadata(_)));
    assert!(matches!(&chunks[4], AnswerChunk::Done));
}

#[tokio::test]
async fn test_http_error_surfaces_as_failure() {
    let handler: Handler = Arc::new(|_, _, _, _| {
        MockResponse::json(StatusCode::BAD_REQUEST, json!({"error": "query too long"}))
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let answer = valyu.answer("q").send().await;
    assert!(!answer.success);
    assert_eq!(answer.error.as_deref(), Some("query too long"));
}

#[tokio::test]
async fn test_unsuccessful_metadata_fails_the_answer() {
    let handler: Handler = Arc::new(|_, _, _, _| {
        MockResponse::sse(&[
            json!({"choices": [{"delta": {"content": "partial"}, "finish_reason": null}]})
                .to_string(),
            json!({"success": false, "error": "generation aborted"}).to_string(),
            "[DONE]".to_string(),
        ])
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let answer = valyu.answer("q").send().await;
    assert!(!answer.success);
    assert_eq!(answer.error.as_deref(), Some("generation aborted"));
}
