mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::StatusCode;
use serde_json::json;

use common::{spawn_server, Handler, MockResponse};
use valyu::{
    DeepResearchMode, DeepResearchStatus, Deliverable, PollOptions, Valyu, ValyuError,
};

#[tokio::test]
async fn test_create_then_wait_to_completion() {
    let polls = Arc::new(AtomicUsize::new(0));
    let polls_for_handler = polls.clone();
    let handler: Handler = Arc::new(move |method, path, body, _| match (method, path) {
        ("POST", "/deepresearch/tasks") => {
            assert_eq!(body["query"], "lithium supply outlook");
            assert_eq!(body["mode"], "heavy");
            assert_eq!(body["output_formats"], json!(["markdown", "pdf"]));
            assert_eq!(body["code_execution"], false);
            assert_eq!(body["deliverables"][0]["type"], "csv");
            MockResponse::json(
                StatusCode::OK,
                json!({
                    "deepresearch_id": "dr_42",
                    "status": "queued",
                    "mode": "heavy",
                    "created_at": "2026-08-01T00:00:00Z"
                }),
            )
        }
        ("GET", "/deepresearch/tasks/dr_42/status") => {
            let n = polls_for_handler.fetch_add(1, Ordering::SeqCst);
            let body = if n == 0 {
                json!({"deepresearch_id": "dr_42", "status": "running",
                       "progress": {"current_step": 1, "total_steps": 4}})
            } else {
                json!({"deepresearch_id": "dr_42", "status": "completed",
                       "output": "# Lithium supply outlook\n…",
                       "output_type": "markdown",
                       "pdf_url": "https://api.valyu.ai/v1/deepresearch/tasks/dr_42/assets/report.pdf",
                       "cost": 0.42,
                       "sources": [{"title": "USGS", "url": "https://usgs.gov"}]})
            };
            MockResponse::json(StatusCode::OK, body)
        }
        other => panic!("unexpected request: {other:?}"),
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let created = valyu
        .deepresearch()
        .create("lithium supply outlook")
        .mode(DeepResearchMode::Heavy)
        .output_formats([json!("markdown"), json!("pdf")])
        .code_execution(false)
        .deliverables(vec![Deliverable {
            r#type: "csv".to_string(),
            description: "producers by country".to_string(),
            columns: Some(vec!["country".to_string(), "tonnes".to_string()]),
            include_headers: None,
            sheet_name: None,
            slides: None,
            template: None,
        }])
        .run()
        .await;
    assert!(created.success, "error: {:?}", created.error);
    assert_eq!(created.deepresearch_id.as_deref(), Some("dr_42"));

    let options = PollOptions::new(Duration::from_millis(10), Duration::from_secs(5));
    let done = valyu
        .deepresearch()
        .wait_with_options("dr_42", options, None)
        .await
        .unwrap();
    assert_eq!(done.status, Some(DeepResearchStatus::Completed));
    assert_eq!(done.cost, Some(0.42));
    assert_eq!(done.sources.unwrap()[0].title, "USGS");
}

#[tokio::test]
async fn test_failed_task_raises_with_remote_error() {
    let handler: Handler = Arc::new(|_, _, _, _| {
        MockResponse::json(
            StatusCode::OK,
            json!({"deepresearch_id": "dr_7", "status": "failed",
                   "error": "budget exhausted"}),
        )
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let options = PollOptions::new(Duration::from_millis(10), Duration::from_secs(5));
    let err = valyu
        .deepresearch()
        .wait_with_options("dr_7", options, None)
        .await
        .err();
    match err {
        Some(ValyuError::JobFailed(message)) => {
            assert_eq!(message, "Task failed: budget exhausted")
        }
        other => panic!("expected job failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_stream_delivers_new_messages_once() {
    let polls = Arc::new(AtomicUsize::new(0));
    let polls_for_handler = polls.clone();
    let handler: Handler = Arc::new(move |_, path, _, _| {
        assert_eq!(path, "/deepresearch/tasks/dr_9/status");
        let n = polls_for_handler.fetch_add(1, Ordering::SeqCst);
        let body = match n {
            0 => json!({"deepresearch_id": "dr_9", "status": "running",
                        "progress": {"current_step": 1, "total_steps": 3},
                        "messages": [{"role": "agent", "text": "planning"}]}),
            1 => json!({"deepresearch_id": "dr_9", "status": "running",
                        "progress": {"current_step": 2, "total_steps": 3},
                        "messages": [{"role": "agent", "text": "planning"},
                                      {"role": "agent", "text": "searching"}]}),
            _ => json!({"deepresearch_id": "dr_9", "status": "completed",
                        "progress": {"current_step": 3, "total_steps": 3},
                        "messages": [{"role": "agent", "text": "planning"},
                                      {"role": "agent", "text": "searching"},
                                      {"role": "agent", "text": "writing"}],
                        "output": "done"}),
        };
        MockResponse::json(StatusCode::OK, body)
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let mut seen_steps = Vec::new();
    let mut on_progress = |current: u32, total: u32| seen_steps.push((current, total));
    let mut seen_messages = Vec::new();
    let mut on_message = |message: &serde_json::Value| {
        seen_messages.push(message["text"].as_str().unwrap().to_string())
    };

    let options = PollOptions::new(Duration::from_millis(10), Duration::from_secs(5));
    let done = valyu
        .deepresearch()
        .stream_with_options("dr_9", options, Some(&mut on_progress), Some(&mut on_message))
        .await
        .unwrap();

    assert_eq!(done.status, Some(DeepResearchStatus::Completed));
    assert_eq!(seen_steps, vec![(1, 3), (2, 3), (3, 3)]);
    // Each message is delivered exactly once even though every poll repeats
    // the full history.
    assert_eq!(seen_messages, vec!["planning", "searching", "writing"]);
}

#[tokio::test]
async fn test_task_mutations_and_asset_download() {
    let handler: Handler = Arc::new(|method, path, body, _| match (method, path) {
        ("POST", "/deepresearch/tasks/dr_5/update") => {
            assert_eq!(body["instruction"], "focus on 2025 data");
            MockResponse::json(
                StatusCode::OK,
                json!({"deepresearch_id": "dr_5", "message": "instruction queued"}),
            )
        }
        ("POST", "/deepresearch/tasks/dr_5/public") => {
            assert_eq!(body["public"], true);
            MockResponse::json(
                StatusCode::OK,
                json!({"deepresearch_id": "dr_5", "public": true}),
            )
        }
        ("DELETE", "/deepresearch/tasks/dr_5/delete") => MockResponse::json(
            StatusCode::OK,
            json!({"deepresearch_id": "dr_5", "message": "deleted"}),
        ),
        ("GET", "/deepresearch/tasks/dr_5/assets/chart.png") => MockResponse {
            status: StatusCode::OK,
            content_type: "image/png",
            body: "png-bytes".to_string(),
        },
        other => panic!("unexpected request: {other:?}"),
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();
    let tasks = valyu.deepresearch();

    let updated = tasks.update("dr_5", "focus on 2025 data").await;
    assert!(updated.success);
    assert_eq!(updated.message.as_deref(), Some("instruction queued"));

    let toggled = tasks.toggle_public("dr_5", true).await;
    assert!(toggled.success);
    assert_eq!(toggled.public, Some(true));

    let deleted = tasks.delete("dr_5").await;
    assert!(deleted.success);

    let bytes = tasks.get_asset("dr_5", "chart.png", None).await.unwrap();
    assert_eq!(bytes, b"png-bytes");
}

#[tokio::test]
async fn test_list_accepts_bare_array() {
    let handler: Handler = Arc::new(|method, path, _, _| {
        assert_eq!((method, path), ("GET", "/deepresearch/tasks"));
        MockResponse::json(
            StatusCode::OK,
            json!([{"deepresearch_id": "dr_1", "status": "completed"}]),
        )
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let listing = valyu.deepresearch().list(Some(10)).await;
    assert!(listing.success);
    assert_eq!(listing.data.unwrap().len(), 1);
}
