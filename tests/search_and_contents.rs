mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::StatusCode;
use serde_json::json;

use common::{spawn_server, Handler, MockResponse};
use valyu::{ContentsJobState, ContentsOutcome, PollOptions, Valyu};

#[tokio::test]
async fn test_search_round_trip_with_sparse_body() {
    let handler: Handler = Arc::new(|method, path, body, _| {
        assert_eq!((method, path), ("POST", "/deepsearch"));
        assert_eq!(body["query"], "perovskite solar cells");
        assert_eq!(body["max_num_results"], 3);
        assert_eq!(body["url_only"], false);
        assert!(body.get("max_price").is_none());
        // No tx_id or query echoed back; the client fills both in.
        MockResponse::json(
            StatusCode::OK,
            json!({
                "results": [
                    {"title": "Perovskite efficiency record", "url": "https://example.com/1",
                     "content": "…", "source": "example.com", "length": 1200}
                ],
                "results_by_source": {"web": 1, "proprietary": 0},
                "total_deduction_dollars": 0.005,
                "total_characters": 1200
            }),
        )
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let response = valyu
        .search("perovskite solar cells")
        .max_num_results(3)
        .run()
        .await;

    assert!(response.success);
    assert_eq!(response.tx_id, "0x0");
    assert_eq!(response.query, "perovskite solar cells");
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results_by_source.web, 1);
}

#[tokio::test]
async fn test_search_http_error_keeps_body_error() {
    let handler: Handler = Arc::new(|_, _, _, _| {
        MockResponse::json(
            StatusCode::TOO_MANY_REQUESTS,
            json!({"error": "rate limited", "tx_id": "0xabc"}),
        )
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let response = valyu.search("anything").run().await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("rate limited"));
    assert_eq!(response.tx_id, "0xabc");
    assert_eq!(response.query, "anything");
}

#[tokio::test]
async fn test_search_http_error_without_tx_id_encodes_status() {
    let handler: Handler = Arc::new(|_, _, _, _| {
        MockResponse::json(StatusCode::PAYMENT_REQUIRED, json!({"error": "no credits"}))
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let response = valyu.search("anything").run().await;
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("no credits"));
    assert_eq!(response.tx_id, "error-402");
}

#[tokio::test]
async fn test_sync_contents_normalizes_missing_status() {
    let handler: Handler = Arc::new(|method, path, body, _| {
        assert_eq!((method, path), ("POST", "/contents"));
        assert!(body.get("async").is_none());
        MockResponse::json(
            StatusCode::OK,
            json!({
                "tx_id": "0xc1",
                "urls_requested": 2,
                "urls_processed": 1,
                "urls_failed": 1,
                "results": [
                    {"url": "https://a.com", "title": "A", "content": "body text",
                     "length": 9, "source": "a.com"},
                    {"url": "https://b.com"}
                ],
                "total_cost_dollars": 0.001,
                "total_characters": 9
            }),
        )
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let outcome = valyu
        .contents(["https://a.com", "https://b.com"])
        .run()
        .await;
    let response = match outcome {
        ContentsOutcome::Completed(response) => response,
        other => panic!("unexpected outcome: {other:?}"),
    };

    assert!(response.success);
    assert_eq!(response.results.len(), 2);
    assert!(response.results[0].is_success());
    match &response.results[1] {
        valyu::ContentsResult::Failed { url, error } => {
            assert_eq!(url, "https://b.com");
            assert_eq!(error, "Unknown error");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn test_async_contents_job_lifecycle() {
    let polls = Arc::new(AtomicUsize::new(0));
    let polls_for_handler = polls.clone();
    let handler: Handler = Arc::new(move |method, path, body, _| match (method, path) {
        ("POST", "/contents") => {
            assert_eq!(body["async"], true);
            assert_eq!(body["urls"].as_array().unwrap().len(), 12);
            assert_eq!(body["webhook_url"], "https://hooks.example.com/contents");
            MockResponse::json(
                StatusCode::ACCEPTED,
                json!({
                    "job_id": "job_1",
                    "status": "pending",
                    "urls_total": 12,
                    "webhook_secret": "whsec_abc",
                    "tx_id": "0xj1"
                }),
            )
        }
        ("GET", "/contents/jobs/job_1") => {
            let n = polls_for_handler.fetch_add(1, Ordering::SeqCst);
            let body = if n == 0 {
                json!({"success": true, "job_id": "job_1", "status": "processing",
                       "urls_total": 12, "urls_processed": 4, "urls_failed": 0})
            } else {
                json!({"success": true, "job_id": "job_1", "status": "partial",
                       "urls_total": 12, "urls_processed": 11, "urls_failed": 1,
                       "results": [
                           {"url": "https://a.com", "title": "A", "content": "text",
                            "length": 4, "source": "a.com"},
                           {"url": "https://b.com"}
                       ],
                       "actual_cost_dollars": 0.01})
            };
            MockResponse::json(StatusCode::OK, body)
        }
        other => panic!("unexpected request: {other:?}"),
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let urls: Vec<String> = (0..12).map(|i| format!("https://site.com/{i}")).collect();
    let outcome = valyu
        .contents(urls)
        .async_mode(true)
        .webhook_url("https://hooks.example.com/contents")
        .run()
        .await;
    let job = match outcome {
        ContentsOutcome::Accepted(job) => job,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(job.job_id, "job_1");
    assert_eq!(job.webhook_secret.as_deref(), Some("whsec_abc"));

    let options = PollOptions::new(Duration::from_millis(10), Duration::from_secs(5));
    let final_status = valyu
        .wait_for_contents_job_with_options(&job.job_id, options, None)
        .await
        .unwrap();

    // Partial completion is a terminal snapshot, not an error.
    assert_eq!(final_status.status, ContentsJobState::Partial);
    assert_eq!(final_status.urls_failed, 1);
    let results = final_status.results.unwrap();
    assert!(results[0].is_success());
    assert!(!results[1].is_success());
    assert_eq!(polls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_datasource_listings() {
    let handler: Handler = Arc::new(|method, path, _, _| match (method, path) {
        ("GET", "/datasources") => MockResponse::json(
            StatusCode::OK,
            json!({"datasources": [
                {"id": "valyu/valyu-arxiv", "name": "arXiv", "description": "Preprints",
                 "category": "academic", "pricing": {"cpm": 2.5}}
            ]}),
        ),
        ("GET", "/datasources/categories") => MockResponse::json(
            StatusCode::OK,
            json!({"categories": [
                {"id": "academic", "name": "Academic", "dataset_count": 14}
            ]}),
        ),
        other => panic!("unexpected request: {other:?}"),
    });
    let base_url = spawn_server(handler).await;
    let valyu = Valyu::with_base_url("test_key", &base_url).unwrap();

    let datasources = valyu.datasources(None).await;
    assert!(datasources.success);
    assert_eq!(datasources.datasources[0].id, "valyu/valyu-arxiv");
    assert_eq!(datasources.datasources[0].pricing.as_ref().unwrap().cpm, 2.5);

    let categories = valyu.datasource_categories().await;
    assert!(categories.success);
    assert_eq!(categories.categories[0].dataset_count, 14);
}
