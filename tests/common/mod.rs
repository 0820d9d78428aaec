//! In-process HTTP server for exercising the client end to end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use serde_json::Value;
use tokio::net::TcpListener;

pub struct MockResponse {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl MockResponse {
    pub fn json(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            content_type: "application/json",
            body: body.to_string(),
        }
    }

    /// An SSE body with one `data:` line per frame.
    pub fn sse(frames: &[String]) -> Self {
        let body = frames
            .iter()
            .map(|frame| format!("data: {frame}\n\n"))
            .collect::<String>();
        Self {
            status: StatusCode::OK,
            content_type: "text/event-stream",
            body,
        }
    }
}

/// Route one request: `(method, path, body, call_index)`. The index counts
/// every request the server has seen, in order.
pub type Handler = Arc<dyn Fn(&str, &str, &Value, usize) -> MockResponse + Send + Sync>;

/// Start a server on an ephemeral port and return its base URL.
///
/// Every request must carry the `x-api-key: test_key` header. Run with
/// `RUST_LOG=valyu=debug` to see the client's request logging.
pub async fn spawn_server(handler: Handler) -> String {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(value) => value,
                Err(_) => break,
            };
            let io = TokioIo::new(stream);
            let handler = handler.clone();
            let calls = calls.clone();

            tokio::spawn(async move {
                let svc = service_fn(move |req: Request<hyper::body::Incoming>| {
                    let handler = handler.clone();
                    let calls = calls.clone();
                    async move {
                        assert_eq!(
                            req.headers().get("x-api-key").and_then(|v| v.to_str().ok()),
                            Some("test_key"),
                        );
                        let method = req.method().to_string();
                        let path = req.uri().path().to_string();
                        let bytes = req.into_body().collect().await.unwrap().to_bytes();
                        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

                        let n = calls.fetch_add(1, Ordering::SeqCst);
                        let mock = handler(&method, &path, &body, n);
                        let mut resp = Response::new(Full::new(Bytes::from(mock.body)));
                        *resp.status_mut() = mock.status;
                        resp.headers_mut()
                            .insert(CONTENT_TYPE, HeaderValue::from_static(mock.content_type));
                        Ok::<_, hyper::Error>(resp)
                    }
                });
                let _ = Builder::new(TokioExecutor::new())
                    .serve_connection(io, svc)
                    .await;
            });
        }
    });

    format!("http://{}", addr)
}
