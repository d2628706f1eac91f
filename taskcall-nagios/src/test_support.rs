//! In-process TaskCall stand-in for delivery tests

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing_subscriber::fmt::MakeWriter;

/// One request as seen by the mock endpoint
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub integration_key: String,
    pub accept: Option<String>,
    pub content_type: Option<String>,
    pub accept_language: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    hits: Arc<AtomicUsize>,
    fail_first: usize,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct MockTaskCall {
    addr: std::net::SocketAddr,
    state: MockState,
}

impl MockTaskCall {
    /// Answer 500 to the first `fail_first` requests, 200 afterwards
    pub async fn start(fail_first: usize) -> Self {
        let state = MockState {
            hits: Arc::new(AtomicUsize::new(0)),
            fail_first,
            requests: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new()
            .route("/nagios/{key}", post(receive))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn api_url(&self) -> String {
        format!("http://{}/nagios/", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn receive(
    State(state): State<MockState>,
    Path(key): Path<String>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, Json<Value>) {
    let seen = state.hits.fetch_add(1, Ordering::SeqCst);

    state.requests.lock().unwrap().push(RecordedRequest {
        integration_key: key,
        accept: header(&headers, "accept"),
        content_type: header(&headers, "content-type"),
        accept_language: header(&headers, "accept-language"),
        body: serde_json::from_str(&body).unwrap_or(Value::Null),
    });

    if seen < state.fail_first {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "temporarily unavailable" })),
        )
    } else {
        (StatusCode::OK, Json(json!({ "status": "accepted" })))
    }
}

/// Log sink for asserting on emitted events
#[derive(Clone, Default)]
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl CapturedLogs {
    /// Subscriber writing every event, without ANSI codes, into this buffer
    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_ansi(false)
            .with_writer(self.clone())
            .finish()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

pub struct CapturedWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl io::Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        CapturedWriter {
            buffer: Arc::clone(&self.buffer),
        }
    }
}
