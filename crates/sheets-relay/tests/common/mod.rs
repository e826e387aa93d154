//! Test harness for relay integration tests.
//!
//! Provides:
//! - MockWebhook: a local HTTP endpoint that records multipart requests
//! - MockReply: scripted responses, optionally held back until released

#![allow(dead_code)]

use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

/// One multipart field received by the mock.
#[derive(Debug, Clone)]
pub struct ReceivedField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl ReceivedField {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

/// One request received by the mock.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub headers: HeaderMap,
    pub fields: Vec<ReceivedField>,
}

impl ReceivedRequest {
    pub fn field(&self, name: &str) -> Option<&ReceivedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.field(name).map(ReceivedField::text)
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.name.clone()).collect()
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    }
}

/// Scripted response.
#[derive(Debug, Clone)]
pub struct MockReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
    /// Wait for [`MockWebhook::release`] before answering.
    pub held: bool,
}

impl MockReply {
    pub fn json(body: &str) -> Self {
        Self {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: body.to_string(),
            held: false,
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: Some("text/plain; charset=utf-8".to_string()),
            body: body.to_string(),
            held: false,
        }
    }

    pub fn empty() -> Self {
        Self {
            status: 200,
            content_type: None,
            body: String::new(),
            held: false,
        }
    }

    pub fn held(mut self) -> Self {
        self.held = true;
        self
    }
}

struct MockState {
    received: Mutex<Vec<ReceivedRequest>>,
    replies: Mutex<VecDeque<MockReply>>,
    default_reply: Mutex<MockReply>,
    release: Notify,
}

/// Local webhook endpoint speaking multipart.
pub struct MockWebhook {
    addr: SocketAddr,
    state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockWebhook {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            received: Mutex::new(Vec::new()),
            replies: Mutex::new(VecDeque::new()),
            default_reply: Mutex::new(MockReply::json(r#"{"response":"ok"}"#)),
            release: Notify::new(),
        });

        let app = Router::new()
            .route("/webhook", post(handle_webhook))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/webhook", self.addr)
    }

    /// Reply used when nothing is queued.
    pub fn set_default_reply(&self, reply: MockReply) {
        *self.state.default_reply.lock().unwrap() = reply;
    }

    /// Reply for the next request only.
    pub fn queue_reply(&self, reply: MockReply) {
        self.state.replies.lock().unwrap().push_back(reply);
    }

    /// Let one held reply go out.
    pub fn release(&self) {
        self.state.release.notify_one();
    }

    pub fn received(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn received_count(&self) -> usize {
        self.state.received.lock().unwrap().len()
    }

    /// Wait until at least `count` requests arrived.
    pub async fn wait_for_requests(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.received_count() < count {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("mock webhook did not receive the expected requests");
    }
}

impl Drop for MockWebhook {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_webhook(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut fields = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_owned);
        let content_type = field.content_type().map(str::to_owned);
        let data = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
        fields.push(ReceivedField {
            name,
            file_name,
            content_type,
            data,
        });
    }
    state
        .received
        .lock()
        .unwrap()
        .push(ReceivedRequest { headers, fields });

    let reply = state
        .replies
        .lock()
        .unwrap()
        .pop_front()
        .unwrap_or_else(|| state.default_reply.lock().unwrap().clone());

    if reply.held {
        state.release.notified().await;
    }

    let status = StatusCode::from_u16(reply.status).unwrap();
    match reply.content_type {
        Some(content_type) => {
            (status, [(header::CONTENT_TYPE, content_type)], reply.body).into_response()
        }
        None => (status, reply.body).into_response(),
    }
}

/// An address nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/webhook", addr)
}
