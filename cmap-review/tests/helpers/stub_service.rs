//! Stub analysis service
//!
//! axum server on an ephemeral port that plays back queued replies and
//! records what the client sent. `hold()` parks analyze and update handlers
//! until `release()` so tests can interleave client actions with an
//! in-flight request.

use axum::extract::{Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

/// Canned response
#[derive(Debug, Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, String),
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Reply::Json(StatusCode::OK, body)
    }

    pub fn error(status: StatusCode, message: &str) -> Self {
        Reply::Json(status, json!({ "error": message }))
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(status, body) => (status, Json(body)).into_response(),
            Reply::Text(status, body) => (status, body).into_response(),
        }
    }
}

/// One multipart field received by `/api/analyze`
#[derive(Debug, Clone)]
pub struct RecordedUpload {
    pub field: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
struct StubState {
    analyze_replies: Mutex<VecDeque<Reply>>,
    update_replies: Mutex<VecDeque<Reply>>,
    health_reply: Mutex<Option<Reply>>,
    people: Mutex<HashMap<String, Vec<String>>>,
    uploads: Mutex<Vec<RecordedUpload>>,
    update_bodies: Mutex<Vec<Value>>,
    analyze_hits: AtomicUsize,
    update_hits: AtomicUsize,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl StubState {
    fn next_reply(queue: &Mutex<VecDeque<Reply>>) -> Reply {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::error(StatusCode::INTERNAL_SERVER_ERROR, "no reply queued"))
    }

    async fn pass_gate(&self) {
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }
}

/// Running stub service
pub struct StubService {
    base_url: String,
    state: Arc<StubState>,
    handle: JoinHandle<()>,
}

impl StubService {
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());

        let router = Router::new()
            .route("/api/analyze", post(analyze))
            .route("/api/update-person-interests", put(update_person_interests))
            .route("/api/health", get(health))
            .route("/api/get-person-interests", get(person_interests))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn queue_analyze(&self, reply: Reply) {
        self.state.analyze_replies.lock().unwrap().push_back(reply);
    }

    pub fn queue_update(&self, reply: Reply) {
        self.state.update_replies.lock().unwrap().push_back(reply);
    }

    pub fn set_health(&self, reply: Reply) {
        *self.state.health_reply.lock().unwrap() = Some(reply);
    }

    pub fn set_person(&self, name: &str, interests: &[&str]) {
        self.state.people.lock().unwrap().insert(
            name.to_string(),
            interests.iter().map(|s| s.to_string()).collect(),
        );
    }

    pub fn uploads(&self) -> Vec<RecordedUpload> {
        self.state.uploads.lock().unwrap().clone()
    }

    pub fn update_bodies(&self) -> Vec<Value> {
        self.state.update_bodies.lock().unwrap().clone()
    }

    pub fn analyze_hits(&self) -> usize {
        self.state.analyze_hits.load(Ordering::SeqCst)
    }

    pub fn update_hits(&self) -> usize {
        self.state.update_hits.load(Ordering::SeqCst)
    }

    /// Park analyze and update handlers after they record the request
    pub fn hold(&self) {
        *self.state.gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    /// Let one parked (or the next) request through
    pub fn release(&self) {
        if let Some(gate) = self.state.gate.lock().unwrap().as_ref() {
            gate.notify_one();
        }
    }

    pub async fn wait_for_analyze_hits(&self, expected: usize) {
        wait_until(|| self.analyze_hits() >= expected).await;
    }

    pub async fn wait_for_update_hits(&self, expected: usize) {
        wait_until(|| self.update_hits() >= expected).await;
    }
}

impl Drop for StubService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "timed out waiting for stub service");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Base URL on which nothing is listening
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

async fn analyze(State(state): State<Arc<StubState>>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        let recorded = RecordedUpload {
            field: field.name().unwrap_or_default().to_string(),
            file_name: field.file_name().map(str::to_string),
            content_type: field.content_type().map(str::to_string),
            bytes: field.bytes().await.map(|b| b.to_vec()).unwrap_or_default(),
        };
        state.uploads.lock().unwrap().push(recorded);
    }
    state.analyze_hits.fetch_add(1, Ordering::SeqCst);

    state.pass_gate().await;
    StubState::next_reply(&state.analyze_replies).into_response()
}

async fn update_person_interests(
    State(state): State<Arc<StubState>>,
    Json(body): Json<Value>,
) -> Response {
    state.update_bodies.lock().unwrap().push(body);
    state.update_hits.fetch_add(1, Ordering::SeqCst);

    state.pass_gate().await;
    StubState::next_reply(&state.update_replies).into_response()
}

async fn health(State(state): State<Arc<StubState>>) -> Response {
    let reply = state.health_reply.lock().unwrap().clone();
    reply
        .unwrap_or_else(|| Reply::ok(json!({ "status": "healthy" })))
        .into_response()
}

async fn person_interests(
    State(state): State<Arc<StubState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let Some(name) = params.get("person_name") else {
        return Reply::error(StatusCode::BAD_REQUEST, "person_name is required").into_response();
    };
    let interests = state.people.lock().unwrap().get(name).cloned();
    match interests {
        Some(interests) => {
            Reply::ok(json!({ "person_name": name, "interests": interests })).into_response()
        }
        None => Reply::error(StatusCode::NOT_FOUND, "person not found").into_response(),
    }
}
