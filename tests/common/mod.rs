//! Mock Backend API shared by the integration tests

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dashmap::DashMap;
use linkstats::backend::{CachedStats, HttpBackend};
use linkstats::config::BackendConfig;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const EXAMPLE_STATS: &str = r#"{
    "totalVisits": 42,
    "dailyStats": [
        {"date": "2024-01-01", "visits": 5},
        {"date": "2024-01-02", "visits": 7}
    ]
}"#;

#[derive(Debug, Clone)]
pub struct RecordedVisit {
    pub handle: String,
    pub body: Value,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordedStatsCall {
    pub handle: String,
    pub period: Option<String>,
    pub authorization: Option<String>,
}

pub struct MockState {
    pub visits: Mutex<Vec<RecordedVisit>>,
    pub visit_calls: AtomicUsize,
    pub visit_status: AtomicU16,
    pub stats_calls: Mutex<Vec<RecordedStatsCall>>,
    /// period -> (status, body)
    pub stats_responses: DashMap<String, (u16, String)>,
    /// period -> remaining forced 503 responses
    pub stats_failures: DashMap<String, usize>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            visits: Mutex::new(Vec::new()),
            visit_calls: AtomicUsize::new(0),
            visit_status: AtomicU16::new(200),
            stats_calls: Mutex::new(Vec::new()),
            stats_responses: DashMap::new(),
            stats_failures: DashMap::new(),
        }
    }
}

impl MockState {
    pub fn respond(&self, period: &str, status: u16, body: &str) {
        self.stats_responses
            .insert(period.to_string(), (status, body.to_string()));
    }

    pub fn fail_next(&self, period: &str, times: usize) {
        self.stats_failures.insert(period.to_string(), times);
    }

    pub fn set_visit_status(&self, status: u16) {
        self.visit_status.store(status, Ordering::SeqCst);
    }

    pub fn visits(&self) -> Vec<RecordedVisit> {
        self.visits.lock().unwrap().clone()
    }

    pub fn visit_calls(&self) -> usize {
        self.visit_calls.load(Ordering::SeqCst)
    }

    pub fn stats_calls(&self) -> Vec<RecordedStatsCall> {
        self.stats_calls.lock().unwrap().clone()
    }

    pub fn stats_calls_for(&self, period: &str) -> usize {
        self.stats_calls()
            .iter()
            .filter(|c| c.period.as_deref() == Some(period))
            .count()
    }
}

fn authorization(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn record_visit(
    State(state): State<Arc<MockState>>,
    Path(handle): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> StatusCode {
    state.visit_calls.fetch_add(1, Ordering::SeqCst);
    state.visits.lock().unwrap().push(RecordedVisit {
        handle,
        body,
        authorization: authorization(&headers),
    });

    StatusCode::from_u16(state.visit_status.load(Ordering::SeqCst))
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn get_stats(
    State(state): State<Arc<MockState>>,
    Path(handle): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let period = params.get("period").cloned();
    state.stats_calls.lock().unwrap().push(RecordedStatsCall {
        handle,
        period: period.clone(),
        authorization: authorization(&headers),
    });

    let key = period.unwrap_or_default();
    if let Some(mut remaining) = state.stats_failures.get_mut(&key) {
        if *remaining > 0 {
            *remaining -= 1;
            return (StatusCode::SERVICE_UNAVAILABLE, "try again").into_response();
        }
    }

    match state.stats_responses.get(&key) {
        Some(entry) => {
            let (status, body) = entry.value().clone();
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        None => (StatusCode::NOT_FOUND, "no stats").into_response(),
    }
}

pub struct MockBackend {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockBackend {
    pub fn config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            retries: 1,
            retry_delay_ms: 0,
        }
    }

    pub fn client(&self) -> Arc<HttpBackend> {
        Arc::new(HttpBackend::from_config(&self.config()).unwrap())
    }

    pub fn cached(&self, ttl: Duration) -> Arc<CachedStats> {
        Arc::new(CachedStats::new(self.client(), 100, ttl))
    }
}

/// Start a mock Backend API on an ephemeral local port
pub async fn spawn_mock_backend() -> MockBackend {
    let state = Arc::new(MockState::default());
    let app = Router::new()
        .route("/profile/{handle}/visit", post(record_visit))
        .route("/profile/{handle}/stats", get(get_stats))
        .with_state(Arc::clone(&state));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockBackend {
        base_url: format!("http://{addr}"),
        state,
    }
}

/// Poll until `check` holds or a second has passed
pub async fn eventually(mut check: impl FnMut() -> bool) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}
