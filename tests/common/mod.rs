#![allow(dead_code)]

use axum::{
    Router,
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use gemini_relay::credentials::{CredentialResolver, CredentialSource};
use gemini_relay::upstream::{Dispatcher, ModelCandidates, ModelEndpoints, RetryPolicy};
use serde_json::{Value, json};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, SystemTime, UNIX_EPOCH},
};
use tokio::net::TcpListener;
use url::Url;

#[derive(Debug, Clone)]
pub struct Captured {
    pub model: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
    pub at: tokio::time::Instant,
}

/// Scripted `generateContent` upstream. Each model answers from its script in
/// order; the final entry repeats once the script runs out.
#[derive(Clone, Default)]
pub struct MockUpstream {
    reqs: Arc<Mutex<Vec<Captured>>>,
    scripts: Arc<Mutex<HashMap<String, Vec<(StatusCode, String)>>>>,
}

impl MockUpstream {
    pub fn script(self, model: &str, replies: Vec<(StatusCode, String)>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(model.to_string(), replies);
        self
    }

    pub fn captured(&self) -> Vec<Captured> {
        self.reqs.lock().unwrap().clone()
    }

    pub fn calls_for(&self, model: &str) -> usize {
        self.reqs
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.model == model)
            .count()
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/v1beta/models/{model_action}", post(generate_content))
            .with_state(self.clone())
    }
}

async fn generate_content(
    State(state): State<MockUpstream>,
    Path(model_action): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(model) = model_action.strip_suffix(":generateContent") else {
        return (StatusCode::NOT_FOUND, "unknown action").into_response();
    };

    let nth = {
        let mut reqs = state.reqs.lock().unwrap();
        let nth = reqs.iter().filter(|c| c.model == model).count();
        reqs.push(Captured {
            model: model.to_string(),
            query,
            headers,
            body: body.to_vec(),
            at: tokio::time::Instant::now(),
        });
        nth
    };

    let scripts = state.scripts.lock().unwrap();
    let Some(replies) = scripts.get(model).filter(|r| !r.is_empty()) else {
        return (StatusCode::NOT_FOUND, r#"{"error":"model not found"}"#).into_response();
    };
    let (status, body) = replies[nth.min(replies.len() - 1)].clone();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

pub async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

pub fn candidate_reply(text: &str) -> String {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}

pub fn error_reply(code: u16, message: &str) -> String {
    json!({ "error": { "code": code, "message": message } }).to_string()
}

/// Millisecond-scale schedule so retry tests stay fast.
pub fn fast_policy(max_attempts: usize) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(1), 1.8)
}

pub fn api_key_source(key: &str) -> CredentialSource {
    CredentialSource {
        api_key: Some(key.to_string()),
        service_account_path: None,
    }
}

pub fn dispatcher(
    base: Url,
    source: CredentialSource,
    models: &[&str],
    policy: RetryPolicy,
) -> Dispatcher {
    let client = reqwest::Client::new();
    let resolver = CredentialResolver::new(source, client.clone());
    Dispatcher::new(
        client,
        resolver,
        ModelEndpoints::new(base),
        ModelCandidates::from(models.iter().map(|m| (*m).to_string()).collect::<Vec<_>>()),
        policy,
    )
}

pub fn unique_temp_path(prefix: &str, ext: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "gemini-relay-{prefix}-{}-{}.{ext}",
        std::process::id(),
        nanos
    ));
    temp_path
}

pub fn prompt_of(captured: &Captured) -> Value {
    let body: Value = serde_json::from_slice(&captured.body).expect("upstream body is json");
    body["contents"][0]["parts"][0]["text"].clone()
}
