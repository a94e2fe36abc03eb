use crate::server::routes::{generate, health};
use crate::upstream::Dispatcher;

use axum::{
    Json, Router,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use base64::Engine as _;
use serde_json::json;
use std::sync::Arc;
use tokio::time::Instant;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");
const MAX_INBOUND_REQUEST_ID_LEN: usize = 128;

/// Response extension naming the model whose answer was relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnsweredModel(pub String);

#[derive(Clone)]
pub struct RelayState {
    pub dispatcher: Arc<Dispatcher>,
}

impl RelayState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// 16 url-safe chars.
fn new_request_id() -> String {
    let bytes: [u8; 12] = rand::random();
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Caller-supplied id if it is printable and short, otherwise a fresh one.
fn request_id_for(req: &Request) -> String {
    req.headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_INBOUND_REQUEST_ID_LEN)
        .map_or_else(new_request_id, str::to_string)
}

async fn not_found_handler() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))).into_response()
}

async fn relay_access_log(req: Request, next: Next) -> Response {
    let request_id = request_id_for(&req);
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let version = req.version();

    let started = Instant::now();
    let mut resp = next.run(req).await;
    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status().as_u16();
    let model = resp
        .extensions()
        .get::<AnsweredModel>()
        .map_or("-", |m| m.0.as_str());

    macro_rules! access_line {
        ($level:ident) => {
            $level!(
                status,
                request_id = %request_id,
                method = %method,
                path = %path,
                version = ?version,
                model,
                latency_ms,
                "[Access]"
            )
        };
    }

    let code = resp.status();
    if code.is_client_error() || code == StatusCode::BAD_GATEWAY {
        access_line!(warn);
    } else if code.is_server_error() {
        access_line!(error);
    } else {
        access_line!(info);
    }

    resp
}

pub fn relay_router(state: RelayState) -> Router {
    Router::new()
        .route("/api/generate", post(generate::generate_handler))
        .route("/health", get(health::health_handler))
        .fallback(not_found_handler)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(relay_access_log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_id(id: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/health");
        if let Some(id) = id {
            builder = builder.header(X_REQUEST_ID, id);
        }
        builder.body(Body::empty()).expect("failed to build request")
    }

    #[test]
    fn generated_ids_are_sixteen_url_safe_chars() {
        let id = request_id_for(&request_with_id(None));
        assert_eq!(id.len(), 16);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_ne!(id, request_id_for(&request_with_id(None)));
    }

    #[test]
    fn inbound_id_is_kept_unless_blank_or_oversized() {
        assert_eq!(request_id_for(&request_with_id(Some("abc-1"))), "abc-1");
        assert_eq!(request_id_for(&request_with_id(Some("   "))).len(), 16);
        let long = "x".repeat(MAX_INBOUND_REQUEST_ID_LEN + 1);
        assert_eq!(request_id_for(&request_with_id(Some(&long))).len(), 16);
    }
}
