use axum::Json;
use gemini_relay_schema::HealthReply;

/// Liveness probe; never touches the upstream.
pub async fn health_handler() -> Json<HealthReply> {
    Json(HealthReply::default())
}
