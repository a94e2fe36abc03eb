use crate::error::RelayError;
use crate::server::router::{AnsweredModel, RelayState};
use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use gemini_relay_schema::{GenerateBody, GenerateReply};
use tracing::info;

pub async fn generate_handler(
    State(state): State<RelayState>,
    payload: Result<Json<GenerateBody>, JsonRejection>,
) -> Result<(Extension<AnsweredModel>, Json<GenerateReply>), RelayError> {
    let Json(body) = payload?;
    let prompt = body.prompt.unwrap_or_default();

    let result = state.dispatcher.generate(&prompt).await?;
    info!(
        model = %result.model,
        text_chars = result.text.chars().count(),
        "[Generate] Upstream answered"
    );

    Ok((
        Extension(AnsweredModel(result.model)),
        Json(GenerateReply {
            text: result.text,
            raw: result.raw,
        }),
    ))
}
