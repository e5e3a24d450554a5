use super::types::{ErrorResponse, PromptRequest, PromptResponse};
use crate::llm::LlmClient;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, Json},
};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub llm: Arc<dyn LlmClient>,
    /// Landing page, read once at startup.
    pub index_html: Bytes,
}

pub async fn index(State(state): State<AppState>) -> Html<Bytes> {
    Html(state.index_html)
}

/// Runs a single prompt against the backend.
///
/// The body is decoded by hand rather than through the `Json` extractor so
/// that every decode failure, including a missing content type, is a 400.
/// If the client goes away, hyper drops this future and the in-flight
/// backend request with it.
pub async fn run(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PromptResponse>, (StatusCode, Json<ErrorResponse>)> {
    let request = PromptRequest::from_slice(&body).map_err(|error| {
        warn!("Rejected malformed prompt request: {}", error);
        (StatusCode::BAD_REQUEST, Json(ErrorResponse { error }))
    })?;

    info!("Received prompt request ({} chars)", request.input.len());

    match state.llm.complete(&request.input).await {
        Ok(response) => {
            info!("Completed prompt request ({} chars)", response.len());
            Ok(Json(PromptResponse {
                input: request.input,
                response,
            }))
        }
        Err(e) => {
            error!("Failed to complete prompt request: {}", e);
            Err((
                e.status_code(),
                Json(ErrorResponse {
                    error: format!("Generation failed: {}", e),
                }),
            ))
        }
    }
}
