//! HTTP handlers module.
//!
//! Provides the embedding and health endpoints. Input sanitization happens
//! here, before anything reaches the encoder.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::{error, info};

use crate::models::{EmbedRequest, EmbedResponse, ErrorResponse, HealthResponse};
use crate::traits::Encoder;

/// Maximum number of texts accepted per request.
pub const MAX_BATCH: usize = 50;

/// Maximum number of characters kept per text.
pub const MAX_TEXT_CHARS: usize = 20;

/// Application state shared across handlers.
pub struct AppState {
    pub encoder: Arc<dyn Encoder>,
}

/// Clamp request texts to the service limits.
///
/// Silent by contract: oversized input is truncated, never rejected, so
/// existing callers keep getting successful responses. The per-text cut
/// counts characters rather than bytes and lands on a character boundary,
/// which matters for multibyte input.
pub fn clamp_texts(texts: Vec<String>) -> Vec<String> {
    texts
        .into_iter()
        .take(MAX_BATCH)
        .map(|mut text| {
            if let Some((idx, _)) = text.char_indices().nth(MAX_TEXT_CHARS) {
                text.truncate(idx);
            }
            text
        })
        .collect()
}

/// Embed a batch of texts.
pub async fn embed(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, (StatusCode, Json<ErrorResponse>)> {
    let texts = clamp_texts(request.texts);

    info!("Embedding batch of {} texts", texts.len());

    if texts.is_empty() {
        return Ok(Json(EmbedResponse {
            embeddings: vec![],
            dim: state.encoder.dimension(),
            count: 0,
            model: state.encoder.model_name().to_string(),
        }));
    }

    match state.encoder.encode_batch(&texts).await {
        Ok(embeddings) => {
            let dim = embeddings.first().map(|e| e.len()).unwrap_or(0);
            Ok(Json(EmbedResponse {
                count: embeddings.len(),
                dim,
                embeddings,
                model: state.encoder.model_name().to_string(),
            }))
        }
        Err(e) => {
            error!("Embedding failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                    code: Some("EMBEDDING_FAILED".to_string()),
                }),
            ))
        }
    }
}

/// Liveness probe. Constant status, no dependency checks.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.encoder.model_name().to_string(),
    })
}
