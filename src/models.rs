//! API models for request/response types.
//!
//! Defines the JSON request/response structures for the embedding API.

use serde::{Deserialize, Serialize};

/// Request for embedding a batch of texts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// The texts to embed.
    pub texts: Vec<String>,
}

/// Response for batch embedding.
///
/// `embeddings.len() == count`, every inner vector has length `dim`, and
/// output order matches (clamped) input order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    /// The embedding vectors, one per accepted input text.
    pub embeddings: Vec<Vec<f32>>,
    /// Dimension shared by all vectors in this response.
    pub dim: usize,
    /// Number of vectors returned.
    pub count: usize,
    /// Model identifier.
    pub model: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status, always "ok".
    pub status: String,
    /// Model identifier.
    pub model: String,
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
    /// Error code (optional).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
