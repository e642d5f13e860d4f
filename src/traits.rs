//! Core trait for embedding backends.

use anyhow::Result;
use async_trait::async_trait;

/// Trait for backends that turn text into embedding vectors.
///
/// Handlers depend on `Arc<dyn Encoder>` so request logic can be tested
/// against a stub without model files on disk.
#[async_trait]
pub trait Encoder: Send + Sync {
    /// Generate one embedding vector per input text, preserving order.
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Output dimension of the vectors this encoder produces.
    fn dimension(&self) -> usize;

    /// Identifier of the underlying model.
    fn model_name(&self) -> &str;
}
