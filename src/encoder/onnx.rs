//! Local embedding encoder using ONNX Runtime.
//!
//! Loads the multilingual MiniLM sentence transformer once at startup and
//! runs inference entirely on-device. Tries the CUDA execution provider
//! first and falls back to CPU when unavailable.

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{info, warn};

use crate::config::Config;
use crate::services::VectorOps;
use crate::traits::Encoder;

/// Fixed model identifier, exposed verbatim in every response.
pub const MODEL_NAME: &str = "sentence-transformers/paraphrase-multilingual-MiniLM-L12-v2";

/// Output dimension of the model.
pub const EMBEDDING_DIM: usize = 384;

/// Maximum token sequence length accepted by the model.
const MAX_SEQ_LEN: usize = 128;

/// Fixed inputs for the startup warm-up pass. Forces lazy initialization
/// (weight loading, kernel setup) to happen before the first real request.
const WARMUP_TEXTS: [&str; 3] = ["돼지고기", "양파", "마늘"];

/// Local embedding encoder backed by an ONNX Runtime session.
///
/// The session requires exclusive access per inference call, so it sits
/// behind a `Mutex`; concurrent requests serialize at the session.
pub struct OnnxEncoder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxEncoder {
    /// Create a new encoder from the configured model and tokenizer paths.
    ///
    /// Attempts the CUDA execution provider first, falling back to CPU.
    /// Fails if either file is missing or the session cannot be created.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate_model_files()?;

        info!("Initializing ONNX session for {}", MODEL_NAME);

        let cuda_result = Session::builder()?
            .with_execution_providers([CUDAExecutionProvider::default().build()])?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(&config.model_path);

        let session = match cuda_result {
            Ok(s) => {
                info!("✓ CUDA execution provider initialized");
                s
            }
            Err(e) => {
                warn!("CUDA execution provider unavailable: {}", e);
                warn!("Falling back to CPU execution provider");
                Session::builder()?
                    .with_execution_providers([CPUExecutionProvider::default().build()])?
                    .with_optimization_level(GraphOptimizationLevel::Level3)?
                    .with_intra_threads(4)?
                    .commit_from_file(&config.model_path)?
            }
        };

        info!("✓ ONNX session created");

        let tokenizer = Tokenizer::from_file(&config.tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;

        info!("✓ Tokenizer loaded");

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }

    /// Run one inference pass over fixed dummy inputs.
    ///
    /// Called once at startup, before the listener binds. A failure here is
    /// a fatal startup error, not something deferred to the first request.
    pub async fn warmup(&self) -> Result<()> {
        info!("Running warm-up inference ({} inputs)", WARMUP_TEXTS.len());

        let texts: Vec<String> = WARMUP_TEXTS.iter().map(|t| t.to_string()).collect();
        let embeddings = self.encode_batch(&texts).await?;

        if embeddings.len() != WARMUP_TEXTS.len() {
            bail!(
                "Warm-up produced {} vectors (expected {})",
                embeddings.len(),
                WARMUP_TEXTS.len()
            );
        }

        info!("✓ Warm-up complete");
        Ok(())
    }

    /// Tokenize and encode text for the model.
    fn encode_text(&self, text: &str) -> Result<(Vec<i64>, Vec<i64>)> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        let mut input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let mut attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();

        input_ids.truncate(MAX_SEQ_LEN);
        attention_mask.truncate(MAX_SEQ_LEN);

        Ok((input_ids, attention_mask))
    }

    /// Run inference on a single text, returning the pooled (unnormalized)
    /// sentence vector.
    fn run_inference(&self, text: &str) -> Result<Vec<f32>> {
        let (input_ids, attention_mask) = self.encode_text(text)?;
        let seq_len = input_ids.len();

        // Keep the mask around for pooling; the tensor consumes its copy.
        let mask_for_pooling = attention_mask.clone();
        let token_type_ids: Vec<i64> = vec![0i64; seq_len];

        let input_ids_tensor =
            Tensor::from_array(([1usize, seq_len], input_ids.into_boxed_slice()))?;
        let attention_mask_tensor =
            Tensor::from_array(([1usize, seq_len], attention_mask.into_boxed_slice()))?;
        let token_type_ids_tensor =
            Tensor::from_array(([1usize, seq_len], token_type_ids.into_boxed_slice()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Failed to lock session: {}", e))?;
        let outputs = session.run(ort::inputs![
            "input_ids" => input_ids_tensor,
            "attention_mask" => attention_mask_tensor,
            "token_type_ids" => token_type_ids_tensor,
        ])?;

        let output = outputs
            .iter()
            .next()
            .ok_or_else(|| anyhow!("No output tensor found"))?
            .1;

        let (shape, data) = output.try_extract_tensor::<f32>()?;

        // [batch, seq_len, hidden] outputs are token-level and need pooling;
        // [batch, hidden] outputs are already sentence-level.
        let embedding = if shape.len() == 3 {
            let out_seq_len = shape[1] as usize;
            let hidden_size = shape[2] as usize;

            // Mean pooling over the sequence, weighted by the attention mask
            // so padding tokens do not contribute.
            let mut pooled = vec![0.0f32; hidden_size];
            let mut mask_sum = 0.0f32;

            for (j, &mask_value) in mask_for_pooling.iter().enumerate().take(out_seq_len) {
                if mask_value == 0 {
                    continue;
                }
                mask_sum += mask_value as f32;
                let row = &data[j * hidden_size..(j + 1) * hidden_size];
                for (acc, &value) in pooled.iter_mut().zip(row) {
                    *acc += value;
                }
            }

            for value in &mut pooled {
                *value /= mask_sum.max(1e-9);
            }

            pooled
        } else if shape.len() == 2 {
            data.to_vec()
        } else {
            return Err(anyhow!("Unexpected output tensor shape: {:?}", shape));
        };

        Ok(embedding)
    }
}

#[async_trait]
impl Encoder for OnnxEncoder {
    async fn encode_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        // One inference call per text. Keeps peak memory low on constrained
        // hosts at the cost of per-item overhead.
        let mut embeddings = texts
            .iter()
            .map(|text| self.run_inference(text))
            .collect::<Result<Vec<_>>>()?;

        VectorOps::batch_normalize(&mut embeddings);

        for (i, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != EMBEDDING_DIM {
                bail!(
                    "Unexpected embedding dimension at index {}: {} (expected {})",
                    i,
                    embedding.len(),
                    EMBEDDING_DIM
                );
            }
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            port: 8000,
            host: "127.0.0.1".to_string(),
            model_path: "./models/paraphrase-multilingual-MiniLM-L12-v2.onnx".to_string(),
            tokenizer_path: "./models/tokenizer.json".to_string(),
        }
    }

    #[tokio::test]
    #[ignore] // Requires model files to be present
    async fn test_encode_dimension() {
        let encoder = OnnxEncoder::new(&test_config()).unwrap();

        let embeddings = encoder
            .encode_batch(&["hello world".to_string()])
            .await
            .unwrap();

        assert_eq!(embeddings.len(), 1);
        assert_eq!(embeddings[0].len(), EMBEDDING_DIM);
    }

    #[tokio::test]
    #[ignore] // Requires model files to be present
    async fn test_vectors_are_unit_norm() {
        let encoder = OnnxEncoder::new(&test_config()).unwrap();

        let texts = vec!["돼지고기".to_string(), "양파".to_string(), "마늘".to_string()];
        let embeddings = encoder.encode_batch(&texts).await.unwrap();

        assert_eq!(embeddings.len(), 3);
        for embedding in &embeddings {
            let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
            assert!((norm - 1.0).abs() < 1e-5, "norm was {}", norm);
        }
    }

    #[tokio::test]
    #[ignore] // Requires model files to be present
    async fn test_encode_is_deterministic() {
        let encoder = OnnxEncoder::new(&test_config()).unwrap();

        let texts = vec!["kimchi stew".to_string()];
        let first = encoder.encode_batch(&texts).await.unwrap();
        let second = encoder.encode_batch(&texts).await.unwrap();

        let similarity = VectorOps::dot_product(&first[0], &second[0]);
        assert!((similarity - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    #[ignore] // Requires model files to be present
    async fn test_warmup() {
        let encoder = OnnxEncoder::new(&test_config()).unwrap();
        encoder.warmup().await.unwrap();
    }
}
