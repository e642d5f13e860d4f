//! Configuration module for the embedding service.

use anyhow::{bail, Result};
use std::path::Path;

/// Service configuration loaded from environment variables.
///
/// The model identifier itself is a fixed constant and is deliberately not
/// configurable; only the listen address and the on-disk file locations are.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub model_path: String,
    pub tokenizer_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            model_path: std::env::var("MODEL_PATH").unwrap_or_else(|_| {
                "./models/paraphrase-multilingual-MiniLM-L12-v2.onnx".to_string()
            }),
            tokenizer_path: std::env::var("TOKENIZER_PATH")
                .unwrap_or_else(|_| "./models/tokenizer.json".to_string()),
        }
    }

    /// Check that the model and tokenizer files exist on disk.
    pub fn validate_model_files(&self) -> Result<()> {
        if !Path::new(&self.model_path).exists() {
            bail!("Model file not found: {}", self.model_path);
        }
        if !Path::new(&self.tokenizer_path).exists() {
            bail!("Tokenizer file not found: {}", self.tokenizer_path);
        }
        Ok(())
    }
}
