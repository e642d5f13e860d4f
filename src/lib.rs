//! Embedding Server - Library Entry Point
//!
//! A minimal embedding microservice around a local ONNX sentence
//! transformer. The model is loaded once at startup and shared across all
//! requests for the lifetime of the process.

pub mod config;
pub mod encoder;
pub mod handlers;
pub mod models;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use config::Config;
pub use encoder::{OnnxEncoder, EMBEDDING_DIM, MODEL_NAME};
pub use traits::Encoder;
