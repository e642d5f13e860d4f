//! Embedding encoder module.

pub mod onnx;

pub use onnx::{OnnxEncoder, EMBEDDING_DIM, MODEL_NAME};
