//! Vector operations with rayon-parallel processing.

use rayon::prelude::*;

/// Utility struct for vector operations.
pub struct VectorOps;

impl VectorOps {
    /// Compute the dot product between two vectors.
    ///
    /// For unit-norm vectors this equals their cosine similarity.
    pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }
        a.par_iter().zip(b.par_iter()).map(|(x, y)| x * y).sum()
    }

    /// Compute cosine similarity between two vectors.
    pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot_product: f32 = a.par_iter().zip(b.par_iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.par_iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.par_iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot_product / (norm_a * norm_b)
        }
    }

    /// Normalize a vector in-place to unit L2 length.
    ///
    /// The zero vector is left untouched.
    pub fn normalize_inplace(vector: &mut [f32]) {
        let norm: f32 = vector.par_iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.par_iter_mut().for_each(|x| *x /= norm);
        }
    }

    /// Normalize each vector in a batch in-place.
    pub fn batch_normalize(vectors: &mut [Vec<f32>]) {
        vectors.par_iter_mut().for_each(|vector| {
            Self::normalize_inplace(vector);
        });
    }
}
