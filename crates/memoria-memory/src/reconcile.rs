//! Dimension reconciliation.
//!
//! Providers emit vectors of their native length while a vector index has
//! one fixed dimension. Longer vectors are shrunk by averaging contiguous
//! buckets; shorter ones are zero-padded.
//!
//! Zero-padding leaves cosine similarity between padded vectors unchanged but
//! dilutes magnitude under dot-product metrics, so the index should use
//! cosine similarity.

use crate::error::MemoryError;
use crate::Result;

/// Resize `vector` to exactly `target` elements.
///
/// When shrinking, output element `i` is the mean of source indices
/// `[i * n / target, (i + 1) * n / target)`.
pub fn reconcile(vector: Vec<f32>, target: usize) -> Result<Vec<f32>> {
    if target == 0 {
        return Err(MemoryError::config("target dimension must be greater than 0"));
    }
    if vector.is_empty() {
        return Err(MemoryError::Dimension(
            "cannot reconcile an empty vector".to_string(),
        ));
    }

    let n = vector.len();
    if n == target {
        return Ok(vector);
    }

    if n < target {
        let mut padded = vector;
        padded.resize(target, 0.0);
        return Ok(padded);
    }

    Ok((0..target)
        .map(|i| {
            let bucket = &vector[i * n / target..(i + 1) * n / target];
            bucket.iter().sum::<f32>() / bucket.len() as f32
        })
        .collect())
}

/// Reconciles vectors to one fixed dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DimensionReconciler {
    target: usize,
}

impl DimensionReconciler {
    /// Create a reconciler, rejecting a zero dimension up front.
    pub fn new(target: usize) -> Result<Self> {
        if target == 0 {
            return Err(MemoryError::config("vector dimension must be greater than 0"));
        }
        Ok(Self { target })
    }

    /// The fixed output dimension.
    pub fn target(&self) -> usize {
        self.target
    }

    /// Resize `vector` to the target dimension.
    pub fn reconcile(&self, vector: Vec<f32>) -> Result<Vec<f32>> {
        reconcile(vector, self.target)
    }
}
