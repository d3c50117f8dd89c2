//! Size estimate of an equivalent small neural network.
//!
//! The network is `Embedding(vocab, dim) -> GlobalAveragePooling -> Dense(classes)`.
//! Nothing is trained; the estimate is reported next to the linear models so
//! their footprint can be compared.

use serde::{Deserialize, Serialize};

use crate::error::{IntentportError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    pub embedding_dim: usize,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        EstimateConfig { embedding_dim: 30 }
    }
}

impl EstimateConfig {
    pub fn validate(&self) -> Result<()> {
        if self.embedding_dim == 0 {
            return Err(IntentportError::invalid_config(
                "estimate.embedding_dim must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Parameter counts and storage sizes of the estimated network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkEstimate {
    pub vocabulary_size: usize,
    pub embedding_dim: usize,
    pub num_classes: usize,
    /// Longest training example in tokens.
    pub max_sequence_length: usize,
    pub embedding_params: usize,
    pub dense_params: usize,
    pub total_params: usize,
    /// Every parameter as float32.
    pub float32_bytes: usize,
    /// Weights as one byte each, biases as float32.
    pub quantized_bytes: usize,
}

impl NetworkEstimate {
    pub fn new(
        vocabulary_size: usize,
        embedding_dim: usize,
        num_classes: usize,
        max_sequence_length: usize,
    ) -> Self {
        let embedding_params = vocabulary_size * embedding_dim;
        let dense_weights = embedding_dim * num_classes;
        let dense_params = dense_weights + num_classes;
        let total_params = embedding_params + dense_params;

        NetworkEstimate {
            vocabulary_size,
            embedding_dim,
            num_classes,
            max_sequence_length,
            embedding_params,
            dense_params,
            total_params,
            float32_bytes: total_params * 4,
            quantized_bytes: embedding_params + dense_weights + num_classes * 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate() {
        let estimate = NetworkEstimate::new(100, 30, 4, 7);
        assert_eq!(estimate.embedding_params, 3000);
        assert_eq!(estimate.dense_params, 124);
        assert_eq!(estimate.total_params, 3124);
        assert_eq!(estimate.float32_bytes, 12496);
        assert_eq!(estimate.quantized_bytes, 3000 + 120 + 16);
    }

    #[test]
    fn test_empty_estimate() {
        let estimate = NetworkEstimate::new(0, 30, 0, 0);
        assert_eq!(estimate.total_params, 0);
        assert_eq!(estimate.quantized_bytes, 0);
    }
}
