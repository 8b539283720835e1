//! Embedding value type.
//!
//! Vectors are stored and compared exactly as the provider returned them; no
//! normalization, so a cached vector decodes bit-identical to the original.

use crate::error::ProviderError;

/// A fixed-length float vector produced by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    /// Raw component values, in provider order
    pub values: Vec<f32>,
}

impl Embedding {
    /// Wrap a raw vector.
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Wrap a raw vector, checking it against an expected dimensionality.
    pub fn with_dimension(values: Vec<f32>, expected: usize) -> Result<Self, ProviderError> {
        if values.len() != expected {
            return Err(ProviderError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }
        Ok(Self { values })
    }

    /// Number of components.
    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    /// Squared Euclidean distance to another embedding.
    ///
    /// Returns `f32::INFINITY` when dimensions differ, which keeps
    /// mismatched vectors out of any nearest-neighbor result.
    pub fn l2_sq(&self, other: &Embedding) -> f32 {
        if self.values.len() != other.values.len() {
            return f32::INFINITY;
        }
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| {
                let d = a - b;
                d * d
            })
            .sum()
    }
}
