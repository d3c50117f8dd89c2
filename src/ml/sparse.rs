//! Sparse feature vectors.

use serde::{Deserialize, Serialize};

/// A sparse vector of `(index, value)` pairs sorted by index.
///
/// Indices are unique and explicit zeros are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Create an empty (all-zero) vector.
    pub fn new() -> Self {
        SparseVector {
            entries: Vec::new(),
        }
    }

    /// Build a vector from unordered pairs. Values with the same index are
    /// summed and zeros are dropped.
    pub fn from_pairs(mut pairs: Vec<(usize, f64)>) -> Self {
        pairs.sort_by_key(|&(index, _)| index);

        let mut entries: Vec<(usize, f64)> = Vec::with_capacity(pairs.len());
        for (index, value) in pairs {
            match entries.last_mut() {
                Some(last) if last.0 == index => last.1 += value,
                _ => entries.push((index, value)),
            }
        }
        entries.retain(|&(_, value)| value != 0.0);

        SparseVector { entries }
    }

    /// The non-zero entries in index order.
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    /// Number of non-zero entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// True when every component is zero.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Value at `index`, zero when absent.
    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |&(i, _)| i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    /// Largest stored index.
    pub fn max_index(&self) -> Option<usize> {
        self.entries.last().map(|&(index, _)| index)
    }

    /// Dot product with a dense vector. Indices beyond `dense` count as zero.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.entries
            .iter()
            .filter_map(|&(index, value)| dense.get(index).map(|w| w * value))
            .sum()
    }

    /// Add `scale * self` to `dense` in place.
    pub fn add_scaled_to(&self, dense: &mut [f64], scale: f64) {
        for &(index, value) in &self.entries {
            if let Some(w) = dense.get_mut(index) {
                *w += scale * value;
            }
        }
    }

    /// Sum of squared components.
    pub fn squared_norm(&self) -> f64 {
        self.entries.iter().map(|&(_, value)| value * value).sum()
    }

    /// Euclidean norm.
    pub fn norm(&self) -> f64 {
        self.squared_norm().sqrt()
    }

    /// Scale the vector to unit Euclidean norm. Zero vectors are unchanged.
    pub fn normalize_l2(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, value) in &mut self.entries {
                *value /= norm;
            }
        }
    }

    /// Expand into a dense vector of length `dim`.
    pub fn to_dense(&self, dim: usize) -> Vec<f64> {
        let mut dense = vec![0.0; dim];
        for &(index, value) in &self.entries {
            if index < dim {
                dense[index] = value;
            }
        }
        dense
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs_sorts_and_merges() {
        let v = SparseVector::from_pairs(vec![(3, 1.0), (1, 2.0), (3, 0.5), (2, 0.0)]);
        assert_eq!(v.entries(), &[(1, 2.0), (3, 1.5)]);
        assert_eq!(v.get(3), 1.5);
        assert_eq!(v.get(2), 0.0);
        assert_eq!(v.max_index(), Some(3));
        assert_eq!(v.nnz(), 2);
    }

    #[test]
    fn test_dot_and_norm() {
        let v = SparseVector::from_pairs(vec![(0, 3.0), (2, 4.0)]);
        assert_eq!(v.dot(&[1.0, 10.0, 2.0]), 11.0);
        assert_eq!(v.dot(&[1.0]), 3.0);
        assert_eq!(v.norm(), 5.0);

        let mut w = vec![0.0; 3];
        v.add_scaled_to(&mut w, 2.0);
        assert_eq!(w, vec![6.0, 0.0, 8.0]);
    }

    #[test]
    fn test_normalize() {
        let mut v = SparseVector::from_pairs(vec![(0, 3.0), (1, 4.0)]);
        v.normalize_l2();
        assert!((v.norm() - 1.0).abs() < 1e-12);
        assert_eq!(v.to_dense(3), vec![0.6, 0.8, 0.0]);

        let mut zero = SparseVector::new();
        zero.normalize_l2();
        assert!(zero.is_empty());
    }
}
