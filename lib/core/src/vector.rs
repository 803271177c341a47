use serde::{Deserialize, Serialize};

/// Dense model input aligned column-by-column with a [`FeatureSchema`](crate::FeatureSchema)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureVector {
    data: Vec<f64>,
}

impl FeatureVector {
    /// All-zero vector of the given width
    #[inline]
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            data: vec![0.0; dim],
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, position: usize) -> Option<f64> {
        self.data.get(position).copied()
    }

    /// Overwrite one column; out-of-range positions are ignored
    #[inline]
    pub fn set(&mut self, position: usize, value: f64) {
        if let Some(slot) = self.data.get_mut(position) {
            *slot = value;
        }
    }

    /// Number of columns holding a non-zero value
    #[inline]
    pub fn non_zero_count(&self) -> usize {
        self.data.iter().filter(|v| **v != 0.0).count()
    }
}
