//! Item×item similarity matrices.
//!
//! Both builders produce a dense, symmetric [`SimilarityMatrix`] addressed by
//! [`ItemId`] through an explicit id→row mapping, since catalog ids are neither
//! dense nor zero-based. Matrices are computed once per run and never mutated.

mod collaborative;
mod content;

pub use collaborative::{build_collaborative_similarity, RatingMatrix};
pub use content::{build_content_similarity, FeatureEncoder};

use std::collections::HashMap;

use crate::domain::item::ItemId;

#[derive(Clone, Debug, PartialEq)]
pub struct SimilarityMatrix {
    ids: Vec<ItemId>,
    positions: HashMap<ItemId, usize>,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub(crate) fn from_dense(ids: Vec<ItemId>, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), ids.len() * ids.len());
        let positions = ids.iter().enumerate().map(|(position, id)| (*id, position)).collect();
        Self { ids, positions, values }
    }

    /// Row of similarities for `item_id`, ordered like [`Self::ids`].
    pub fn row(&self, item_id: ItemId) -> Option<&[f64]> {
        let position = self.position(item_id)?;
        let width = self.ids.len();
        Some(&self.values[position * width..(position + 1) * width])
    }

    pub fn get(&self, left: ItemId, right: ItemId) -> Option<f64> {
        let column = self.position(right)?;
        self.row(left).map(|row| row[column])
    }

    pub fn position(&self, item_id: ItemId) -> Option<usize> {
        self.positions.get(&item_id).copied()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.positions.contains_key(&item_id)
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_symmetric(&self, tolerance: f64) -> bool {
        let width = self.ids.len();
        (0..width).all(|row| {
            (row + 1..width).all(|column| {
                (self.values[row * width + column] - self.values[column * width + row]).abs()
                    <= tolerance
            })
        })
    }
}

/// Cosine similarity from a precomputed dot product and the two squared norms.
/// Undefined cosines (a zero-norm side) are reported as 0.
pub(crate) fn cosine_from_parts(dot: f64, left_sq_norm: f64, right_sq_norm: f64) -> f64 {
    if left_sq_norm <= 0.0 || right_sq_norm <= 0.0 {
        return 0.0;
    }
    (dot / (left_sq_norm.sqrt() * right_sq_norm.sqrt())).clamp(-1.0, 1.0)
}
