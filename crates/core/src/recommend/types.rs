//! Types for the recommendation engine

use serde::{Deserialize, Serialize};

use crate::domain::item::{Item, ItemId};

/// Per-item scores for one user, aligned with catalog order.
///
/// Items the user already interacted with hold `f64::NEG_INFINITY`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreVector {
    item_ids: Vec<ItemId>,
    values: Vec<f64>,
}

impl ScoreVector {
    pub fn new(item_ids: Vec<ItemId>, values: Vec<f64>) -> Self {
        debug_assert_eq!(item_ids.len(), values.len());
        Self { item_ids, values }
    }

    pub fn get(&self, item_id: ItemId) -> Option<f64> {
        self.item_ids.iter().position(|id| *id == item_id).map(|position| self.values[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, f64)> + '_ {
        self.item_ids.iter().copied().zip(self.values.iter().copied())
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn is_excluded(&self, item_id: ItemId) -> bool {
        self.get(item_id) == Some(f64::NEG_INFINITY)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// The two halves of a hybrid score before blending and exclusion.
///
/// `score(user, alpha) = alpha * content + (1 - alpha) * collaborative`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreContributions {
    pub item_ids: Vec<ItemId>,
    /// Rating-weighted content similarity rows
    pub content: Vec<f64>,
    /// Rating-weighted collaborative similarity rows, projected onto catalog order
    pub collaborative: Vec<f64>,
    /// Number of rated interactions that contributed
    pub seeds: usize,
}

impl ScoreContributions {
    pub fn blend(&self, alpha: f64) -> Vec<f64> {
        self.content
            .iter()
            .zip(&self.collaborative)
            .map(|(content, collaborative)| alpha * content + (1.0 - alpha) * collaborative)
            .collect()
    }
}

/// A ranked catalog item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: ItemId,
    pub brand: String,
    pub model: String,
    pub item_type: String,
    pub comfort_score: f64,
    pub score: f64,
}

impl Recommendation {
    pub fn from_item(item: &Item, score: f64) -> Self {
        Self {
            item_id: item.id,
            brand: item.brand.clone(),
            model: item.model.clone(),
            item_type: item.item_type.clone(),
            comfort_score: item.comfort_score,
            score,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}
