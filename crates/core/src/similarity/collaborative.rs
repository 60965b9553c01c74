use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};

use super::{cosine_from_parts, SimilarityMatrix};
use crate::domain::interaction::{Interaction, UserId};
use crate::domain::item::ItemId;
use crate::store::InteractionLog;

#[derive(Clone, Debug, PartialEq)]
struct RatingCell {
    rating: Option<f64>,
    timestamp: DateTime<Utc>,
}

/// Sparse user×item rating matrix keyed by `(user, item)`.
///
/// Duplicate ratings for a pair resolve to the one with the latest timestamp;
/// on equal timestamps the later row in load order wins. Interactions without
/// a rating register the pair but never overwrite a rating.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RatingMatrix {
    cells: BTreeMap<(UserId, ItemId), RatingCell>,
    items: BTreeSet<ItemId>,
}

impl RatingMatrix {
    pub fn from_interactions(interactions: &[Interaction]) -> Self {
        let mut matrix = Self::default();
        for interaction in interactions {
            matrix.record(interaction);
        }
        matrix
    }

    fn record(&mut self, interaction: &Interaction) {
        self.items.insert(interaction.item_id);
        let key = (interaction.user_id, interaction.item_id);
        let incoming = RatingCell { rating: interaction.rating, timestamp: interaction.timestamp };

        match self.cells.get_mut(&key) {
            None => {
                self.cells.insert(key, incoming);
            }
            Some(existing) => {
                if incoming.rating.is_none() {
                    return;
                }
                if existing.rating.is_none() || incoming.timestamp >= existing.timestamp {
                    *existing = incoming;
                }
            }
        }
    }

    /// Cell value with missing ratings read as 0.
    pub fn get(&self, user_id: UserId, item_id: ItemId) -> f64 {
        self.rating(user_id, item_id).unwrap_or(0.0)
    }

    /// Explicit lookup separating "no rating" (`None`) from a stored value.
    pub fn rating(&self, user_id: UserId, item_id: ItemId) -> Option<f64> {
        self.cells.get(&(user_id, item_id)).and_then(|cell| cell.rating)
    }

    /// Whether the user has any interaction with the item, rated or not.
    pub fn has_interaction(&self, user_id: UserId, item_id: ItemId) -> bool {
        self.cells.contains_key(&(user_id, item_id))
    }

    /// Items that appear in at least one interaction, ascending.
    pub fn items(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.items.iter().copied()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Non-zero ratings in `(user, item)` order.
    fn nonzero_ratings(&self) -> impl Iterator<Item = (UserId, ItemId, f64)> + '_ {
        self.cells.iter().filter_map(|((user_id, item_id), cell)| {
            cell.rating.filter(|rating| *rating != 0.0).map(|rating| (*user_id, *item_id, rating))
        })
    }
}

/// Cosine similarity between the item columns of the rating matrix. The index
/// holds every item seen in the interaction log; items never interacted with
/// are absent.
pub fn build_collaborative_similarity(interactions: &InteractionLog) -> SimilarityMatrix {
    let ratings = RatingMatrix::from_interactions(interactions.all());
    collaborative_similarity_from(&ratings)
}

fn collaborative_similarity_from(ratings: &RatingMatrix) -> SimilarityMatrix {
    let ids = ratings.items().collect::<Vec<_>>();
    let positions =
        ids.iter().enumerate().map(|(position, id)| (*id, position)).collect::<BTreeMap<_, _>>();
    let width = ids.len();

    let mut by_user: BTreeMap<UserId, Vec<(usize, f64)>> = BTreeMap::new();
    for (user_id, item_id, rating) in ratings.nonzero_ratings() {
        if let Some(position) = positions.get(&item_id) {
            by_user.entry(user_id).or_default().push((*position, rating));
        }
    }

    // Only co-rated pairs contribute, so accumulate per user instead of
    // walking full columns.
    let mut dots = vec![0.0; width * width];
    for rated in by_user.values() {
        for (index, (left, left_rating)) in rated.iter().enumerate() {
            for (right, right_rating) in &rated[index..] {
                let product = left_rating * right_rating;
                dots[left * width + right] += product;
                if left != right {
                    dots[right * width + left] += product;
                }
            }
        }
    }

    let sq_norms =
        (0..width).map(|position| dots[position * width + position]).collect::<Vec<_>>();
    let mut values = vec![0.0; width * width];
    for row in 0..width {
        if sq_norms[row] > 0.0 {
            values[row * width + row] = 1.0;
        }
        for column in row + 1..width {
            let similarity =
                cosine_from_parts(dots[row * width + column], sq_norms[row], sq_norms[column]);
            values[row * width + column] = similarity;
            values[column * width + row] = similarity;
        }
    }

    SimilarityMatrix::from_dense(ids, values)
}
