//! Recommendation engine implementation

use super::ranking::top_n;
use super::types::*;
use super::{validate_alpha, RecommendResult};
use crate::domain::interaction::UserId;
use crate::errors::DomainError;
use crate::similarity::{
    build_collaborative_similarity, build_content_similarity, SimilarityMatrix,
};
use crate::store::{Catalog, InteractionLog};

/// Owns the input snapshots and both similarity matrices. Built once per run
/// and only read afterwards, so it can be shared across threads freely.
#[derive(Debug, Clone)]
pub struct RecommendationEngine {
    catalog: Catalog,
    interactions: InteractionLog,
    content: SimilarityMatrix,
    collaborative: SimilarityMatrix,
    /// Collaborative column for each catalog position, `None` when the item
    /// never appears in the interaction log.
    collaborative_columns: Vec<Option<usize>>,
}

impl RecommendationEngine {
    /// Build both similarity matrices. Empty inputs are a precondition
    /// failure and are reported before any scoring happens.
    pub fn build(catalog: Catalog, interactions: InteractionLog) -> RecommendResult<Self> {
        if catalog.is_empty() {
            return Err(DomainError::EmptyCatalog);
        }
        if interactions.is_empty() {
            return Err(DomainError::EmptyInteractions);
        }

        let content = build_content_similarity(&catalog);
        let collaborative = build_collaborative_similarity(&interactions);
        let collaborative_columns =
            catalog.ids().map(|item_id| collaborative.position(item_id)).collect();

        Ok(Self { catalog, interactions, content, collaborative, collaborative_columns })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn interactions(&self) -> &InteractionLog {
        &self.interactions
    }

    pub fn content_similarity(&self) -> &SimilarityMatrix {
        &self.content
    }

    pub fn collaborative_similarity(&self) -> &SimilarityMatrix {
        &self.collaborative
    }

    /// Rating-weighted content and collaborative rows for every rated
    /// interaction of the user, summed separately.
    ///
    /// Each rated row counts, duplicates included. A rated item missing from
    /// either matrix is skipped entirely.
    pub fn contributions(&self, user_id: UserId) -> ScoreContributions {
        let width = self.catalog.len();
        let mut content = vec![0.0; width];
        let mut collaborative = vec![0.0; width];
        let mut seeds = 0;

        for interaction in self.interactions.for_user(user_id) {
            let rating = interaction.rating_or_zero();
            if rating <= 0.0 {
                continue;
            }

            let (Some(content_row), Some(collaborative_row)) = (
                self.content.row(interaction.item_id),
                self.collaborative.row(interaction.item_id),
            ) else {
                continue;
            };

            for (position, similarity) in content_row.iter().enumerate() {
                content[position] += rating * similarity;
            }
            for (position, column) in self.collaborative_columns.iter().enumerate() {
                if let Some(column) = column {
                    collaborative[position] += rating * collaborative_row[*column];
                }
            }
            seeds += 1;
        }

        ScoreContributions { item_ids: self.catalog.ids().collect(), content, collaborative, seeds }
    }

    /// Blended score per catalog item. Everything the user already
    /// interacted with, whatever the event type, is pinned to `-inf`.
    pub fn score(&self, user_id: UserId, alpha: f64) -> RecommendResult<ScoreVector> {
        let alpha = validate_alpha(alpha)?;
        let contributions = self.contributions(user_id);
        let mut values = contributions.blend(alpha);

        for item_id in self.interactions.interacted_items(user_id) {
            if let Some(position) = self.catalog.position(item_id) {
                values[position] = f64::NEG_INFINITY;
            }
        }

        Ok(ScoreVector::new(contributions.item_ids, values))
    }

    /// Top-`n` unseen catalog items for the user.
    pub fn recommend(
        &self,
        user_id: UserId,
        alpha: f64,
        n: usize,
    ) -> RecommendResult<Vec<Recommendation>> {
        let scores = self.score(user_id, alpha)?;

        Ok(top_n(&scores, n)
            .into_iter()
            .filter_map(|item_id| {
                let item = self.catalog.find(item_id)?;
                let score = scores.get(item_id)?;
                Some(Recommendation::from_item(item, score))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::interaction::{EventType, Interaction};
    use crate::domain::item::{CareRequirement, ItemId};
    use crate::store::fixtures::{event, item, rated, scenario_items};

    fn engine(interactions: Vec<Interaction>) -> RecommendationEngine {
        RecommendationEngine::build(
            Catalog::new(scenario_items()).expect("catalog"),
            InteractionLog::new(interactions),
        )
        .expect("engine")
    }

    fn ids(recommendations: &[Recommendation]) -> Vec<ItemId> {
        recommendations.iter().map(|recommendation| recommendation.item_id).collect()
    }

    #[test]
    fn empty_inputs_fail_before_scoring() {
        let log = InteractionLog::new(vec![rated(1, 1, 1, 5.0, 0)]);
        let empty_catalog = RecommendationEngine::build(Catalog::default(), log);
        assert_eq!(empty_catalog.err(), Some(DomainError::EmptyCatalog));

        let empty_log = RecommendationEngine::build(
            Catalog::new(scenario_items()).expect("catalog"),
            InteractionLog::default(),
        );
        assert_eq!(empty_log.err(), Some(DomainError::EmptyInteractions));
    }

    #[test]
    fn pure_content_ranks_shared_attributes_first() {
        let engine = engine(vec![rated(1, 42, 1, 5.0, 0)]);

        let scores = engine.score(UserId(42), 1.0).expect("scores");
        assert!(scores.get(ItemId(2)) > scores.get(ItemId(3)));
        assert!(scores.is_excluded(ItemId(1)));

        let ranked = engine.recommend(UserId(42), 1.0, 5).expect("recommendations");
        assert_eq!(ids(&ranked), vec![ItemId(2), ItemId(3)]);
    }

    #[test]
    fn unknown_user_gets_catalog_in_id_order() {
        let engine = engine(vec![rated(1, 42, 1, 5.0, 0)]);

        let scores = engine.score(UserId(7), 0.6).expect("scores");
        assert!(scores.values().iter().all(|score| *score == 0.0));

        let ranked = engine.recommend(UserId(7), 0.6, 5).expect("recommendations");
        assert_eq!(ids(&ranked), vec![ItemId(1), ItemId(2), ItemId(3)]);
    }

    #[test]
    fn every_interacted_item_is_excluded() {
        let engine = engine(vec![
            rated(1, 42, 1, 4.0, 0),
            event(2, 42, 3, EventType::View, 1),
            event(3, 9, 2, EventType::Purchase, 2),
        ]);

        let ranked = engine.recommend(UserId(42), 0.6, 5).expect("recommendations");
        assert_eq!(ids(&ranked), vec![ItemId(2)]);
    }

    #[test]
    fn requesting_more_than_available_returns_the_smaller_count() {
        let engine = engine(vec![rated(1, 42, 1, 5.0, 0), event(2, 42, 2, EventType::View, 0)]);

        let ranked = engine.recommend(UserId(42), 0.5, 10).expect("recommendations");
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn score_is_linear_in_alpha() {
        let engine = engine(vec![
            rated(1, 42, 1, 5.0, 0),
            rated(2, 7, 1, 4.0, 0),
            rated(3, 7, 2, 3.0, 0),
            rated(4, 8, 2, 2.0, 0),
            rated(5, 8, 3, 5.0, 0),
        ]);
        let contributions = engine.contributions(UserId(42));

        for alpha in [0.0, 0.25, 0.6, 1.0] {
            let scores = engine.score(UserId(42), alpha).expect("scores");
            for (position, (item_id, score)) in scores.iter().enumerate() {
                if item_id == ItemId(1) {
                    continue;
                }
                let expected = alpha * contributions.content[position]
                    + (1.0 - alpha) * contributions.collaborative[position];
                assert!((score - expected).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn catalog_items_without_interactions_get_no_collaborative_signal() {
        let mut items = scenario_items();
        items.push(item(4, "running", "knit", "summer", 0.8, CareRequirement::None));
        let engine = RecommendationEngine::build(
            Catalog::new(items).expect("catalog"),
            InteractionLog::new(vec![rated(1, 42, 1, 5.0, 0), rated(2, 7, 2, 5.0, 0)]),
        )
        .expect("engine");

        let contributions = engine.contributions(UserId(42));
        assert_eq!(contributions.collaborative[3], 0.0);
        assert!(contributions.content[3] > 0.0);
    }

    #[test]
    fn invalid_alpha_is_rejected() {
        let engine = engine(vec![rated(1, 42, 1, 5.0, 0)]);

        assert_eq!(engine.score(UserId(42), 1.5).err(), Some(DomainError::InvalidAlpha(1.5)));
    }

    #[test]
    fn repeated_runs_produce_identical_order() {
        let interactions = vec![
            rated(1, 42, 1, 5.0, 0),
            rated(2, 7, 1, 4.0, 0),
            rated(3, 7, 3, 4.0, 0),
            rated(4, 8, 2, 1.0, 0),
        ];
        let first = engine(interactions.clone()).recommend(UserId(42), 0.6, 5).expect("first");
        let second = engine(interactions).recommend(UserId(42), 0.6, 5).expect("second");

        assert_eq!(first, second);
    }
}
