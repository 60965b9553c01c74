use std::collections::BTreeSet;

use super::{cosine_from_parts, SimilarityMatrix};
use crate::domain::item::Item;
use crate::store::Catalog;

/// One-hot encoder for `type`, `material` and `season`, plus min–max scaled
/// comfort. Vocabularies come from the catalog itself, sorted so the feature
/// layout is stable across runs.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureEncoder {
    types: Vec<String>,
    materials: Vec<String>,
    seasons: Vec<String>,
    comfort_min: f64,
    comfort_max: f64,
}

impl FeatureEncoder {
    pub fn fit(items: &[Item]) -> Self {
        let comfort_min =
            items.iter().map(|item| item.comfort_score).fold(f64::INFINITY, f64::min);
        let comfort_max =
            items.iter().map(|item| item.comfort_score).fold(f64::NEG_INFINITY, f64::max);

        Self {
            types: vocabulary(items, |item| item.item_type.as_str()),
            materials: vocabulary(items, |item| item.material.as_str()),
            seasons: vocabulary(items, |item| item.season.as_str()),
            comfort_min,
            comfort_max,
        }
    }

    pub fn dimension(&self) -> usize {
        self.types.len() + self.materials.len() + self.seasons.len() + 1
    }

    /// Human-readable name of every feature dimension, in vector order.
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.dimension());
        names.extend(self.types.iter().map(|value| format!("type={value}")));
        names.extend(self.materials.iter().map(|value| format!("material={value}")));
        names.extend(self.seasons.iter().map(|value| format!("season={value}")));
        names.push("comfort_score".to_owned());
        names
    }

    pub fn encode(&self, item: &Item) -> Vec<f64> {
        let mut vector = Vec::with_capacity(self.dimension());
        one_hot(&self.types, &item.item_type, &mut vector);
        one_hot(&self.materials, &item.material, &mut vector);
        one_hot(&self.seasons, &item.season, &mut vector);
        vector.push(self.scale_comfort(item.comfort_score));
        vector
    }

    /// Min–max scaling into `[0, 1]`; a constant column scales to 0.
    pub fn scale_comfort(&self, comfort_score: f64) -> f64 {
        let range = self.comfort_max - self.comfort_min;
        if !range.is_finite() || range <= 0.0 {
            return 0.0;
        }
        ((comfort_score - self.comfort_min) / range).clamp(0.0, 1.0)
    }
}

fn vocabulary(items: &[Item], select: impl Fn(&Item) -> &str) -> Vec<String> {
    items.iter().map(|item| select(item).to_owned()).collect::<BTreeSet<_>>().into_iter().collect()
}

fn one_hot(vocabulary: &[String], value: &str, output: &mut Vec<f64>) {
    output.extend(vocabulary.iter().map(|entry| if entry == value { 1.0 } else { 0.0 }));
}

/// Cosine similarity between every pair of catalog items, in catalog order.
pub fn build_content_similarity(catalog: &Catalog) -> SimilarityMatrix {
    let encoder = FeatureEncoder::fit(catalog.items());
    let vectors = catalog.items().iter().map(|item| encoder.encode(item)).collect::<Vec<_>>();
    let sq_norms = vectors.iter().map(|vector| dot(vector, vector)).collect::<Vec<_>>();

    let width = vectors.len();
    let mut values = vec![0.0; width * width];
    for row in 0..width {
        if sq_norms[row] > 0.0 {
            values[row * width + row] = 1.0;
        }
        for column in row + 1..width {
            let product = dot(&vectors[row], &vectors[column]);
            let similarity = cosine_from_parts(product, sq_norms[row], sq_norms[column]);
            values[row * width + column] = similarity;
            values[column * width + row] = similarity;
        }
    }

    SimilarityMatrix::from_dense(catalog.ids().collect(), values)
}

fn dot(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}

#[cfg(test)]
mod tests {
    use super::{build_content_similarity, FeatureEncoder};
    use crate::domain::item::{CareRequirement, ItemId};
    use crate::store::fixtures::{item, scenario_items};
    use crate::store::Catalog;

    fn approx(left: f64, right: f64) -> bool {
        (left - right).abs() < 1e-9
    }

    #[test]
    fn encoder_derives_sorted_vocabulary_from_catalog() {
        let encoder = FeatureEncoder::fit(&scenario_items());

        assert_eq!(
            encoder.feature_names(),
            vec![
                "type=casual",
                "type=running",
                "material=knit",
                "material=leather",
                "season=summer",
                "season=winter",
                "comfort_score",
            ]
        );
        let encoded = encoder.encode(&scenario_items()[2]);
        assert_eq!(encoded, vec![1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn constant_comfort_scales_to_zero() {
        let items = vec![
            item(1, "running", "knit", "summer", 0.4, CareRequirement::None),
            item(2, "boots", "leather", "winter", 0.4, CareRequirement::None),
        ];
        let encoder = FeatureEncoder::fit(&items);

        assert_eq!(encoder.scale_comfort(0.4), 0.0);
        assert_eq!(encoder.encode(&items[0]).last().copied(), Some(0.0));
    }

    #[test]
    fn disjoint_items_have_zero_content_similarity() {
        let catalog = Catalog::new(scenario_items()).expect("catalog");
        let matrix = build_content_similarity(&catalog);

        // item3 has the minimum comfort, so its scaled comfort is 0 and no
        // dimension overlaps with item1.
        assert_eq!(matrix.get(ItemId(1), ItemId(3)), Some(0.0));
        assert!(matrix.get(ItemId(1), ItemId(2)).unwrap_or_default() > 0.9);
    }

    #[test]
    fn content_matrix_is_symmetric_with_unit_diagonal() {
        let catalog = Catalog::new(vec![
            item(5, "running", "knit", "summer", 0.1, CareRequirement::None),
            item(9, "boots", "leather", "winter", 0.9, CareRequirement::DryClean),
            item(2, "running", "canvas", "all", 0.5, CareRequirement::Handwash),
            item(7, "formal", "leather", "all", 0.3, CareRequirement::None),
        ])
        .expect("catalog");
        let matrix = build_content_similarity(&catalog);

        assert!(matrix.is_symmetric(1e-12));
        for id in catalog.ids() {
            assert_eq!(matrix.get(id, id), Some(1.0));
        }
        for id in catalog.ids() {
            for other in catalog.ids() {
                let value = matrix.get(id, other).unwrap_or(f64::NAN);
                assert!((0.0..=1.0).contains(&value));
            }
        }
    }

    #[test]
    fn single_item_similarity_matches_hand_computed_cosine() {
        let catalog = Catalog::new(scenario_items()).expect("catalog");
        let matrix = build_content_similarity(&catalog);

        // item1 = [0,1,1,0,1,0,1], item2 = [0,1,1,0,1,0,1/3]
        let dot = 3.0 + 1.0 / 3.0;
        let expected = dot / (4.0_f64.sqrt() * (3.0 + 1.0 / 9.0_f64).sqrt());
        assert!(approx(matrix.get(ItemId(1), ItemId(2)).unwrap_or_default(), expected));
    }
}
