use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use stride_core::recommend::Recommendation;
use thiserror::Error;
use tracing::info;

pub const RECOMMENDATION_COLUMNS: [&str; 5] =
    ["shoe_id", "brand", "model", "type", "comfort_score"];

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("could not create `{path}`: {source}")]
    Create { path: PathBuf, source: std::io::Error },
    #[error("could not write recommendations: {0}")]
    Write(#[from] csv::Error),
    #[error("could not flush recommendations: {0}")]
    Flush(#[from] std::io::Error),
}

/// One line of `recommendations.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRow {
    pub shoe_id: u64,
    pub brand: String,
    pub model: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub comfort_score: f64,
}

impl From<&Recommendation> for RecommendationRow {
    fn from(recommendation: &Recommendation) -> Self {
        Self {
            shoe_id: recommendation.item_id.0,
            brand: recommendation.brand.clone(),
            model: recommendation.model.clone(),
            item_type: recommendation.item_type.clone(),
            comfort_score: recommendation.comfort_score,
        }
    }
}

/// Replaces `path` with the ranked rows. The header is written even when
/// there is nothing to recommend.
pub fn write_recommendations(
    path: &Path,
    recommendations: &[Recommendation],
) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| OutputError::Create { path: parent.to_path_buf(), source })?;
    }
    let file = fs::File::create(path)
        .map_err(|source| OutputError::Create { path: path.to_path_buf(), source })?;

    write_recommendations_to(file, recommendations)?;
    info!(
        event_name = "stride.output.written",
        path = %path.display(),
        rows = recommendations.len(),
        "recommendations saved"
    );
    Ok(())
}

pub fn write_recommendations_to<W: Write>(
    writer: W,
    recommendations: &[Recommendation],
) -> Result<(), OutputError> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    writer.write_record(RECOMMENDATION_COLUMNS)?;
    for recommendation in recommendations {
        writer.serialize(RecommendationRow::from(recommendation))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use stride_core::domain::item::ItemId;
    use stride_core::recommend::Recommendation;

    use super::write_recommendations_to;

    fn recommendation(id: u64, score: f64) -> Recommendation {
        Recommendation {
            item_id: ItemId(id),
            brand: format!("Brand{id}"),
            model: format!("Model{id}"),
            item_type: "running".to_string(),
            comfort_score: 0.75,
            score,
        }
    }

    #[test]
    fn rows_follow_rank_order_under_fixed_header() {
        let mut buffer = Vec::new();
        write_recommendations_to(&mut buffer, &[recommendation(9, 3.0), recommendation(2, 1.0)])
            .expect("write");

        let written = String::from_utf8(buffer).expect("utf8");
        assert_eq!(
            written,
            "shoe_id,brand,model,type,comfort_score\n\
             9,Brand9,Model9,running,0.75\n\
             2,Brand2,Model2,running,0.75\n"
        );
    }

    #[test]
    fn empty_ranking_still_writes_header() {
        let mut buffer = Vec::new();
        write_recommendations_to(&mut buffer, &[]).expect("write");

        let written = String::from_utf8(buffer).expect("utf8");
        assert_eq!(written, "shoe_id,brand,model,type,comfort_score\n");
    }
}
