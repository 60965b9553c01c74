//! Seeded synthetic tables for demos and load testing
//!
//! Produces the three input tables with the same column layout the loaders
//! read, so a generated directory can be fed straight back into `recommend`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use stride_core::domain::interaction::{CareLogEntry, DeviceMode, EventType, Interaction, UserId};
use stride_core::domain::item::{CareRequirement, Item, ItemId};
use thiserror::Error;
use tracing::info;

use crate::loader::DataPaths;

const ITEM_TYPES: [&str; 5] = ["casual", "running", "formal", "boots", "sandals"];
const MATERIALS: [&str; 4] = ["leather", "synthetic", "knit", "canvas"];
const SEASONS: [&str; 3] = ["all", "summer", "winter"];
const COLORS: [&str; 5] = ["black", "white", "blue", "brown", "grey"];
const SIZES: [u32; 6] = [6, 7, 8, 9, 10, 11];
const BRAND_COUNT: u32 = 50;
const MODEL_COUNT: u32 = 1000;
const WATER_RESISTANT_PROBABILITY: f64 = 0.2;
/// view, wishlist, add_to_cart, purchase, rating
const EVENT_WEIGHTS: [f64; 5] = [0.60, 0.15, 0.10, 0.10, 0.05];
const RATED_PURCHASE_PROBABILITY: f64 = 0.3;
const HISTORY_DAYS: i64 = 365;
const CARE_LOG_USER_SHARE: u64 = 5;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("invalid generator settings: {0}")]
    InvalidSettings(String),
    #[error("event distribution is invalid: {0}")]
    Distribution(#[from] rand::distributions::WeightedError),
    #[error("could not create `{path}`: {source}")]
    Create { path: PathBuf, source: std::io::Error },
    #[error("could not write synthetic rows: {0}")]
    Write(#[from] csv::Error),
    #[error("could not flush synthetic rows: {0}")]
    Flush(#[from] std::io::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub users: u64,
    pub items: u64,
    pub interactions: u64,
    pub seed: Option<u64>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self { users: 1000, items: 500, interactions: 30_000, seed: None }
    }
}

impl GeneratorSettings {
    fn validate(&self) -> Result<(), GenerateError> {
        if self.users == 0 || self.items == 0 || self.interactions == 0 {
            return Err(GenerateError::InvalidSettings(
                "users, items and interactions must all be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticDataset {
    pub items: Vec<Item>,
    pub interactions: Vec<Interaction>,
    pub care_log: Vec<CareLogEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFiles {
    pub catalog: PathBuf,
    pub interactions: PathBuf,
    pub care_log: PathBuf,
}

/// Seeded from `settings.seed` when present, otherwise from OS entropy.
/// Timestamps fall within the year before `now`.
pub fn generate(
    settings: &GeneratorSettings,
    now: DateTime<Utc>,
) -> Result<SyntheticDataset, GenerateError> {
    let mut rng = match settings.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    generate_with(settings, &mut rng, now)
}

pub fn generate_with<R: Rng>(
    settings: &GeneratorSettings,
    rng: &mut R,
    now: DateTime<Utc>,
) -> Result<SyntheticDataset, GenerateError> {
    settings.validate()?;

    let items = (1..=settings.items).map(|id| synthetic_item(rng, id)).collect::<Vec<_>>();

    let events = WeightedIndex::new(EVENT_WEIGHTS)?;
    let interactions = (1..=settings.interactions)
        .map(|id| {
            let event_type = EventType::ALL[events.sample(rng)];
            let rating = match event_type {
                EventType::Rating => Some(round_to(rng.gen_range(1.0..=5.0), 1)),
                EventType::Purchase if rng.gen_bool(RATED_PURCHASE_PROBABILITY) => {
                    Some(round_to(rng.gen_range(3.0..=5.0), 1))
                }
                _ => None,
            };
            Interaction {
                id,
                user_id: UserId(rng.gen_range(1..=settings.users)),
                item_id: ItemId(rng.gen_range(1..=settings.items)),
                event_type,
                rating,
                timestamp: past_timestamp(rng, now),
            }
        })
        .collect::<Vec<_>>();

    let care_log = (1..=settings.users / CARE_LOG_USER_SHARE)
        .map(|id| CareLogEntry {
            id,
            user_id: UserId(rng.gen_range(1..=settings.users)),
            item_id: ItemId(rng.gen_range(1..=settings.items)),
            device_mode: pick(rng, &DeviceMode::ALL),
            duration_minutes: rng.gen_range(5..=60),
            timestamp: past_timestamp(rng, now),
        })
        .collect::<Vec<_>>();

    Ok(SyntheticDataset { items, interactions, care_log })
}

fn synthetic_item<R: Rng>(rng: &mut R, id: u64) -> Item {
    Item {
        id: ItemId(id),
        brand: format!("Brand{}", rng.gen_range(1..=BRAND_COUNT)),
        model: format!("Model{}", rng.gen_range(1..=MODEL_COUNT)),
        item_type: pick(rng, &ITEM_TYPES).to_string(),
        material: pick(rng, &MATERIALS).to_string(),
        color: pick(rng, &COLORS).to_string(),
        size: pick(rng, &SIZES),
        water_resistant: rng.gen_bool(WATER_RESISTANT_PROBABILITY),
        season: pick(rng, &SEASONS).to_string(),
        comfort_score: round_to(rng.gen::<f64>(), 2),
        care_required: pick(rng, &CareRequirement::ALL),
    }
}

fn pick<R: Rng, T: Copy, const N: usize>(rng: &mut R, values: &[T; N]) -> T {
    values[rng.gen_range(0..N)]
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

fn past_timestamp<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(rng.gen_range(0..=HISTORY_DAYS))
}

impl SyntheticDataset {
    /// Writes the three tables to `paths`, creating parent directories.
    pub fn write(&self, paths: &DataPaths) -> Result<GeneratedFiles, GenerateError> {
        write_table(
            &paths.catalog,
            self.items.iter().map(|item| CatalogRecord {
                shoe_id: item.id.0,
                brand: &item.brand,
                model: &item.model,
                item_type: &item.item_type,
                material: &item.material,
                color: &item.color,
                size: item.size,
                water_resistant: item.water_resistant,
                season: &item.season,
                comfort_score: item.comfort_score,
                care_required: item.care_required.as_str(),
            }),
        )?;
        write_table(
            &paths.interactions,
            self.interactions.iter().map(|interaction| InteractionRecord {
                interaction_id: interaction.id,
                user_id: interaction.user_id.0,
                shoe_id: interaction.item_id.0,
                event_type: interaction.event_type.as_str(),
                rating: interaction.rating,
                timestamp: interaction.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            }),
        )?;
        write_table(
            &paths.care_log,
            self.care_log.iter().map(|entry| CareLogRecord {
                care_id: entry.id,
                user_id: entry.user_id.0,
                shoe_id: entry.item_id.0,
                device_mode: entry.device_mode.as_str(),
                duration_minutes: entry.duration_minutes,
                timestamp: entry.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            }),
        )?;

        info!(
            event_name = "stride.generate.written",
            items = self.items.len(),
            interactions = self.interactions.len(),
            care_log_entries = self.care_log.len(),
            catalog = %paths.catalog.display(),
            "synthetic tables written"
        );

        Ok(GeneratedFiles {
            catalog: paths.catalog.clone(),
            interactions: paths.interactions.clone(),
            care_log: paths.care_log.clone(),
        })
    }
}

fn write_table<T: Serialize>(
    path: &Path,
    rows: impl Iterator<Item = T>,
) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|source| GenerateError::Create { path: parent.to_path_buf(), source })?;
    }
    let file = fs::File::create(path)
        .map_err(|source| GenerateError::Create { path: path.to_path_buf(), source })?;

    let mut writer = csv::Writer::from_writer(file);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct CatalogRecord<'a> {
    shoe_id: u64,
    brand: &'a str,
    model: &'a str,
    #[serde(rename = "type")]
    item_type: &'a str,
    material: &'a str,
    color: &'a str,
    size: u32,
    water_resistant: bool,
    season: &'a str,
    comfort_score: f64,
    care_required: &'a str,
}

#[derive(Serialize)]
struct InteractionRecord<'a> {
    interaction_id: u64,
    user_id: u64,
    shoe_id: u64,
    event_type: &'a str,
    rating: Option<f64>,
    timestamp: String,
}

#[derive(Serialize)]
struct CareLogRecord<'a> {
    care_id: u64,
    user_id: u64,
    shoe_id: u64,
    device_mode: &'a str,
    duration_minutes: u32,
    timestamp: String,
}
