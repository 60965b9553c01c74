//! CSV loaders for the catalog, interaction and care log tables
//!
//! Every field is validated at this boundary so the engine only ever sees
//! well-formed rows. Errors carry the table, line and column that failed.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use stride_core::config::DataConfig;
use stride_core::domain::interaction::{CareLogEntry, DeviceMode, EventType, Interaction, UserId};
use stride_core::domain::item::{CareRequirement, Item, ItemId};
use stride_core::errors::DomainError;
use stride_core::store::{CareLog, Catalog, InteractionLog};
use thiserror::Error;
use tracing::info;

/// Naive layouts accepted after RFC 3339; read as UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not open {table} `{path}`: {source}")]
    Open { table: &'static str, path: PathBuf, source: std::io::Error },
    #[error("{table} `{source_name}` line {line}: malformed row: {source}")]
    Malformed { table: &'static str, source_name: String, line: u64, source: csv::Error },
    #[error("{table} `{source_name}` line {line}, column `{column}`: {message}")]
    InvalidField {
        table: &'static str,
        source_name: String,
        line: u64,
        column: &'static str,
        message: String,
    },
    #[error("{table} `{source_name}` has no data rows")]
    EmptyTable { table: &'static str, source_name: String },
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl LoadError {
    pub fn table(&self) -> Option<&'static str> {
        match self {
            Self::Open { table, .. }
            | Self::Malformed { table, .. }
            | Self::InvalidField { table, .. }
            | Self::EmptyTable { table, .. } => Some(table),
            Self::Domain(_) => None,
        }
    }
}

/// Resolved locations of the three input tables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataPaths {
    pub catalog: PathBuf,
    pub interactions: PathBuf,
    pub care_log: PathBuf,
}

impl DataPaths {
    pub fn from_config(data: &DataConfig) -> Self {
        Self {
            catalog: data.catalog_path(),
            interactions: data.interactions_path(),
            care_log: data.care_log_path(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Dataset {
    pub catalog: Catalog,
    pub interactions: InteractionLog,
    pub care_log: CareLog,
}

impl Dataset {
    pub fn load(paths: &DataPaths) -> Result<Self, LoadError> {
        let catalog = load_catalog(&paths.catalog)?;
        let interactions = load_interactions(&paths.interactions)?;
        let care_log = load_care_log(&paths.care_log)?;

        info!(
            event_name = "stride.data.loaded",
            items = catalog.len(),
            interactions = interactions.len(),
            users = interactions.user_count(),
            care_log_entries = care_log.len(),
            "input tables loaded"
        );

        Ok(Self { catalog, interactions, care_log })
    }
}

pub fn load_catalog(path: &Path) -> Result<Catalog, LoadError> {
    let file = open("catalog", path)?;
    let catalog = catalog_from_reader(file, &path.display().to_string())?;
    info!(
        event_name = "stride.data.table_loaded",
        table = "catalog",
        path = %path.display(),
        rows = catalog.len(),
        "table loaded"
    );
    Ok(catalog)
}

pub fn load_interactions(path: &Path) -> Result<InteractionLog, LoadError> {
    let file = open("interactions", path)?;
    let interactions = interactions_from_reader(file, &path.display().to_string())?;
    info!(
        event_name = "stride.data.table_loaded",
        table = "interactions",
        path = %path.display(),
        rows = interactions.len(),
        "table loaded"
    );
    Ok(interactions)
}

/// The care log may be empty; it is validated and counted but not scored.
pub fn load_care_log(path: &Path) -> Result<CareLog, LoadError> {
    let file = open("care log", path)?;
    let care_log = care_log_from_reader(file, &path.display().to_string())?;
    info!(
        event_name = "stride.data.table_loaded",
        table = "care_log",
        path = %path.display(),
        rows = care_log.len(),
        "table loaded"
    );
    Ok(care_log)
}

pub fn catalog_from_reader<R: Read>(reader: R, source_name: &str) -> Result<Catalog, LoadError> {
    let table = Table::new("catalog", source_name);
    let mut seen = HashSet::new();
    let mut items = Vec::new();

    for (line, row) in table.rows::<CatalogRow, _>(reader)? {
        let id = ItemId(table.parse(line, "shoe_id", &row.shoe_id)?);
        if !seen.insert(id) {
            return Err(table.invalid(line, "shoe_id", format!("duplicate shoe id {id}")));
        }

        let comfort_score: f64 = table.parse(line, "comfort_score", &row.comfort_score)?;
        if !(0.0..=1.0).contains(&comfort_score) {
            return Err(table.invalid(
                line,
                "comfort_score",
                format!("{comfort_score} is outside [0, 1]"),
            ));
        }

        items.push(Item {
            id,
            brand: row.brand,
            model: row.model,
            item_type: table.category(line, "type", &row.item_type)?,
            material: table.category(line, "material", &row.material)?,
            color: row.color,
            size: table.parse(line, "size", &row.size)?,
            water_resistant: table.flag(line, "water_resistant", &row.water_resistant)?,
            season: table.category(line, "season", &row.season)?,
            comfort_score,
            care_required: table.parse::<CareRequirement>(
                line,
                "care_required",
                &row.care_required,
            )?,
        });
    }

    if items.is_empty() {
        return Err(table.empty());
    }
    Ok(Catalog::new(items)?)
}

pub fn interactions_from_reader<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<InteractionLog, LoadError> {
    let table = Table::new("interactions", source_name);
    let mut interactions = Vec::new();

    for (line, row) in table.rows::<InteractionRow, _>(reader)? {
        let rating = match row.rating.trim() {
            "" => None,
            raw => {
                let rating: f64 = table.parse(line, "rating", raw)?;
                if !(1.0..=5.0).contains(&rating) {
                    return Err(table.invalid(
                        line,
                        "rating",
                        format!("{rating} is outside [1, 5]"),
                    ));
                }
                Some(rating)
            }
        };

        interactions.push(Interaction {
            id: table.parse(line, "interaction_id", &row.interaction_id)?,
            user_id: UserId(table.parse(line, "user_id", &row.user_id)?),
            item_id: ItemId(table.parse(line, "shoe_id", &row.shoe_id)?),
            event_type: table.parse::<EventType>(line, "event_type", &row.event_type)?,
            rating,
            timestamp: table.timestamp(line, "timestamp", &row.timestamp)?,
        });
    }

    if interactions.is_empty() {
        return Err(table.empty());
    }
    Ok(InteractionLog::new(interactions))
}

pub fn care_log_from_reader<R: Read>(reader: R, source_name: &str) -> Result<CareLog, LoadError> {
    let table = Table::new("care log", source_name);
    let mut entries = Vec::new();

    for (line, row) in table.rows::<CareLogRow, _>(reader)? {
        entries.push(CareLogEntry {
            id: table.parse(line, "care_id", &row.care_id)?,
            user_id: UserId(table.parse(line, "user_id", &row.user_id)?),
            item_id: ItemId(table.parse(line, "shoe_id", &row.shoe_id)?),
            device_mode: table.parse::<DeviceMode>(line, "device_mode", &row.device_mode)?,
            duration_minutes: table.parse(line, "duration_minutes", &row.duration_minutes)?,
            timestamp: table.timestamp(line, "timestamp", &row.timestamp)?,
        });
    }

    Ok(CareLog::new(entries))
}

fn open(table: &'static str, path: &Path) -> Result<File, LoadError> {
    File::open(path).map_err(|source| LoadError::Open { table, path: path.to_path_buf(), source })
}

/// Error context shared by one table's rows.
struct Table {
    name: &'static str,
    source_name: String,
}

impl Table {
    fn new(name: &'static str, source_name: &str) -> Self {
        Self { name, source_name: source_name.to_string() }
    }

    /// Deserializes every record, pairing it with its 1-based file line.
    fn rows<T, R>(&self, reader: R) -> Result<Vec<(u64, T)>, LoadError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = reader.headers().map_err(|source| self.malformed(1, source))?.clone();

        let mut rows = Vec::new();
        let mut record = StringRecord::new();
        loop {
            let line = reader.position().line();
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(source) => return Err(self.malformed(line, source)),
            }
            let line = record.position().map_or(line, |position| position.line());
            let row = record
                .deserialize::<T>(Some(&headers))
                .map_err(|source| self.malformed(line, source))?;
            rows.push((line, row));
        }

        Ok(rows)
    }

    fn parse<T>(&self, line: u64, column: &'static str, raw: &str) -> Result<T, LoadError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse::<T>()
            .map_err(|error| self.invalid(line, column, format!("`{raw}`: {error}")))
    }

    fn category(&self, line: u64, column: &'static str, raw: &str) -> Result<String, LoadError> {
        let value = raw.trim().to_ascii_lowercase();
        if value.is_empty() {
            return Err(self.invalid(line, column, "value is required".to_string()));
        }
        Ok(value)
    }

    fn flag(&self, line: u64, column: &'static str, raw: &str) -> Result<bool, LoadError> {
        match raw.trim() {
            "true" | "True" | "TRUE" | "1" => Ok(true),
            "false" | "False" | "FALSE" | "0" => Ok(false),
            other => Err(self.invalid(
                line,
                column,
                format!("`{other}` is not a boolean (expected true|false|1|0)"),
            )),
        }
    }

    fn timestamp(
        &self,
        line: u64,
        column: &'static str,
        raw: &str,
    ) -> Result<DateTime<Utc>, LoadError> {
        let raw = raw.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
            return Ok(timestamp.with_timezone(&Utc));
        }

        NAIVE_TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
            .ok_or_else(|| {
                self.invalid(line, column, format!("`{raw}` is not an ISO-8601 timestamp"))
            })
    }

    fn invalid(&self, line: u64, column: &'static str, message: String) -> LoadError {
        LoadError::InvalidField {
            table: self.name,
            source_name: self.source_name.clone(),
            line,
            column,
            message,
        }
    }

    fn malformed(&self, line: u64, source: csv::Error) -> LoadError {
        LoadError::Malformed {
            table: self.name,
            source_name: self.source_name.clone(),
            line,
            source,
        }
    }

    fn empty(&self) -> LoadError {
        LoadError::EmptyTable { table: self.name, source_name: self.source_name.clone() }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    shoe_id: String,
    brand: String,
    model: String,
    #[serde(rename = "type")]
    item_type: String,
    material: String,
    color: String,
    size: String,
    water_resistant: String,
    season: String,
    comfort_score: String,
    care_required: String,
}

#[derive(Debug, Deserialize)]
struct InteractionRow {
    interaction_id: String,
    user_id: String,
    shoe_id: String,
    event_type: String,
    #[serde(default)]
    rating: String,
    timestamp: String,
}

#[derive(Debug, Deserialize)]
struct CareLogRow {
    care_id: String,
    user_id: String,
    shoe_id: String,
    device_mode: String,
    duration_minutes: String,
    timestamp: String,
}
