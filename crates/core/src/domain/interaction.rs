use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::item::ItemId;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    View,
    Wishlist,
    AddToCart,
    Purchase,
    Rating,
}

impl EventType {
    pub const ALL: [EventType; 5] =
        [Self::View, Self::Wishlist, Self::AddToCart, Self::Purchase, Self::Rating];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Wishlist => "wishlist",
            Self::AddToCart => "add_to_cart",
            Self::Purchase => "purchase",
            Self::Rating => "rating",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventType {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "view" => Ok(Self::View),
            "wishlist" => Ok(Self::Wishlist),
            "add_to_cart" => Ok(Self::AddToCart),
            "purchase" => Ok(Self::Purchase),
            "rating" => Ok(Self::Rating),
            other => Err(DomainError::InvalidCategory {
                field: "event_type",
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub id: u64,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub event_type: EventType,
    /// Explicit rating in `[1, 5]`; absent for most non-rating events.
    pub rating: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl Interaction {
    /// Rating as aggregated by the scorer: absent ratings count as zero.
    pub fn rating_or_zero(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    QuickClean,
    DeepClean,
    Polish,
}

impl DeviceMode {
    pub const ALL: [DeviceMode; 3] = [Self::QuickClean, Self::DeepClean, Self::Polish];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QuickClean => "quick_clean",
            Self::DeepClean => "deep_clean",
            Self::Polish => "polish",
        }
    }
}

impl std::str::FromStr for DeviceMode {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quick_clean" => Ok(Self::QuickClean),
            "deep_clean" => Ok(Self::DeepClean),
            "polish" => Ok(Self::Polish),
            other => Err(DomainError::InvalidCategory {
                field: "device_mode",
                value: other.to_owned(),
            }),
        }
    }
}

/// Device maintenance record. Loaded with the other tables but not read by
/// the scorer or the advisors yet.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CareLogEntry {
    pub id: u64,
    pub user_id: UserId,
    pub item_id: ItemId,
    pub device_mode: DeviceMode,
    pub duration_minutes: u32,
    pub timestamp: DateTime<Utc>,
}
