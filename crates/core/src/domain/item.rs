use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Maintenance a shoe needs; `None` is the "no care" sentinel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareRequirement {
    Handwash,
    MachineWash,
    DryClean,
    None,
}

impl CareRequirement {
    pub const ALL: [CareRequirement; 4] =
        [Self::Handwash, Self::MachineWash, Self::DryClean, Self::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Handwash => "handwash",
            Self::MachineWash => "machine_wash",
            Self::DryClean => "dry_clean",
            Self::None => "none",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for CareRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CareRequirement {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "handwash" => Ok(Self::Handwash),
            "machine_wash" => Ok(Self::MachineWash),
            "dry_clean" => Ok(Self::DryClean),
            "none" => Ok(Self::None),
            other => Err(DomainError::InvalidCategory {
                field: "care_required",
                value: other.to_owned(),
            }),
        }
    }
}

/// One catalog row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub brand: String,
    pub model: String,
    pub item_type: String,
    pub material: String,
    pub color: String,
    pub size: u32,
    pub water_resistant: bool,
    pub season: String,
    pub comfort_score: f64,
    pub care_required: CareRequirement,
}

impl Item {
    pub fn is_running(&self) -> bool {
        self.item_type.eq_ignore_ascii_case("running")
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }
}
