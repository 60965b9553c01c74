use thiserror::Error;

use crate::domain::item::ItemId;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("catalog is empty; at least one item is required before scoring")]
    EmptyCatalog,
    #[error("interaction log is empty; at least one interaction is required before scoring")]
    EmptyInteractions,
    #[error("duplicate item id {0} in catalog")]
    DuplicateItem(ItemId),
    #[error("alpha must be within [0, 1], got {0}")]
    InvalidAlpha(f64),
    #[error("unsupported {field} value `{value}`")]
    InvalidCategory { field: &'static str, value: String },
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("data load failure: {0}")]
    Load(String),
    #[error("output failure: {0}")]
    Output(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
    #[error("invalid input: {0}")]
    Input(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in command envelopes.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Load(_) => "data_load",
            Self::Output(_) => "output_write",
            Self::Configuration(_) => "config_validation",
            Self::Input(_) => "invalid_input",
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration(_) => 2,
            Self::Load(_) => 3,
            Self::Domain(_) => 4,
            Self::Output(_) => 5,
            Self::Input(_) => 6,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "Configuration is invalid. Run `stride config` for details.",
            Self::Load(_) => "Input data could not be loaded. Check the CSV files and try again.",
            Self::Domain(_) => "The request could not be processed. Check inputs and try again.",
            Self::Output(_) => "Recommendations could not be saved.",
            Self::Input(_) => "Input was rejected. Check the command arguments.",
        }
    }
}
