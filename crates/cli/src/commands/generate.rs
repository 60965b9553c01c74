use std::path::PathBuf;

use chrono::Utc;
use stride_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use stride_core::errors::ApplicationError;
use stride_data::{generate, DataPaths, GeneratorSettings};

use crate::commands::{config_error, generate_error, CommandResult};

#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    pub out_dir: Option<PathBuf>,
    pub users: Option<u64>,
    pub items: Option<u64>,
    pub interactions: Option<u64>,
    pub seed: Option<u64>,
    pub config_path: Option<PathBuf>,
}

pub fn run(request: GenerateRequest) -> CommandResult {
    match execute(request) {
        Ok(message) => CommandResult::success("generate", message),
        Err(error) => CommandResult::from_error("generate", &error),
    }
}

fn execute(request: GenerateRequest) -> Result<String, ApplicationError> {
    let config = AppConfig::load(LoadOptions {
        config_path: request.config_path,
        require_file: false,
        overrides: ConfigOverrides { data_dir: request.out_dir, ..ConfigOverrides::default() },
    })
    .map_err(config_error)?;

    let defaults = GeneratorSettings::default();
    let settings = GeneratorSettings {
        users: request.users.unwrap_or(defaults.users),
        items: request.items.unwrap_or(defaults.items),
        interactions: request.interactions.unwrap_or(defaults.interactions),
        seed: request.seed,
    };

    let dataset = generate(&settings, Utc::now()).map_err(generate_error)?;
    let files = dataset.write(&DataPaths::from_config(&config.data)).map_err(generate_error)?;

    Ok(format!(
        "wrote {} items to {}, {} interactions to {}, {} care log entries to {}",
        dataset.items.len(),
        files.catalog.display(),
        dataset.interactions.len(),
        files.interactions.display(),
        dataset.care_log.len(),
        files.care_log.display()
    ))
}
