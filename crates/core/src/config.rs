use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::advisors::AdvisorSettings;
use crate::recommend::{DEFAULT_ALPHA, DEFAULT_TOP_N};

/// Files probed, in order, when no explicit config path is given.
pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["stride.toml", "config/stride.toml"];

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub data: DataConfig,
    pub recommend: RecommendConfig,
    pub advisor: AdvisorConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DataConfig {
    pub dir: PathBuf,
    pub catalog_file: String,
    pub interactions_file: String,
    pub care_log_file: String,
    pub output_file: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecommendConfig {
    pub alpha: f64,
    pub top_n: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AdvisorConfig {
    pub alpha: f64,
    pub owned_rating_threshold: f64,
    pub usage_threshold: f64,
    pub running_life_days: u32,
    pub default_life_days: u32,
    pub replacement_margin_days: u32,
    /// Fixed seed for simulated usage; drawn from entropy when unset.
    pub seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub output_file: Option<PathBuf>,
    pub alpha: Option<f64>,
    pub top_n: Option<usize>,
    pub advisor_seed: Option<u64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        let advisor = AdvisorSettings::default();
        Self {
            data: DataConfig {
                dir: PathBuf::from("data"),
                catalog_file: "sample_shoe_catalog.csv".to_string(),
                interactions_file: "sample_user_interactions.csv".to_string(),
                care_log_file: "sample_device_care_history.csv".to_string(),
                output_file: PathBuf::from("recommendations.csv"),
            },
            recommend: RecommendConfig { alpha: DEFAULT_ALPHA, top_n: DEFAULT_TOP_N },
            advisor: AdvisorConfig {
                alpha: advisor.alpha,
                owned_rating_threshold: advisor.owned_rating_threshold,
                usage_threshold: advisor.usage_threshold,
                running_life_days: advisor.running_life_days,
                default_life_days: advisor.default_life_days,
                replacement_margin_days: advisor.replacement_margin_days,
                seed: None,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl DataConfig {
    pub fn catalog_path(&self) -> PathBuf {
        self.dir.join(&self.catalog_file)
    }

    pub fn interactions_path(&self) -> PathBuf {
        self.dir.join(&self.interactions_file)
    }

    pub fn care_log_path(&self) -> PathBuf {
        self.dir.join(&self.care_log_file)
    }
}

impl AdvisorConfig {
    pub fn settings(&self) -> AdvisorSettings {
        AdvisorSettings {
            alpha: self.alpha,
            owned_rating_threshold: self.owned_rating_threshold,
            usage_threshold: self.usage_threshold,
            running_life_days: self.running_life_days,
            default_life_days: self.default_life_days,
            replacement_margin_days: self.replacement_margin_days,
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected =
                options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Every settable field as `(key path, env var, rendered value)`, in file order.
    pub fn fields(&self) -> Vec<(&'static str, &'static str, String)> {
        vec![
            ("data.dir", "STRIDE_DATA_DIR", self.data.dir.display().to_string()),
            ("data.catalog_file", "STRIDE_DATA_CATALOG_FILE", self.data.catalog_file.clone()),
            (
                "data.interactions_file",
                "STRIDE_DATA_INTERACTIONS_FILE",
                self.data.interactions_file.clone(),
            ),
            ("data.care_log_file", "STRIDE_DATA_CARE_LOG_FILE", self.data.care_log_file.clone()),
            (
                "data.output_file",
                "STRIDE_DATA_OUTPUT_FILE",
                self.data.output_file.display().to_string(),
            ),
            ("recommend.alpha", "STRIDE_RECOMMEND_ALPHA", self.recommend.alpha.to_string()),
            ("recommend.top_n", "STRIDE_RECOMMEND_TOP_N", self.recommend.top_n.to_string()),
            ("advisor.alpha", "STRIDE_ADVISOR_ALPHA", self.advisor.alpha.to_string()),
            (
                "advisor.owned_rating_threshold",
                "STRIDE_ADVISOR_OWNED_RATING_THRESHOLD",
                self.advisor.owned_rating_threshold.to_string(),
            ),
            (
                "advisor.usage_threshold",
                "STRIDE_ADVISOR_USAGE_THRESHOLD",
                self.advisor.usage_threshold.to_string(),
            ),
            (
                "advisor.running_life_days",
                "STRIDE_ADVISOR_RUNNING_LIFE_DAYS",
                self.advisor.running_life_days.to_string(),
            ),
            (
                "advisor.default_life_days",
                "STRIDE_ADVISOR_DEFAULT_LIFE_DAYS",
                self.advisor.default_life_days.to_string(),
            ),
            (
                "advisor.replacement_margin_days",
                "STRIDE_ADVISOR_REPLACEMENT_MARGIN_DAYS",
                self.advisor.replacement_margin_days.to_string(),
            ),
            (
                "advisor.seed",
                "STRIDE_ADVISOR_SEED",
                self.advisor.seed.map_or_else(|| "<unset>".to_string(), |seed| seed.to_string()),
            ),
            ("logging.level", "STRIDE_LOGGING_LEVEL", self.logging.level.clone()),
            (
                "logging.format",
                "STRIDE_LOGGING_FORMAT",
                format!("{:?}", self.logging.format).to_ascii_lowercase(),
            ),
        ]
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data) = patch.data {
            if let Some(dir) = data.dir {
                self.data.dir = dir;
            }
            if let Some(catalog_file) = data.catalog_file {
                self.data.catalog_file = catalog_file;
            }
            if let Some(interactions_file) = data.interactions_file {
                self.data.interactions_file = interactions_file;
            }
            if let Some(care_log_file) = data.care_log_file {
                self.data.care_log_file = care_log_file;
            }
            if let Some(output_file) = data.output_file {
                self.data.output_file = output_file;
            }
        }

        if let Some(recommend) = patch.recommend {
            if let Some(alpha) = recommend.alpha {
                self.recommend.alpha = alpha;
            }
            if let Some(top_n) = recommend.top_n {
                self.recommend.top_n = top_n;
            }
        }

        if let Some(advisor) = patch.advisor {
            if let Some(alpha) = advisor.alpha {
                self.advisor.alpha = alpha;
            }
            if let Some(threshold) = advisor.owned_rating_threshold {
                self.advisor.owned_rating_threshold = threshold;
            }
            if let Some(threshold) = advisor.usage_threshold {
                self.advisor.usage_threshold = threshold;
            }
            if let Some(days) = advisor.running_life_days {
                self.advisor.running_life_days = days;
            }
            if let Some(days) = advisor.default_life_days {
                self.advisor.default_life_days = days;
            }
            if let Some(days) = advisor.replacement_margin_days {
                self.advisor.replacement_margin_days = days;
            }
            if let Some(seed) = advisor.seed {
                self.advisor.seed = Some(seed);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("STRIDE_DATA_DIR") {
            self.data.dir = PathBuf::from(value);
        }
        if let Some(value) = read_env("STRIDE_DATA_CATALOG_FILE") {
            self.data.catalog_file = value;
        }
        if let Some(value) = read_env("STRIDE_DATA_INTERACTIONS_FILE") {
            self.data.interactions_file = value;
        }
        if let Some(value) = read_env("STRIDE_DATA_CARE_LOG_FILE") {
            self.data.care_log_file = value;
        }
        if let Some(value) = read_env("STRIDE_DATA_OUTPUT_FILE") {
            self.data.output_file = PathBuf::from(value);
        }

        if let Some(value) = read_env("STRIDE_RECOMMEND_ALPHA") {
            self.recommend.alpha = parse_f64("STRIDE_RECOMMEND_ALPHA", &value)?;
        }
        if let Some(value) = read_env("STRIDE_RECOMMEND_TOP_N") {
            self.recommend.top_n = parse_usize("STRIDE_RECOMMEND_TOP_N", &value)?;
        }

        if let Some(value) = read_env("STRIDE_ADVISOR_ALPHA") {
            self.advisor.alpha = parse_f64("STRIDE_ADVISOR_ALPHA", &value)?;
        }
        if let Some(value) = read_env("STRIDE_ADVISOR_OWNED_RATING_THRESHOLD") {
            self.advisor.owned_rating_threshold =
                parse_f64("STRIDE_ADVISOR_OWNED_RATING_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("STRIDE_ADVISOR_USAGE_THRESHOLD") {
            self.advisor.usage_threshold = parse_f64("STRIDE_ADVISOR_USAGE_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("STRIDE_ADVISOR_RUNNING_LIFE_DAYS") {
            self.advisor.running_life_days =
                parse_u32("STRIDE_ADVISOR_RUNNING_LIFE_DAYS", &value)?;
        }
        if let Some(value) = read_env("STRIDE_ADVISOR_DEFAULT_LIFE_DAYS") {
            self.advisor.default_life_days =
                parse_u32("STRIDE_ADVISOR_DEFAULT_LIFE_DAYS", &value)?;
        }
        if let Some(value) = read_env("STRIDE_ADVISOR_REPLACEMENT_MARGIN_DAYS") {
            self.advisor.replacement_margin_days =
                parse_u32("STRIDE_ADVISOR_REPLACEMENT_MARGIN_DAYS", &value)?;
        }
        if let Some(value) = read_env("STRIDE_ADVISOR_SEED") {
            self.advisor.seed = Some(parse_u64("STRIDE_ADVISOR_SEED", &value)?);
        }

        let log_level = read_env("STRIDE_LOGGING_LEVEL").or_else(|| read_env("STRIDE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("STRIDE_LOGGING_FORMAT").or_else(|| read_env("STRIDE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.data.dir = data_dir;
        }
        if let Some(output_file) = overrides.output_file {
            self.data.output_file = output_file;
        }
        if let Some(alpha) = overrides.alpha {
            self.recommend.alpha = alpha;
        }
        if let Some(top_n) = overrides.top_n {
            self.recommend.top_n = top_n;
        }
        if let Some(seed) = overrides.advisor_seed {
            self.advisor.seed = Some(seed);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_data(&self.data)?;
        validate_recommend(&self.recommend)?;
        validate_advisor(&self.advisor)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// The explicit path when it exists, otherwise the first existing candidate.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_data(data: &DataConfig) -> Result<(), ConfigError> {
    let names = [
        ("data.catalog_file", data.catalog_file.as_str()),
        ("data.interactions_file", data.interactions_file.as_str()),
        ("data.care_log_file", data.care_log_file.as_str()),
    ];
    for (key, name) in names {
        if name.trim().is_empty() {
            return Err(ConfigError::Validation(format!("{key} must not be empty")));
        }
    }

    if data.output_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation("data.output_file must not be empty".to_string()));
    }

    Ok(())
}

fn validate_alpha(key: &str, alpha: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&alpha) {
        return Err(ConfigError::Validation(format!(
            "{key} must be in range 0.0..=1.0 (got {alpha}); 1.0 is pure content, 0.0 pure \
             collaborative"
        )));
    }
    Ok(())
}

fn validate_recommend(recommend: &RecommendConfig) -> Result<(), ConfigError> {
    validate_alpha("recommend.alpha", recommend.alpha)?;

    if recommend.top_n == 0 {
        return Err(ConfigError::Validation(
            "recommend.top_n must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_advisor(advisor: &AdvisorConfig) -> Result<(), ConfigError> {
    validate_alpha("advisor.alpha", advisor.alpha)?;

    if !(1.0..=5.0).contains(&advisor.owned_rating_threshold) {
        return Err(ConfigError::Validation(
            "advisor.owned_rating_threshold must be in range 1.0..=5.0".to_string(),
        ));
    }

    if !advisor.usage_threshold.is_finite() || advisor.usage_threshold < 0.0 {
        return Err(ConfigError::Validation(
            "advisor.usage_threshold must be a non-negative number".to_string(),
        ));
    }

    if advisor.running_life_days == 0 || advisor.default_life_days == 0 {
        return Err(ConfigError::Validation(
            "advisor.running_life_days and advisor.default_life_days must be greater than zero"
                .to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| invalid_override(key, value))
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigPatch {
    data: Option<DataPatch>,
    recommend: Option<RecommendPatch>,
    advisor: Option<AdvisorPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct DataPatch {
    dir: Option<PathBuf>,
    catalog_file: Option<String>,
    interactions_file: Option<String>,
    care_log_file: Option<String>,
    output_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RecommendPatch {
    alpha: Option<f64>,
    top_n: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AdvisorPatch {
    alpha: Option<f64>,
    owned_rating_threshold: Option<f64>,
    usage_threshold: Option<f64>,
    running_life_days: Option<u32>,
    default_life_days: Option<u32>,
    replacement_margin_days: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
