use std::io::BufRead;
use std::path::PathBuf;

use serde::Serialize;
use stride_core::advisors::{
    CareAdvisor, CareNotification, RandomUsage, ReplacementAdvisor, ReplacementSuggestion,
    UsageSource,
};
use stride_core::config::{AppConfig, ConfigOverrides, LoadOptions};
use stride_core::domain::interaction::UserId;
use stride_core::errors::ApplicationError;
use stride_core::recommend::{Recommendation, RecommendationEngine};
use stride_data::{write_recommendations, DataPaths, Dataset};
use tracing::info;

use crate::commands::{config_error, load_error, output_error, CommandResult};

#[derive(Debug, Clone, Default)]
pub struct RecommendRequest {
    /// Raw user id; read from the first stdin line when absent.
    pub user_id: Option<String>,
    pub alpha: Option<f64>,
    pub top_n: Option<usize>,
    pub seed: Option<u64>,
    pub data_dir: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct RecommendReport {
    pub user_id: UserId,
    pub alpha: f64,
    pub top_n: usize,
    pub known_user: bool,
    pub recommendations: Vec<Recommendation>,
    pub output_path: String,
    pub care_notifications: Vec<CareNotification>,
    pub replacement_suggestions: Vec<ReplacementSuggestion>,
}

pub fn run<R: BufRead>(request: RecommendRequest, stdin: &mut R) -> CommandResult {
    let json = request.json;
    match execute(request, stdin) {
        Ok(report) if json => match serde_json::to_string_pretty(&report) {
            Ok(output) => CommandResult::text(output),
            Err(error) => CommandResult::from_error(
                "recommend",
                &ApplicationError::Output(format!("could not serialize report: {error}")),
            ),
        },
        Ok(report) => CommandResult::text(render_human(&report)),
        Err(error) => CommandResult::from_error("recommend", &error),
    }
}

pub fn execute<R: BufRead>(
    request: RecommendRequest,
    stdin: &mut R,
) -> Result<RecommendReport, ApplicationError> {
    let config = AppConfig::load(LoadOptions {
        config_path: request.config_path,
        require_file: false,
        overrides: ConfigOverrides {
            data_dir: request.data_dir,
            output_file: request.output,
            alpha: request.alpha,
            top_n: request.top_n,
            advisor_seed: request.seed,
            ..ConfigOverrides::default()
        },
    })
    .map_err(config_error)?;

    let user_id = match request.user_id {
        Some(raw) => parse_user_id(&raw)?,
        None => read_user_id(stdin)?,
    };

    let dataset = Dataset::load(&DataPaths::from_config(&config.data)).map_err(load_error)?;
    let engine = RecommendationEngine::build(dataset.catalog, dataset.interactions)?;
    info!(
        event_name = "stride.engine.built",
        items = engine.catalog().len(),
        collaborative_items = engine.collaborative_similarity().len(),
        "similarity matrices built"
    );

    let known_user = engine.interactions().knows_user(user_id);
    let recommendations =
        engine.recommend(user_id, config.recommend.alpha, config.recommend.top_n)?;
    write_recommendations(&config.data.output_file, &recommendations).map_err(output_error)?;

    let mut usage: Box<dyn UsageSource> = match config.advisor.seed {
        Some(seed) => Box::new(RandomUsage::seeded(seed)),
        None => Box::new(RandomUsage::from_entropy()),
    };
    let settings = config.advisor.settings();
    let care_notifications =
        CareAdvisor::new(&engine, settings).notifications(user_id, usage.as_mut());
    let replacement_suggestions =
        ReplacementAdvisor::new(&engine, settings)?.suggestions(user_id, usage.as_mut())?;

    info!(
        event_name = "stride.recommend.completed",
        user_id = user_id.0,
        known_user,
        alpha = config.recommend.alpha,
        recommendations = recommendations.len(),
        care_notifications = care_notifications.len(),
        replacement_suggestions = replacement_suggestions.len(),
        "recommendation run completed"
    );

    Ok(RecommendReport {
        user_id,
        alpha: config.recommend.alpha,
        top_n: config.recommend.top_n,
        known_user,
        recommendations,
        output_path: config.data.output_file.display().to_string(),
        care_notifications,
        replacement_suggestions,
    })
}

fn read_user_id<R: BufRead>(stdin: &mut R) -> Result<UserId, ApplicationError> {
    let mut line = String::new();
    stdin
        .read_line(&mut line)
        .map_err(|error| ApplicationError::Input(format!("could not read user id: {error}")))?;
    if line.trim().is_empty() {
        return Err(ApplicationError::Input(
            "no user id given; pass it as an argument or on the first line of stdin".to_string(),
        ));
    }
    parse_user_id(&line)
}

fn parse_user_id(raw: &str) -> Result<UserId, ApplicationError> {
    let trimmed = raw.trim();
    trimmed.parse::<u64>().map(UserId).map_err(|_| {
        ApplicationError::Input(format!("expected a numeric user id, got `{trimmed}`"))
    })
}

fn render_human(report: &RecommendReport) -> String {
    let mut lines = vec![format!("Top Recommendations for User {}:", report.user_id)];

    if report.recommendations.is_empty() {
        lines.push("(no unseen items to recommend)".to_string());
    } else {
        lines.extend(render_table(&report.recommendations));
    }
    lines.push(format!("Recommendations saved to {}", report.output_path));

    lines.push(String::new());
    lines.push("Proactive Care Notifications:".to_string());
    push_messages(
        &mut lines,
        report.care_notifications.iter().map(|notification| notification.message.as_str()),
    );

    lines.push(String::new());
    lines.push("Replacement Suggestions:".to_string());
    push_messages(
        &mut lines,
        report.replacement_suggestions.iter().map(|suggestion| suggestion.message.as_str()),
    );

    lines.join("\n")
}

fn render_table(recommendations: &[Recommendation]) -> Vec<String> {
    let rows = recommendations
        .iter()
        .map(|row| {
            [
                row.item_id.to_string(),
                row.brand.clone(),
                row.model.clone(),
                row.item_type.clone(),
                format!("{:.2}", row.comfort_score),
            ]
        })
        .collect::<Vec<_>>();
    let header = ["shoe_id", "brand", "model", "type", "comfort_score"].map(str::to_string);

    let mut widths = header.clone().map(|cell| cell.len());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    std::iter::once(&header)
        .chain(&rows)
        .map(|cells| {
            cells
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect()
}

fn push_messages<'a>(lines: &mut Vec<String>, messages: impl Iterator<Item = &'a str>) {
    let before = lines.len();
    lines.extend(messages.map(|message| format!("- {message}")));
    if lines.len() == before {
        lines.push("- none".to_string());
    }
}
