use std::path::PathBuf;

use serde::Serialize;
use stride_core::config::{AppConfig, LoadOptions};
use stride_core::recommend::RecommendationEngine;
use stride_core::store::{CareLog, Catalog, InteractionLog};
use stride_data::{load_care_log, load_catalog, load_interactions, DataPaths, LoadError};

use crate::commands::CommandResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool, config_path: Option<PathBuf>) -> CommandResult {
    let report = build_report(config_path);
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { 1 };

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report(config_path: Option<PathBuf>) -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions { config_path, ..LoadOptions::default() }) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            check_tables(&DataPaths::from_config(&config.data), &mut checks);
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["catalog_load", "interactions_load", "care_log_load", "engine_build"] {
                checks.push(skipped(name, "configuration did not load"));
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_tables(paths: &DataPaths, checks: &mut Vec<DoctorCheck>) {
    let catalog = table_check("catalog_load", load_catalog(&paths.catalog), Catalog::len, checks);
    let interactions = table_check(
        "interactions_load",
        load_interactions(&paths.interactions),
        InteractionLog::len,
        checks,
    );
    table_check("care_log_load", load_care_log(&paths.care_log), CareLog::len, checks);

    let (Some(catalog), Some(interactions)) = (catalog, interactions) else {
        checks.push(skipped("engine_build", "an input table did not load"));
        return;
    };

    checks.push(match RecommendationEngine::build(catalog, interactions) {
        Ok(engine) => DoctorCheck {
            name: "engine_build",
            status: CheckStatus::Pass,
            details: format!(
                "similarity matrices built for {} catalog items and {} interacted items",
                engine.catalog().len(),
                engine.collaborative_similarity().len()
            ),
        },
        Err(error) => DoctorCheck {
            name: "engine_build",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    });
}

fn table_check<T>(
    name: &'static str,
    loaded: Result<T, LoadError>,
    rows: impl Fn(&T) -> usize,
    checks: &mut Vec<DoctorCheck>,
) -> Option<T> {
    match loaded {
        Ok(table) => {
            checks.push(DoctorCheck {
                name,
                status: CheckStatus::Pass,
                details: format!("{} rows loaded", rows(&table)),
            });
            Some(table)
        }
        Err(error) => {
            let details = error.to_string();
            checks.push(DoctorCheck { name, status: CheckStatus::Fail, details });
            None
        }
    }
}

fn skipped(name: &'static str, reason: &str) -> DoctorCheck {
    DoctorCheck { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
