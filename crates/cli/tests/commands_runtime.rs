use std::env;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use stride_cli::commands::generate::GenerateRequest;
use stride_cli::commands::recommend::RecommendRequest;
use stride_cli::commands::{config, doctor, generate, recommend};
use tempfile::TempDir;

const CATALOG: &str = "\
shoe_id,brand,model,type,material,color,size,water_resistant,season,comfort_score,care_required
1,Brand1,Model1,running,knit,black,9,False,summer,0.8,none
2,Brand2,Model2,running,knit,white,10,True,summer,0.6,handwash
3,Brand3,Model3,casual,leather,brown,8,False,winter,0.5,none
4,Brand4,Model4,boots,leather,black,11,True,winter,0.9,dry_clean
";

const INTERACTIONS: &str = "\
interaction_id,user_id,shoe_id,event_type,rating,timestamp
1,42,1,rating,5,2024-05-01T09:00:00
2,42,4,view,,2024-05-02T09:00:00
3,7,1,rating,4.5,2024-05-03T09:00:00
4,7,2,purchase,4.0,2024-05-04T09:00:00
5,8,3,rating,2.0,2024-05-05T09:00:00
6,8,4,rating,4.0,2024-05-06T09:00:00
";

const CARE_LOG: &str = "\
care_id,user_id,shoe_id,device_mode,duration_minutes,timestamp
1,42,1,quick_clean,10,2024-05-07T09:00:00
";

#[test]
fn recommend_json_ranks_unseen_items_for_stdin_user() {
    let data = fixture_dir();
    with_env(&[], || {
        let output_path = data.path().join("out").join("recommendations.csv");
        let request = RecommendRequest {
            data_dir: Some(data.path().to_path_buf()),
            output: Some(output_path.clone()),
            seed: Some(11),
            json: true,
            ..RecommendRequest::default()
        };
        let result = recommend::run(request, &mut Cursor::new("42\n"));
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["user_id"], 42);
        assert_eq!(payload["known_user"], true);
        assert_eq!(payload["top_n"], 5);

        let ids = payload["recommendations"]
            .as_array()
            .expect("recommendations array")
            .iter()
            .map(|row| row["item_id"].as_u64().expect("numeric id"))
            .collect::<Vec<_>>();
        assert_eq!(ids.first(), Some(&2));
        assert!(!ids.contains(&1) && !ids.contains(&4), "seen items leaked: {ids:?}");
        assert!(payload["care_notifications"].as_array().expect("array").is_empty());

        let written = fs::read_to_string(&output_path).expect("recommendations.csv");
        assert!(written.starts_with("shoe_id,brand,model,type,comfort_score\n"));
    });
}

#[test]
fn recommend_human_output_lists_sections() {
    let data = fixture_dir();
    with_env(&[], || {
        let request = RecommendRequest {
            user_id: Some("42".to_string()),
            data_dir: Some(data.path().to_path_buf()),
            output: Some(data.path().join("recommendations.csv")),
            seed: Some(3),
            ..RecommendRequest::default()
        };
        let result = recommend::run(request, &mut Cursor::new(""));
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        assert!(result.output.starts_with("Top Recommendations for User 42:\n"));
        assert!(result.output.contains("shoe_id  brand"));
        assert!(result.output.contains("Recommendations saved to "));
        assert!(result.output.contains("Proactive Care Notifications:\n- none"));
        assert!(result.output.contains("Replacement Suggestions:\n"));
    });
}

#[test]
fn recommend_is_reproducible_for_a_fixed_seed() {
    let data = fixture_dir();
    with_env(&[], || {
        let run_once = || {
            let request = RecommendRequest {
                user_id: Some("7".to_string()),
                data_dir: Some(data.path().to_path_buf()),
                output: Some(data.path().join("recommendations.csv")),
                seed: Some(2024),
                json: true,
                ..RecommendRequest::default()
            };
            recommend::run(request, &mut Cursor::new("")).output
        };

        assert_eq!(run_once(), run_once());
    });
}

#[test]
fn recommend_rejects_non_numeric_user() {
    let data = fixture_dir();
    with_env(&[], || {
        let request = RecommendRequest {
            data_dir: Some(data.path().to_path_buf()),
            ..RecommendRequest::default()
        };
        let result = recommend::run(request, &mut Cursor::new("alice\n"));
        assert_eq!(result.exit_code, 6);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "recommend");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "invalid_input");
    });
}

#[test]
fn recommend_reports_missing_tables_as_load_failure() {
    let empty = TempDir::new().expect("temp dir");
    with_env(&[], || {
        let request = RecommendRequest {
            user_id: Some("42".to_string()),
            data_dir: Some(empty.path().to_path_buf()),
            ..RecommendRequest::default()
        };
        let result = recommend::run(request, &mut Cursor::new(""));
        assert_eq!(result.exit_code, 3);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "data_load");
    });
}

#[test]
fn recommend_rejects_alpha_outside_unit_range() {
    let data = fixture_dir();
    with_env(&[], || {
        let request = RecommendRequest {
            user_id: Some("42".to_string()),
            alpha: Some(1.2),
            data_dir: Some(data.path().to_path_buf()),
            ..RecommendRequest::default()
        };
        let result = recommend::run(request, &mut Cursor::new(""));
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn generate_writes_loadable_tables() {
    let out = TempDir::new().expect("temp dir");
    with_env(&[], || {
        let result = generate::run(GenerateRequest {
            out_dir: Some(out.path().to_path_buf()),
            users: Some(20),
            items: Some(10),
            interactions: Some(100),
            seed: Some(5),
            config_path: None,
        });
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "generate");
        assert_eq!(payload["status"], "ok");
        for name in [
            "sample_shoe_catalog.csv",
            "sample_user_interactions.csv",
            "sample_device_care_history.csv",
        ] {
            assert!(out.path().join(name).is_file(), "missing {name}");
        }
    });

    let data_dir = out.path().display().to_string();
    with_env(&[("STRIDE_DATA_DIR", data_dir.as_str())], || {
        let result = doctor::run(true, None);
        assert_eq!(result.exit_code, 0, "generated tables should pass doctor: {}", result.output);
    });
}

#[test]
fn generate_rejects_zero_users() {
    let out = TempDir::new().expect("temp dir");
    with_env(&[], || {
        let result = generate::run(GenerateRequest {
            out_dir: Some(out.path().to_path_buf()),
            users: Some(0),
            ..GenerateRequest::default()
        });
        assert_eq!(result.exit_code, 6);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "invalid_input");
    });
}

#[test]
fn config_lists_values_with_their_source() {
    let dir = TempDir::new().expect("temp dir");
    let config_path = write_config(dir.path(), "[recommend]\nalpha = 0.3\n");
    with_env(&[("STRIDE_RECOMMEND_TOP_N", "7")], || {
        let result = config::run(Some(config_path.clone()));
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let file_source = format!("(source: file ({}))", config_path.display());
        assert!(result.output.contains(&format!("- recommend.alpha = 0.3 {file_source}")));
        assert!(result
            .output
            .contains("- recommend.top_n = 7 (source: env (STRIDE_RECOMMEND_TOP_N))"));
        assert!(result.output.contains("- advisor.alpha = 0.5 (source: default)"));
    });
}

#[test]
fn config_reports_invalid_env_values() {
    with_env(&[("STRIDE_RECOMMEND_TOP_N", "many")], || {
        let result = config::run(None);
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn doctor_passes_when_every_table_loads() {
    let data = fixture_dir();
    let data_dir = data.path().display().to_string();
    with_env(&[("STRIDE_DATA_DIR", data_dir.as_str())], || {
        let result = doctor::run(true, None);
        assert_eq!(result.exit_code, 0, "unexpected failure: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "pass");
        assert_eq!(
            check_names(&payload),
            [
                "config_validation",
                "catalog_load",
                "interactions_load",
                "care_log_load",
                "engine_build"
            ]
        );
    });
}

#[test]
fn doctor_fails_and_skips_engine_when_tables_are_missing() {
    let empty = TempDir::new().expect("temp dir");
    let data_dir = empty.path().display().to_string();
    with_env(&[("STRIDE_DATA_DIR", data_dir.as_str())], || {
        let result = doctor::run(true, None);
        assert_eq!(result.exit_code, 1);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["overall_status"], "fail");
        let checks = payload["checks"].as_array().expect("checks array");
        assert_eq!(checks[1]["status"], "fail");
        assert_eq!(checks[4]["name"], "engine_build");
        assert_eq!(checks[4]["status"], "skipped");
    });
}

#[test]
fn doctor_human_output_marks_each_check() {
    with_env(&[("STRIDE_RECOMMEND_ALPHA", "2.0")], || {
        let result = doctor::run(false, None);
        assert_eq!(result.exit_code, 1);
        assert!(result.output.starts_with("doctor: one or more readiness checks failed"));
        assert!(result.output.contains("- [fail] config_validation:"));
        assert!(result.output.contains("- [skip] catalog_load:"));
    });
}

fn fixture_dir() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("sample_shoe_catalog.csv"), CATALOG).expect("catalog");
    fs::write(dir.path().join("sample_user_interactions.csv"), INTERACTIONS).expect("interactions");
    fs::write(dir.path().join("sample_device_care_history.csv"), CARE_LOG).expect("care log");
    dir
}

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("stride.toml");
    fs::write(&path, contents).expect("config file");
    path
}

fn check_names(payload: &Value) -> Vec<String> {
    payload["checks"]
        .as_array()
        .expect("checks array")
        .iter()
        .map(|check| check["name"].as_str().expect("name").to_string())
        .collect()
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid json")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "STRIDE_DATA_DIR",
        "STRIDE_DATA_CATALOG_FILE",
        "STRIDE_DATA_INTERACTIONS_FILE",
        "STRIDE_DATA_CARE_LOG_FILE",
        "STRIDE_DATA_OUTPUT_FILE",
        "STRIDE_RECOMMEND_ALPHA",
        "STRIDE_RECOMMEND_TOP_N",
        "STRIDE_ADVISOR_ALPHA",
        "STRIDE_ADVISOR_OWNED_RATING_THRESHOLD",
        "STRIDE_ADVISOR_USAGE_THRESHOLD",
        "STRIDE_ADVISOR_RUNNING_LIFE_DAYS",
        "STRIDE_ADVISOR_DEFAULT_LIFE_DAYS",
        "STRIDE_ADVISOR_REPLACEMENT_MARGIN_DAYS",
        "STRIDE_ADVISOR_SEED",
        "STRIDE_LOGGING_LEVEL",
        "STRIDE_LOGGING_FORMAT",
        "STRIDE_LOG_LEVEL",
        "STRIDE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
