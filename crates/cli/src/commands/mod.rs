pub mod config;
pub mod doctor;
pub mod generate;
pub mod recommend;

use serde::Serialize;
use stride_core::config::ConfigError;
use stride_core::errors::ApplicationError;
use stride_data::{GenerateError, LoadError, OutputError};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
}

impl CommandResult {
    /// Plain successful output, printed verbatim.
    pub fn text(output: impl Into<String>) -> Self {
        Self { exit_code: 0, output: output.into() }
    }

    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    pub fn from_error(command: &str, error: &ApplicationError) -> Self {
        Self::failure(
            command,
            error.error_class(),
            format!("{} ({error})", error.user_message()),
            error.exit_code(),
        )
    }
}

pub(crate) fn config_error(error: ConfigError) -> ApplicationError {
    ApplicationError::Configuration(error.to_string())
}

pub(crate) fn load_error(error: LoadError) -> ApplicationError {
    match error {
        LoadError::Domain(domain) => ApplicationError::Domain(domain),
        other => ApplicationError::Load(other.to_string()),
    }
}

pub(crate) fn output_error(error: OutputError) -> ApplicationError {
    ApplicationError::Output(error.to_string())
}

pub(crate) fn generate_error(error: GenerateError) -> ApplicationError {
    match error {
        GenerateError::InvalidSettings(message) => ApplicationError::Input(message),
        other => ApplicationError::Output(other.to_string()),
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}
