pub mod doctor;
pub mod migrate;
pub mod recommend;
pub mod seed;

use agrimall_core::config::{AppConfig, LoadOptions};
use serde::Serialize;
use serde_json::Value;
use tokio::runtime::Runtime;

pub(crate) const EXIT_CONFIG: u8 = 2;
pub(crate) const EXIT_RUNTIME: u8 = 3;
pub(crate) const EXIT_DB_CONNECTIVITY: u8 = 4;
pub(crate) const EXIT_EXECUTION: u8 = 5;

/// Error class, message and exit code for a failed step.
pub(crate) type StepFailure = (&'static str, String, u8);

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
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: impl Serialize,
    ) -> Self {
        Self::with_data(command, None, message.into(), 0, data)
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
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    /// A failure that still reports structured detail, such as a doctor report.
    pub fn failure_with_data(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
        data: impl Serialize,
    ) -> Self {
        Self::with_data(command, Some(error_class), message.into(), exit_code, data)
    }

    fn with_data(
        command: &str,
        error_class: Option<&str>,
        message: String,
        exit_code: u8,
        data: impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(
                    command,
                    "serialization",
                    format!("failed to serialize command output: {error}"),
                    EXIT_EXECUTION,
                );
            }
        };
        let status = if error_class.is_some() { "error" } else { "ok" };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: status.to_string(),
            error_class: error_class.map(str::to_string),
            message,
            data: Some(data),
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })
}

pub(crate) fn build_runtime(command: &str) -> Result<Runtime, CommandResult> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        CommandResult::failure(
            command,
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            EXIT_RUNTIME,
        )
    })
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::CommandResult;

    #[test]
    fn failure_payload_carries_class_and_exit_code() {
        let result = CommandResult::failure("seed", "db_connectivity", "refused", 4);
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(result.exit_code, 4);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "db_connectivity");
        assert!(payload.get("data").is_none());
    }

    #[test]
    fn success_with_data_embeds_structured_output() {
        let result = CommandResult::success_with_data("popular", "2 products", vec![3, 1]);
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(result.exit_code, 0);
        assert_eq!(payload["data"], serde_json::json!([3, 1]));
        assert_eq!(payload["error_class"], Value::Null);
    }

    #[test]
    fn failure_with_data_keeps_exit_code_and_detail() {
        let result =
            CommandResult::failure_with_data("doctor", "catalog_schema", "missing tables", 5, ["product"]);
        let payload: Value = serde_json::from_str(&result.output).expect("json");

        assert_eq!(result.exit_code, 5);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "catalog_schema");
        assert_eq!(payload["data"], serde_json::json!(["product"]));
    }
}
