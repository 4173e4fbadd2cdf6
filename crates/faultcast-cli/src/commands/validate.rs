//! Validate commands - Check reporter preconditions
//!
//! `validate` checks the whole settings file; `validate-endpoint` and
//! `validate-storage` check a single value, the same way the settings flow
//! does before it reconfigures the reporter.

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;
use faultcast_core::{
    validate_endpoint_uri, validate_settings, validate_storage_directory, PreconditionError,
    Settings,
};
use tracing::info;

use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct ValidateCommand {}

impl ValidateCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let formatter = get_formatter(format);

        let settings = match Settings::load(config_path) {
            Ok(settings) => settings,
            Err(e) => {
                if format.is_json() {
                    formatter.print_json(&serde_json::json!({
                        "valid": false,
                        "config_path": config_path.display().to_string(),
                        "errors": [e.to_string()],
                    }));
                } else {
                    formatter.failure(&e.to_string());
                }
                return Ok(());
            }
        };

        info!(config_path = %config_path.display(), "Validating reporter settings");

        let errors = validate_settings(&settings);
        let configured = settings.is_reporting_configured();

        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "valid": errors.is_empty(),
                "reporting_configured": configured,
                "config_path": config_path.display().to_string(),
                "errors": errors.iter().map(error_json).collect::<Vec<_>>(),
            }));
            return Ok(());
        }

        formatter.field("File", &config_path.display().to_string());
        if !configured {
            formatter.info("Reporting is off: remote_host or remote_token is empty");
        }
        if errors.is_empty() {
            formatter.success("Settings are valid");
        } else {
            formatter.failure(&format!(
                "Settings have {} error{}:",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
            ));
            for error in &errors {
                formatter.info(&format!("{:<20} {}", error.kind(), error));
            }
        }

        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ValidateEndpointCommand {
    /// Endpoint URI, absolute or relative
    pub uri: String,
}

impl ValidateEndpointCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        report_outcome(format, &self.uri, validate_endpoint_uri(&self.uri));
        Ok(())
    }
}

#[derive(Debug, Args)]
pub struct ValidateStorageCommand {
    /// Directory that will hold reports awaiting delivery
    pub path: PathBuf,
}

impl ValidateStorageCommand {
    pub async fn execute(&self, format: OutputFormat) -> Result<()> {
        let subject = self.path.display().to_string();
        report_outcome(format, &subject, validate_storage_directory(&self.path));
        Ok(())
    }
}

fn report_outcome(format: OutputFormat, subject: &str, outcome: Result<(), PreconditionError>) {
    let formatter = get_formatter(format);

    if format.is_json() {
        let error = outcome.as_ref().err().map(error_json);
        formatter.print_json(&serde_json::json!({
            "subject": subject,
            "valid": outcome.is_ok(),
            "error": error,
        }));
        return;
    }

    match outcome {
        Ok(()) => formatter.success(&format!("{subject} is valid")),
        Err(e) => formatter.failure(&e.to_string()),
    }
}

fn error_json(error: &PreconditionError) -> serde_json::Value {
    serde_json::json!({
        "kind": error.kind(),
        "message": error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_json_carries_kind() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("leftover"), b"x").unwrap();

        let err = validate_storage_directory(dir.path()).unwrap_err();
        let json = error_json(&err);
        assert_eq!(json["kind"], "storage_not_empty");
        assert!(json["message"].as_str().unwrap().contains("not empty"));
    }
}
