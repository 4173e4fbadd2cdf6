//! Send command - Push a test report through the process-wide reporter
//!
//! Loads the settings file, reconfigures the global reporter from it, sends
//! one report and waits for the sender to finish with it. The hooks log the
//! server's answer (or its absence) at `info`/`warn`; run with `-v` to see
//! them.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use faultcast_core::{validate_endpoint_uri, Report};
use faultcast_reporter::Reconfigured;
use tracing::info;

use crate::commands::load_settings;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct SendCommand {
    /// Report text
    pub message: String,

    /// Send as an error report of this type instead of a plain message
    #[arg(long)]
    pub error_type: Option<String>,

    /// Extra annotation, as key=value (repeatable)
    #[arg(short, long = "annotate", value_parser = parse_annotation)]
    pub annotations: Vec<(String, String)>,

    /// Seconds to wait for delivery
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,
}

impl SendCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let formatter = get_formatter(format);
        let settings = load_settings(config_path)?;

        // Storage may already hold reports waiting to go out; only the
        // endpoint is checked here.
        if !settings.remote_host.is_empty() {
            validate_endpoint_uri(&settings.remote_host).context("Settings failed validation")?;
        }

        match faultcast_reporter::reconfigure(&settings) {
            Reconfigured::Installed => {}
            Reconfigured::Unconfigured => {
                bail!("Reporting is not configured: set remote_host and remote_token in {}", config_path.display())
            }
            Reconfigured::Failed(e) => return Err(e).context("Failed to start reporter"),
        }

        let mut report = match &self.error_type {
            Some(error_type) => Report::error(error_type.as_str(), self.message.as_str()),
            None => Report::message(self.message.as_str()),
        };
        for (name, value) in &self.annotations {
            report = report.with_annotation(name.as_str(), value.as_str());
        }
        let id = report.id.clone();

        info!(report_id = %id, "Sending report");
        faultcast_reporter::send(report);

        let timeout = Duration::from_secs(self.timeout);
        let drained = tokio::task::spawn_blocking(move || faultcast_reporter::flush(timeout))
            .await
            .context("Flush task failed")?;

        if format.is_json() {
            formatter.print_json(&serde_json::json!({
                "report_id": id,
                "host": settings.remote_host,
                "completed": drained,
            }));
        } else if drained {
            formatter.success(&format!("Report {id} handed to {}", settings.remote_host));
        } else {
            formatter.failure(&format!("Timed out after {}s waiting for report {id}", self.timeout));
        }

        Ok(())
    }
}

fn parse_annotation(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use faultcast_reporter::ReportDatabase;

    use super::*;

    #[test]
    fn test_parse_annotation() {
        assert_eq!(
            parse_annotation("screen=1920x1080").unwrap(),
            ("screen".to_string(), "1920x1080".to_string())
        );
        assert_eq!(
            parse_annotation("query=a=b").unwrap(),
            ("query".to_string(), "a=b".to_string())
        );
        assert!(parse_annotation("no-equals").is_err());
        assert!(parse_annotation("=value").is_err());
    }

    #[tokio::test]
    async fn test_send_with_reports_already_stored() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("db");
        let database = ReportDatabase::new(&storage);
        database.save(&Report::message("buffered earlier")).unwrap();

        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let host = format!("http://{}", closed.local_addr().unwrap());
        drop(closed);

        let config_path = dir.path().join("settings.yaml");
        std::fs::write(
            &config_path,
            format!(
                "remote_host: {host}\nremote_token: t\nremote_storage_path: {}\n",
                storage.display()
            ),
        )
        .unwrap();

        let cmd = SendCommand {
            message: "hello".to_string(),
            error_type: None,
            annotations: Vec::new(),
            timeout: 10,
        };
        cmd.execute(OutputFormat::Json, &config_path).await.unwrap();

        // Still unreachable: the earlier report stays and the new one joins it.
        assert_eq!(database.list().unwrap().len(), 2);
        faultcast_reporter::global().clear();
    }

    #[test]
    fn test_malformed_host_is_rejected() {
        let err = validate_endpoint_uri("not a uri::bad")
            .context("Settings failed validation")
            .unwrap_err();
        assert!(err.to_string().contains("Settings failed validation"));
    }

    #[tokio::test]
    async fn test_unconfigured_settings_refuse_to_send() {
        let dir = tempfile::tempdir().unwrap();
        let cmd = SendCommand {
            message: "hello".to_string(),
            error_type: None,
            annotations: Vec::new(),
            timeout: 1,
        };

        let err = cmd
            .execute(OutputFormat::Json, &dir.path().join("settings.yaml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }
}
