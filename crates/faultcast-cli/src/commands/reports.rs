//! Reports command - Manage reports stored for later delivery
//!
//! Reports land in the `remote_storage_path` directory when the endpoint is
//! unreachable and go out again the next time a reporter starts.
//!
//! - `list`: stored reports, oldest first
//! - `show <id>`: one report in full
//! - `delete <id>`: drop one report
//! - `purge`: drop every stored report

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use faultcast_reporter::ReportDatabase;

use crate::commands::load_settings;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Subcommand)]
pub enum ReportsCommand {
    /// List stored reports
    List,
    /// Show one stored report
    Show {
        /// Report ID (the 8-character short form is enough)
        id: String,
    },
    /// Delete one stored report
    Delete {
        /// Report ID (the 8-character short form is enough)
        id: String,
    },
    /// Delete every stored report
    Purge,
}

impl ReportsCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let settings = load_settings(config_path)?;
        let dir = settings.remote_storage_path.with_context(|| {
            format!("No remote_storage_path set in {}", config_path.display())
        })?;
        self.run(format, &ReportDatabase::new(dir))
    }

    fn run(&self, format: OutputFormat, database: &ReportDatabase) -> Result<()> {
        let formatter = get_formatter(format);

        match self {
            ReportsCommand::List => {
                let entries = database.list()?;

                if format.is_json() {
                    let json: Vec<serde_json::Value> = entries
                        .iter()
                        .map(|e| {
                            serde_json::json!({
                                "id": e.id,
                                "date": e.date,
                                "size_bytes": e.size_bytes,
                                "path": e.path.display().to_string(),
                            })
                        })
                        .collect();
                    formatter.print_json(&serde_json::json!(json));
                    return Ok(());
                }

                if entries.is_empty() {
                    formatter.info(&format!("No stored reports in {}", database.dir().display()));
                    return Ok(());
                }

                println!("{:<10} {:<10} {:>10}  {}", "ID", "Date", "Size", "Summary");
                println!("{}", "-".repeat(60));
                for entry in &entries {
                    let summary = database
                        .load(entry)
                        .map(|r| r.summary())
                        .unwrap_or_else(|_| "<unreadable>".to_string());
                    println!(
                        "{:<10} {:<10} {:>10}  {}",
                        entry.id,
                        entry.date,
                        format_size(entry.size_bytes),
                        summary,
                    );
                }
                println!();
                println!("Total: {} report(s)", entries.len());
            }

            ReportsCommand::Show { id } => match database.read(id)? {
                Some(report) => {
                    if format.is_json() {
                        formatter.print_json(&serde_json::to_value(&report)?);
                    } else {
                        formatter.success(&report.summary());
                        formatter.field("id", &report.id);
                        formatter.field("timestamp", &report.timestamp);
                        formatter.field("version", &report.version);
                        for (name, value) in &report.annotations {
                            formatter.field(name, &value.to_string());
                        }
                    }
                }
                None => formatter.failure(&format!("Report '{}' not found", id)),
            },

            ReportsCommand::Delete { id } => {
                let deleted = database.delete(id)?;
                if format.is_json() {
                    formatter.print_json(&serde_json::json!({"id": id, "deleted": deleted}));
                } else if deleted {
                    formatter.success(&format!("Deleted report '{}'", id));
                } else {
                    formatter.failure(&format!("Report '{}' not found", id));
                }
            }

            ReportsCommand::Purge => {
                let count = database.delete_all()?;
                if format.is_json() {
                    formatter.print_json(&serde_json::json!({"deleted": count}));
                } else {
                    formatter.success(&format!("Deleted {} report(s)", count));
                }
            }
        }

        Ok(())
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}
