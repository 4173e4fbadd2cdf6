//! Attributes command - Show what every report carries
//!
//! Prints the settings projected onto the report attribute set, i.e. every
//! field except the reporter's own `remote*` infrastructure fields.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use faultcast_core::project;

use crate::commands::load_settings;
use crate::output::{get_formatter, OutputFormat};

#[derive(Debug, Args)]
pub struct AttributesCommand {}

impl AttributesCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let formatter = get_formatter(format);
        let attributes = project(&load_settings(config_path)?);

        if format.is_json() {
            let json = serde_json::to_value(&attributes).context("Failed to serialize attributes")?;
            formatter.print_json(&json);
            return Ok(());
        }

        formatter.success(&format!("{} attribute(s)", attributes.len()));
        for (name, value) in &attributes {
            formatter.field(name, &value.to_string());
        }
        Ok(())
    }
}
