//! Subcommand implementations

use std::path::Path;

use anyhow::{Context, Result};
use faultcast_core::Settings;
use tracing::debug;

pub mod attributes;
pub mod reports;
pub mod send;
pub mod validate;

/// Load settings for commands that can work from defaults.
///
/// A missing file yields [`Settings::default`]; an unreadable or malformed
/// one is an error.
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        debug!(path = %path.display(), "Settings file not found; using defaults");
        return Ok(Settings::default());
    }
    Settings::load(path).with_context(|| format!("Failed to load settings from {}", path.display()))
}
