//! Application settings snapshot
//!
//! The reporter reads a handful of `remote_*` fields to decide where and how
//! to send reports; every other field is application state that is copied
//! into the report attributes. The snapshot maps to a YAML file and can also
//! be assembled in code through [`SettingsBuilder`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::attributes::{AttributeValue, SettingsFields};
use crate::error::SettingsError;

/// Client-side limit on how many reports the backend may receive.
///
/// Opaque to the reporter lifecycle: it is forwarded unchanged to the sender.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLimiting {
    /// Maximum reports per minute. `0` disables limiting.
    pub reports_per_minute: u32,
}

impl SiteLimiting {
    pub fn per_minute(reports_per_minute: u32) -> Self {
        Self { reports_per_minute }
    }

    pub fn is_unlimited(&self) -> bool {
        self.reports_per_minute == 0
    }
}

/// A read-only view of the application settings at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URI of the report collection endpoint.
    pub remote_host: String,
    /// Submission token for the endpoint.
    pub remote_token: String,
    /// Directory where undeliverable reports are buffered.
    pub remote_storage_path: Option<PathBuf>,
    pub remote_site_limiting: SiteLimiting,

    pub app_name: String,
    pub user_name: Option<String>,
    pub ui_scale: f64,
    pub run_at_startup: bool,
    pub check_for_updates: bool,
    /// Sensor polling interval in milliseconds.
    pub polling_interval_ms: u64,

    /// Any other application state found in the settings file.
    #[serde(flatten)]
    pub extra: BTreeMap<String, AttributeValue>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote_host: String::new(),
            remote_token: String::new(),
            remote_storage_path: None,
            remote_site_limiting: SiteLimiting::default(),
            app_name: "faultcast".to_string(),
            user_name: None,
            ui_scale: 1.0,
            run_at_startup: false,
            check_for_updates: true,
            polling_interval_ms: 1000,
            extra: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file at `path`.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Try to load from `path`; fall back to [`Settings::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the settings file.
    ///
    /// Typically `$XDG_CONFIG_HOME/faultcast/settings.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("faultcast")
            .join("settings.yaml")
    }

    /// Both endpoint host and token are present.
    ///
    /// Anything less is the legitimate "unconfigured" state, not an error.
    pub fn is_reporting_configured(&self) -> bool {
        !self.remote_host.is_empty() && !self.remote_token.is_empty()
    }
}

impl SettingsFields for Settings {
    fn fields(&self) -> Vec<(String, AttributeValue)> {
        let storage = self
            .remote_storage_path
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned());

        let mut fields = vec![
            ("remote_host".to_string(), self.remote_host.clone().into()),
            ("remote_token".to_string(), self.remote_token.clone().into()),
            ("remote_storage_path".to_string(), storage.into()),
            (
                "remote_site_limiting".to_string(),
                self.remote_site_limiting.reports_per_minute.into(),
            ),
            ("app_name".to_string(), self.app_name.clone().into()),
            ("user_name".to_string(), self.user_name.clone().into()),
            ("ui_scale".to_string(), self.ui_scale.into()),
            ("run_at_startup".to_string(), self.run_at_startup.into()),
            ("check_for_updates".to_string(), self.check_for_updates.into()),
            ("polling_interval_ms".to_string(), self.polling_interval_ms.into()),
        ];
        fields.extend(self.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        fields
    }
}

/// Builder for constructing [`Settings`] programmatically.
///
/// Starts from [`Settings::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust
/// use faultcast_core::settings::SettingsBuilder;
///
/// let settings = SettingsBuilder::new()
///     .remote_host("https://submit.example.com")
///     .remote_token("0123abcd")
///     .field("theme", "dark")
///     .build();
/// assert!(settings.is_reporting_configured());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SettingsBuilder {
    settings: Settings,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remote_host(mut self, host: impl Into<String>) -> Self {
        self.settings.remote_host = host.into();
        self
    }

    pub fn remote_token(mut self, token: impl Into<String>) -> Self {
        self.settings.remote_token = token.into();
        self
    }

    pub fn remote_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings.remote_storage_path = Some(path.into());
        self
    }

    pub fn site_limiting(mut self, limiting: SiteLimiting) -> Self {
        self.settings.remote_site_limiting = limiting;
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.settings.app_name = name.into();
        self
    }

    pub fn user_name(mut self, name: impl Into<String>) -> Self {
        self.settings.user_name = Some(name.into());
        self
    }

    /// Add an arbitrary application field.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.settings.extra.insert(name.into(), value.into());
        self
    }

    pub fn build(self) -> Settings {
        self.settings
    }
}
