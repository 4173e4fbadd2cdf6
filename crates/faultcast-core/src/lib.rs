//! Faultcast Core - Settings, attributes and precondition checks
//!
//! This crate holds everything the reporter lifecycle needs that does not
//! touch the network:
//! - **Settings** - the YAML-backed configuration snapshot read on reconfigure
//! - **Attribute projection** - `project()` turns settings into the attribute
//!   set attached to every report, minus the `remote*` infrastructure fields
//! - **Report model** - `Report` built from errors, messages or panics
//! - **Precondition checks** - endpoint URI and storage directory validation,
//!   each failing with a distinct `PreconditionError` kind

pub mod attributes;
pub mod error;
pub mod report;
pub mod settings;
pub mod validation;

pub use attributes::{project, AttributeSet, AttributeValue, SettingsFields, RESERVED_PREFIX};
pub use error::{PreconditionError, SettingsError};
pub use report::{Report, ReportKind};
pub use settings::{Settings, SettingsBuilder, SiteLimiting};
pub use validation::{validate_endpoint_uri, validate_settings, validate_storage_directory};
