//! Faultcast Reporter - process-wide report delivery
//!
//! Provides:
//! - `ReporterSlot`: holds the single active `Reporter` and rebuilds it when
//!   settings change
//! - `send` / `reconfigure` / `flush`: the global façade over one slot
//! - `Reporter`: an immutable sender bound to one settings snapshot, with its
//!   own background thread
//! - `ReportSink` / `HttpSink`: where payloads go
//! - `ReportDatabase`: local buffer for reports the endpoint could not take
//! - `SiteLimiter`: client-side reports-per-minute budget
//! - `install_panic_reporter`: turns panics into reports

pub mod database;
pub mod error;
pub mod global;
pub mod hooks;
pub mod panic_hook;
pub mod reporter;
pub mod sink;
pub mod site_limit;
pub mod slot;

pub use database::{ClaimedReport, ReportDatabase, ReportEntry};
pub use error::{DeliveryError, ReporterError};
pub use global::{flush, global, reconfigure, send};
pub use hooks::Hooks;
pub use panic_hook::install_panic_reporter;
pub use reporter::{Credentials, Reporter, ReporterConfig};
pub use sink::{HttpSink, OsInfo, ReportPayload, ReportSink, ServerResponse};
pub use site_limit::SiteLimiter;
pub use slot::{Reconfigured, ReporterSlot, SinkFactory};
