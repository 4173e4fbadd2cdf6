//! Process-wide reporter façade
//!
//! One [`ReporterSlot`] created on first use and shared by the whole process.
//! Application code reports from anywhere with [`send`]; the settings flow
//! calls [`reconfigure`] after its precondition checks pass. `send` is safe
//! before the first reconfigure (a no-op) and during one.

use std::sync::OnceLock;
use std::time::Duration;

use faultcast_core::{Report, Settings};

use crate::slot::{Reconfigured, ReporterSlot};

static GLOBAL: OnceLock<ReporterSlot> = OnceLock::new();

/// The process-wide slot.
pub fn global() -> &'static ReporterSlot {
    GLOBAL.get_or_init(ReporterSlot::new)
}

/// Report through the process-wide reporter. Never fails, never blocks.
pub fn send(report: Report) {
    global().send(report);
}

/// Rebuild the process-wide reporter from `settings`.
pub fn reconfigure(settings: &Settings) -> Reconfigured {
    global().reconfigure(settings)
}

/// Wait up to `timeout` for the process-wide reporter to drain.
pub fn flush(timeout: Duration) -> bool {
    global().flush(timeout)
}
