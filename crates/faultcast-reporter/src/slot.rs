//! Reporter lifecycle
//!
//! A [`ReporterSlot`] holds at most one active [`Reporter`] and replaces it
//! wholesale whenever settings change. Reporters are fully built before the
//! swap, so a concurrent [`ReporterSlot::send`] sees either the previous
//! instance or the new one, never a mix of the two snapshots.
//!
//! Most code should receive a `&ReporterSlot` (or an `Arc`) explicitly; the
//! [`crate::global`] module wraps one slot for call sites that cannot.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use faultcast_core::{project, Report, Settings};
use tracing::{debug, info, warn};

use crate::error::ReporterError;
use crate::hooks::Hooks;
use crate::reporter::{Credentials, Reporter, ReporterConfig};
use crate::sink::{HttpSink, ReportSink};

/// Builds the sink a new reporter submits to.
pub type SinkFactory =
    Arc<dyn Fn(&Credentials) -> Result<Arc<dyn ReportSink>, ReporterError> + Send + Sync>;

fn http_sink(credentials: &Credentials) -> Result<Arc<dyn ReportSink>, ReporterError> {
    Ok(Arc::new(HttpSink::new(credentials)?))
}

/// Outcome of [`ReporterSlot::reconfigure`]. Safe to ignore.
#[derive(Debug)]
pub enum Reconfigured {
    /// A new reporter replaced the previous one (if any).
    Installed,
    /// Host or token was empty; the active reporter was left untouched.
    Unconfigured,
    /// The new reporter could not be built; the active one was left untouched.
    Failed(ReporterError),
}

impl Reconfigured {
    pub fn is_installed(&self) -> bool {
        matches!(self, Reconfigured::Installed)
    }
}

/// Holder of the single active reporter.
pub struct ReporterSlot {
    active: RwLock<Option<Arc<Reporter>>>,
    hooks: Hooks,
    sink_factory: SinkFactory,
}

impl std::fmt::Debug for ReporterSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReporterSlot")
            .field("active", &self.current())
            .finish_non_exhaustive()
    }
}

impl Default for ReporterSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ReporterSlot {
    /// An empty slot whose reporters post over HTTP and trace both hooks.
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
            hooks: Hooks::tracing(),
            sink_factory: Arc::new(http_sink),
        }
    }

    /// Use `hooks` for every reporter built from now on.
    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Use `factory` to build the sink of every reporter built from now on.
    pub fn with_sink_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Credentials) -> Result<Arc<dyn ReportSink>, ReporterError> + Send + Sync + 'static,
    {
        self.sink_factory = Arc::new(factory);
        self
    }

    /// Hand `report` to the active reporter.
    ///
    /// A silent no-op when nothing is configured. Never blocks on delivery
    /// and never reports a failure to the caller.
    pub fn send(&self, report: Report) {
        match self.current() {
            Some(reporter) => reporter.send(report),
            None => debug!(report = %report.summary(), "No reporter configured; dropping report"),
        }
    }

    /// Rebuild the active reporter from `settings`.
    ///
    /// Incomplete settings (empty host or token) never replace a working
    /// reporter. Neither does a reporter that fails to build.
    pub fn reconfigure(&self, settings: &Settings) -> Reconfigured {
        if !settings.is_reporting_configured() {
            debug!("Reporter settings incomplete; keeping current reporter");
            return Reconfigured::Unconfigured;
        }

        let config = ReporterConfig {
            credentials: Credentials::new(&settings.remote_host, &settings.remote_token),
            attributes: project(settings),
            storage_path: settings.remote_storage_path.clone(),
            site_limiting: settings.remote_site_limiting,
        };

        let built = (self.sink_factory)(&config.credentials)
            .and_then(|sink| Reporter::start(config, self.hooks.clone(), sink));

        match built {
            Ok(reporter) => {
                let previous = self.replace(Some(Arc::new(reporter)));
                info!(replaced = previous.is_some(), "Reporter installed");
                Reconfigured::Installed
            }
            Err(e) => {
                warn!(error = %e, "Failed to build reporter; keeping current reporter");
                Reconfigured::Failed(e)
            }
        }
    }

    /// The active reporter, if any.
    pub fn current(&self) -> Option<Arc<Reporter>> {
        self.active
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_configured(&self) -> bool {
        self.current().is_some()
    }

    /// Wait for the active reporter's queue to drain.
    ///
    /// Returns `true` immediately when nothing is configured.
    pub fn flush(&self, timeout: Duration) -> bool {
        match self.current() {
            Some(reporter) => reporter.flush(timeout),
            None => true,
        }
    }

    /// Uninstall the active reporter and return it.
    pub fn clear(&self) -> Option<Arc<Reporter>> {
        self.replace(None)
    }

    fn replace(&self, next: Option<Arc<Reporter>>) -> Option<Arc<Reporter>> {
        let mut active = self.active.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *active, next)
    }
}
