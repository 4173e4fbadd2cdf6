//! Reporter instance
//!
//! A [`Reporter`] is built once from one settings snapshot and never mutated.
//! It owns a background sender: a named OS thread running a current-thread
//! tokio runtime, fed through an unbounded channel. [`Reporter::send`] only
//! pushes onto that channel, so callers never wait on network I/O.
//!
//! Dropping the last handle to a reporter closes the channel; the sender
//! finishes whatever is already queued and exits.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use faultcast_core::{AttributeSet, Report, SiteLimiting};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::database::ReportDatabase;
use crate::error::{DeliveryError, ReporterError};
use crate::hooks::Hooks;
use crate::sink::{OsInfo, ReportPayload, ReportSink};
use crate::site_limit::SiteLimiter;

/// Name given to every sender thread.
pub const SENDER_THREAD_NAME: &str = "faultcast-sender";

/// Endpoint host and submission token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub host: String,
    pub token: String,
}

impl Credentials {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Everything a reporter is built from, taken from one settings snapshot.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    pub credentials: Credentials,
    pub attributes: AttributeSet,
    pub storage_path: Option<PathBuf>,
    pub site_limiting: SiteLimiting,
}

enum Command {
    Send(Report),
    Flush(std::sync::mpsc::Sender<()>),
}

/// The live object that sends reports for one settings snapshot.
#[derive(Debug)]
pub struct Reporter {
    config: ReporterConfig,
    commands: mpsc::UnboundedSender<Command>,
}

impl Reporter {
    /// Build a reporter and start its sender thread.
    pub fn start(
        config: ReporterConfig,
        hooks: Hooks,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self, ReporterError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build();
        Self::start_on(runtime, config, hooks, sink)
    }

    /// Start the sender on an already-built runtime.
    ///
    /// Every failure happens before the reporter exists, so a caller never
    /// ends up holding a reporter whose sender is not running.
    fn start_on(
        runtime: std::io::Result<Runtime>,
        config: ReporterConfig,
        hooks: Hooks,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self, ReporterError> {
        let runtime = runtime.map_err(ReporterError::Runtime)?;
        let (commands, queue) = mpsc::unbounded_channel();

        let sender = Sender {
            sink,
            hooks,
            attributes: config.attributes.clone(),
            database: config.storage_path.clone().map(ReportDatabase::new),
            limiter: SiteLimiter::new(config.site_limiting),
            os_info: OsInfo::collect(),
        };

        std::thread::Builder::new()
            .name(SENDER_THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(sender.run(queue)))
            .map_err(ReporterError::SpawnWorker)?;

        info!(
            host = %config.credentials.host,
            attributes = config.attributes.len(),
            storage = ?config.storage_path,
            "Reporter started"
        );

        Ok(Self { config, commands })
    }

    /// Queue a report for delivery. Never blocks and never fails.
    pub fn send(&self, report: Report) {
        if self.commands.send(Command::Send(report)).is_err() {
            debug!("Report sender has stopped; dropping report");
        }
    }

    /// Wait until every report queued before this call has been handled.
    ///
    /// Blocks the calling thread for at most `timeout`. Returns `false` on
    /// timeout or if the sender is gone.
    pub fn flush(&self, timeout: Duration) -> bool {
        let (ack, done) = std::sync::mpsc::channel();
        if self.commands.send(Command::Flush(ack)).is_err() {
            return false;
        }
        done.recv_timeout(timeout).is_ok()
    }

    pub fn credentials(&self) -> &Credentials {
        &self.config.credentials
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.config.attributes
    }

    pub fn storage_path(&self) -> Option<&Path> {
        self.config.storage_path.as_deref()
    }

    pub fn site_limiting(&self) -> SiteLimiting {
        self.config.site_limiting
    }
}

/// State owned by the sender thread.
struct Sender {
    sink: Arc<dyn ReportSink>,
    hooks: Hooks,
    attributes: AttributeSet,
    database: Option<ReportDatabase>,
    limiter: Option<SiteLimiter>,
    os_info: OsInfo,
}

impl Sender {
    async fn run(self, mut queue: mpsc::UnboundedReceiver<Command>) {
        self.resubmit_stored().await;

        while let Some(command) = queue.recv().await {
            match command {
                Command::Send(report) => self.deliver(report).await,
                Command::Flush(ack) => {
                    let _ = ack.send(());
                }
            }
        }
        debug!("Report sender stopped");
    }

    async fn deliver(&self, report: Report) {
        if let Some(limiter) = &self.limiter {
            if !limiter.try_acquire() {
                debug!(report_id = %report.id, "Report dropped by site limit");
                return;
            }
        }

        if let Err(e) = self.submit(&report).await {
            if e.is_retryable() {
                self.store(&report);
            }
        }
    }

    /// Submit one report and run the matching hook.
    async fn submit(&self, report: &Report) -> Result<(), DeliveryError> {
        let payload = ReportPayload {
            report,
            attributes: &self.attributes,
            os_info: &self.os_info,
        };

        match self.sink.submit(&payload).await {
            Ok(response) => {
                self.hooks.server_answer(&response);
                Ok(())
            }
            Err(e) => {
                self.hooks.server_unavailable(&e);
                Err(e)
            }
        }
    }

    fn store(&self, report: &Report) {
        let Some(database) = &self.database else {
            return;
        };
        match database.save(report) {
            Ok(path) => debug!(path = %path.display(), "Stored undelivered report"),
            Err(e) => warn!(error = %e, "Failed to store undelivered report"),
        }
    }

    /// Give reports left over from earlier runs one more attempt.
    ///
    /// Stops at the first unreachable-endpoint failure and leaves the rest
    /// on disk.
    async fn resubmit_stored(&self) {
        let Some(database) = &self.database else {
            return;
        };
        let entries = match database.list() {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to list stored reports");
                return;
            }
        };
        if entries.is_empty() {
            return;
        }

        info!(count = entries.len(), "Resubmitting stored reports");
        for entry in entries {
            // Another sender on the same directory may have taken it already.
            let claimed = match database.claim(&entry) {
                Ok(Some(claimed)) => claimed,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "Failed to claim stored report");
                    continue;
                }
            };

            let outcome = match claimed.report() {
                Ok(report) => self.submit(&report).await,
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable stored report");
                    Err(DeliveryError::Serialize(e.to_string()))
                }
            };

            let stop = matches!(&outcome, Err(e) if e.is_retryable());
            let settled = match outcome {
                Ok(()) => claimed.complete(),
                Err(_) => claimed.release(),
            };
            if let Err(e) = settled {
                warn!(error = %e, "Failed to settle stored report");
            }
            if stop {
                break;
            }
        }
    }
}
