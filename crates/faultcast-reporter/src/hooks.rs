//! Delivery notification hooks
//!
//! Every reporter is built with two hooks: one for any answer from the
//! endpoint, one for failing to reach it. They run on the reporter's sender
//! thread. A hook that panics is logged and ignored so it cannot take the
//! sender down with it.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::DeliveryError;
use crate::sink::ServerResponse;

pub type AnswerHook = Arc<dyn Fn(&ServerResponse) + Send + Sync>;
pub type UnavailableHook = Arc<dyn Fn(&DeliveryError) + Send + Sync>;

/// The pair of hooks wired onto a reporter at construction.
#[derive(Clone)]
pub struct Hooks {
    on_server_answer: AnswerHook,
    on_server_unavailable: UnavailableHook,
}

impl std::fmt::Debug for Hooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hooks").finish_non_exhaustive()
    }
}

impl Default for Hooks {
    fn default() -> Self {
        Self::tracing()
    }
}

impl Hooks {
    pub fn new<A, U>(on_server_answer: A, on_server_unavailable: U) -> Self
    where
        A: Fn(&ServerResponse) + Send + Sync + 'static,
        U: Fn(&DeliveryError) + Send + Sync + 'static,
    {
        Self {
            on_server_answer: Arc::new(on_server_answer),
            on_server_unavailable: Arc::new(on_server_unavailable),
        }
    }

    /// Hooks that only write trace lines.
    pub fn tracing() -> Self {
        Self::new(
            |response| {
                if response.is_success() {
                    debug!(status = response.status, body = %response.body, "Report accepted");
                } else {
                    warn!(status = response.status, body = %response.body, "Report rejected by server");
                }
            },
            |error| warn!(error = %error, "Report server unavailable"),
        )
    }

    pub(crate) fn server_answer(&self, response: &ServerResponse) {
        guarded("on_server_answer", || (self.on_server_answer)(response));
    }

    pub(crate) fn server_unavailable(&self, error: &DeliveryError) {
        guarded("on_server_unavailable", || (self.on_server_unavailable)(error));
    }
}

fn guarded(hook: &str, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        warn!(hook, "Reporter hook panicked; ignoring");
    }
}
