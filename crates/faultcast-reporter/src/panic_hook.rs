//! Panic reporting
//!
//! Installs a panic hook that turns every panic into a report sent through
//! the process-wide reporter, then gives the sender a short window to
//! deliver it before the previous hook runs.

use std::any::Any;
use std::time::Duration;

use faultcast_core::Report;

use crate::reporter::SENDER_THREAD_NAME;

/// How long a panicking thread waits for its report to go out.
const PANIC_FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// Installs a panic hook that reports panics through [`crate::send`].
///
/// Chains with the existing panic hook so default behavior (stderr output)
/// is preserved. Panics on a sender thread are not reported.
pub fn install_panic_reporter() {
    let previous_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("<unnamed>");

        if thread_name != SENDER_THREAD_NAME {
            let location = panic_info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_default();
            let backtrace = std::backtrace::Backtrace::force_capture().to_string();

            let report = Report::panic(&payload_message(panic_info.payload()), &location, &backtrace)
                .with_annotation("thread", thread_name);
            crate::send(report);
            crate::flush(PANIC_FLUSH_TIMEOUT);
        }

        previous_hook(panic_info);
    }));
}

/// Extract the human-readable message from a panic payload.
fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
