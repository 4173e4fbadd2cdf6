//! Integration tests for faultcast-reporter
//!
//! Uses wiremock to stand in for the report collection endpoint and drives
//! reporters through `ReporterSlot` and the global façade.

mod common;

mod test_delivery;
mod test_global;
