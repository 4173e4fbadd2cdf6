//! Delivery through a `ReporterSlot` against a mock collector.

use faultcast_core::Report;
use faultcast_reporter::{DeliveryError, ReportDatabase, ReporterSlot};

use crate::common;

#[tokio::test(flavor = "multi_thread")]
async fn test_report_is_posted_with_attributes() {
    let server = common::start_collector(200).await;
    let (hooks, log) = common::recording_hooks();
    let slot = ReporterSlot::new().with_hooks(hooks);

    assert!(slot.reconfigure(&common::settings_for(&server.uri())).is_installed());
    slot.send(Report::message("sensor offline").with_annotation("sensor", "gpu0"));
    assert!(slot.flush(common::FLUSH_TIMEOUT));

    let payloads = common::received_payloads(&server).await;
    assert_eq!(payloads.len(), 1);
    let payload = &payloads[0];
    assert_eq!(payload["report"]["kind"]["type"], "message");
    assert_eq!(payload["report"]["kind"]["text"], "sensor offline");
    assert_eq!(payload["report"]["annotations"]["sensor"], "gpu0");
    assert_eq!(payload["attributes"]["user_name"], "alice");
    assert_eq!(payload["attributes"]["dock_edge"], "right");
    assert!(payload["os_info"]["os"].is_string());

    let attributes = payload["attributes"].as_object().unwrap();
    assert!(attributes.keys().all(|k| !k.starts_with("remote")));

    let answers = log.answers.lock().unwrap();
    assert_eq!(answers.len(), 1);
    assert!(answers[0].is_success());
    assert_eq!(answers[0].body["_rxid"], "0000-test");
    assert!(log.failures.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_status_is_an_answer() {
    let server = common::start_collector(503).await;
    let (hooks, log) = common::recording_hooks();
    let slot = ReporterSlot::new().with_hooks(hooks);

    slot.reconfigure(&common::settings_for(&server.uri()));
    slot.send(Report::error("IOError", "disk full"));
    assert!(slot.flush(common::FLUSH_TIMEOUT));

    let answers = log.answers.lock().unwrap();
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].status, 503);
    assert!(log.failures.lock().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_endpoint_is_reported_and_stored() {
    let dir = tempfile::tempdir().unwrap();
    let (hooks, log) = common::recording_hooks();
    let slot = ReporterSlot::new().with_hooks(hooks);

    // Bind then drop a listener so the port is known to be closed.
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let host = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    let mut settings = common::settings_for(&host);
    settings.remote_storage_path = Some(dir.path().to_path_buf());
    slot.reconfigure(&settings);

    slot.send(Report::message("nobody home"));
    assert!(slot.flush(common::FLUSH_TIMEOUT));

    let failures = log.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    assert!(matches!(failures[0], DeliveryError::Unavailable(_)));
    assert!(log.answers.lock().unwrap().is_empty());

    let database = ReportDatabase::new(dir.path());
    assert_eq!(database.list().unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unavailable_error_does_not_carry_token() {
    let (hooks, log) = common::recording_hooks();
    let slot = ReporterSlot::new().with_hooks(hooks);

    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let host = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);

    slot.reconfigure(&common::settings_for(&host));
    slot.send(Report::message("nobody home"));
    assert!(slot.flush(common::FLUSH_TIMEOUT));

    let failures = log.failures.lock().unwrap();
    assert_eq!(failures.len(), 1);
    let text = failures[0].to_string();
    assert!(!text.contains(common::TOKEN), "token leaked into {text:?}");
    assert!(!text.contains("token="), "query leaked into {text:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stored_reports_are_resubmitted_on_reconfigure() {
    let dir = tempfile::tempdir().unwrap();
    let database = ReportDatabase::new(dir.path());
    let stored = Report::message("left over from last run");
    database.save(&stored).unwrap();

    let server = common::start_collector(200).await;
    let slot = ReporterSlot::new();
    let mut settings = common::settings_for(&server.uri());
    settings.remote_storage_path = Some(dir.path().to_path_buf());
    slot.reconfigure(&settings);
    assert!(slot.flush(common::FLUSH_TIMEOUT));

    let payloads = common::received_payloads(&server).await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["report"]["id"], stored.id.as_str());
    assert!(database.list().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reconfigure_switches_endpoint() {
    let first = common::start_collector(200).await;
    let second = common::start_collector(200).await;
    let slot = ReporterSlot::new();

    slot.reconfigure(&common::settings_for(&first.uri()));
    slot.send(Report::message("to first"));
    assert!(slot.flush(common::FLUSH_TIMEOUT));

    slot.reconfigure(&common::settings_for(&second.uri()));
    slot.send(Report::message("to second"));
    assert!(slot.flush(common::FLUSH_TIMEOUT));

    assert_eq!(common::received_payloads(&first).await.len(), 1);
    let to_second = common::received_payloads(&second).await;
    assert_eq!(to_second.len(), 1);
    assert_eq!(to_second[0]["report"]["kind"]["text"], "to second");
}
