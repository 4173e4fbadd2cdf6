//! The process-wide façade. This is the only test in the binary that
//! installs a global reporter.

use faultcast_core::{Report, SettingsBuilder};
use faultcast_reporter::Reconfigured;

use crate::common;

#[tokio::test(flavor = "multi_thread")]
async fn test_global_send_before_and_after_configuration() {
    // Before any configuration: a silent no-op.
    faultcast_reporter::send(Report::message("too early"));
    assert!(faultcast_reporter::flush(common::FLUSH_TIMEOUT));

    let server = common::start_collector(200).await;
    assert!(faultcast_reporter::reconfigure(&common::settings_for(&server.uri())).is_installed());

    faultcast_reporter::send(Report::message("configured"));
    assert!(faultcast_reporter::flush(common::FLUSH_TIMEOUT));

    // Incomplete settings leave the working reporter in place.
    let incomplete = SettingsBuilder::new().remote_host(server.uri()).build();
    assert!(matches!(
        faultcast_reporter::reconfigure(&incomplete),
        Reconfigured::Unconfigured
    ));
    faultcast_reporter::send(Report::message("still configured"));
    assert!(faultcast_reporter::flush(common::FLUSH_TIMEOUT));

    let payloads = common::received_payloads(&server).await;
    let texts: Vec<_> = payloads
        .iter()
        .map(|p| p["report"]["kind"]["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["configured", "still configured"]);

    faultcast_reporter::global().clear();
}
