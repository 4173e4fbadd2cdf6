//! Shared helpers: a mock collection endpoint and hooks that record calls.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use faultcast_core::{Settings, SettingsBuilder};
use faultcast_reporter::{DeliveryError, Hooks, ServerResponse};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(10);
pub const TOKEN: &str = "secret-token";

/// Everything the hooks saw, in order.
#[derive(Default)]
pub struct HookLog {
    pub answers: Mutex<Vec<ServerResponse>>,
    pub failures: Mutex<Vec<DeliveryError>>,
}

pub fn recording_hooks() -> (Hooks, Arc<HookLog>) {
    let log = Arc::new(HookLog::default());
    let (answers, failures) = (Arc::clone(&log), Arc::clone(&log));
    let hooks = Hooks::new(
        move |response| answers.answers.lock().unwrap().push(response.clone()),
        move |error| failures.failures.lock().unwrap().push(error.clone()),
    );
    (hooks, log)
}

/// Starts a collector that answers `POST /post?format=json&token=TOKEN`
/// with `status`.
pub async fn start_collector(status: u16) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/post"))
        .and(query_param("format", "json"))
        .and(query_param("token", TOKEN))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "response": if status < 300 { "ok" } else { "error" },
            "_rxid": "0000-test",
        })))
        .mount(&server)
        .await;

    server
}

/// Settings pointing at `host`, with one secret-looking extra field.
pub fn settings_for(host: &str) -> Settings {
    SettingsBuilder::new()
        .remote_host(host)
        .remote_token(TOKEN)
        .user_name("alice")
        .field("dock_edge", "right")
        .field("remote_mirror", "https://shadow.example.com")
        .build()
}

/// JSON bodies of every request the collector received.
pub async fn received_payloads(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).expect("JSON payload"))
        .collect()
}
