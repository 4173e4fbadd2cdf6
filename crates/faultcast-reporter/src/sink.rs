//! Report sinks
//!
//! A [`ReportSink`] is the boundary between a reporter and the collection
//! endpoint. [`HttpSink`] posts JSON payloads to
//! `{host}/post?format=json&token={token}`; tests substitute in-memory sinks.

use std::time::Duration;

use async_trait::async_trait;
use faultcast_core::{AttributeSet, Report};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{DeliveryError, ReporterError};
use crate::reporter::Credentials;

/// Per-request timeout for report submission.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(15);

/// Non-identifying operating system information. Never includes hostname or
/// username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsInfo {
    pub os: String,
    pub kernel: String,
    pub desktop: String,
    pub arch: String,
}

impl OsInfo {
    pub fn collect() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            kernel: std::fs::read_to_string("/proc/sys/kernel/osrelease")
                .map(|s| s.trim().to_string())
                .unwrap_or_default(),
            desktop: std::env::var("XDG_CURRENT_DESKTOP").unwrap_or_default(),
            arch: std::env::consts::ARCH.to_string(),
        }
    }
}

/// What actually goes over the wire for one report.
#[derive(Debug, Serialize)]
pub struct ReportPayload<'a> {
    pub report: &'a Report,
    pub attributes: &'a AttributeSet,
    pub os_info: &'a OsInfo,
}

/// The endpoint's answer to a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    pub status: u16,
    /// Parsed JSON body, or the raw text as a string value.
    pub body: Value,
}

impl ServerResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl std::fmt::Display for ServerResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {} {}", self.status, self.body)
    }
}

/// Destination for report payloads.
///
/// Any response from the endpoint, including an HTTP error status, is an
/// answer. `Err` is reserved for failing to reach the endpoint at all.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn submit(&self, payload: &ReportPayload<'_>) -> Result<ServerResponse, DeliveryError>;
}

/// Posts payloads as JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: Client,
    submit_url: Url,
}

impl HttpSink {
    pub fn new(credentials: &Credentials) -> Result<Self, ReporterError> {
        let client = Client::builder()
            .timeout(SUBMIT_TIMEOUT)
            .user_agent(concat!("faultcast/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ReporterError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            submit_url: submit_url(credentials)?,
        })
    }

    /// Fully-qualified submission URL, token included.
    pub fn submit_url(&self) -> &Url {
        &self.submit_url
    }
}

/// Build `{host}/post?format=json&token={token}`.
///
/// The host must be absolute; relative references pass URI validation but
/// cannot be submitted to.
fn submit_url(credentials: &Credentials) -> Result<Url, ReporterError> {
    let invalid = |reason: String| ReporterError::InvalidHost {
        host: credentials.host.clone(),
        reason,
    };

    let mut url = Url::parse(&credentials.host).map_err(|e| invalid(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| invalid("cannot be a base URL".to_string()))?
        .pop_if_empty()
        .push("post");
    url.query_pairs_mut()
        .append_pair("format", "json")
        .append_pair("token", &credentials.token);
    Ok(url)
}

#[async_trait]
impl ReportSink for HttpSink {
    async fn submit(&self, payload: &ReportPayload<'_>) -> Result<ServerResponse, DeliveryError> {
        debug!(report_id = %payload.report.id, "Submitting report");

        let response = self
            .client
            .post(self.submit_url.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                // The submit URL carries the token; keep it out of the message.
                let builder = e.is_builder();
                let message = e.without_url().to_string();
                if builder {
                    DeliveryError::Serialize(message)
                } else {
                    DeliveryError::Unavailable(message)
                }
            })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| DeliveryError::Unavailable(e.without_url().to_string()))?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        Ok(ServerResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(host: &str) -> Credentials {
        Credentials::new(host, "tok en")
    }

    #[test]
    fn test_submit_url_appends_post_and_query() {
        let sink = HttpSink::new(&credentials("https://submit.example.com:6098")).unwrap();
        assert_eq!(
            sink.submit_url().as_str(),
            "https://submit.example.com:6098/post?format=json&token=tok+en"
        );
    }

    #[test]
    fn test_submit_url_keeps_base_path() {
        let sink = HttpSink::new(&credentials("http://localhost:8080/api/")).unwrap();
        assert_eq!(sink.submit_url().path(), "/api/post");
    }

    #[test]
    fn test_relative_host_is_rejected() {
        let err = HttpSink::new(&credentials("api/post")).unwrap_err();
        assert!(matches!(err, ReporterError::InvalidHost { .. }));
    }

    #[test]
    fn test_server_response_success_range() {
        let ok = ServerResponse { status: 200, body: Value::Null };
        let bad = ServerResponse { status: 503, body: Value::Null };
        assert!(ok.is_success());
        assert!(!bad.is_success());
        assert_eq!(bad.to_string(), "HTTP 503 null");
    }

    #[test]
    fn test_payload_serializes_all_sections() {
        let report = Report::message("hello");
        let attributes = AttributeSet::default();
        let os_info = OsInfo::collect();
        let payload = ReportPayload {
            report: &report,
            attributes: &attributes,
            os_info: &os_info,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["report"]["id"], report.id.as_str());
        assert!(json["attributes"].is_object());
        assert_eq!(json["os_info"]["os"], std::env::consts::OS);
    }
}
