//! Report model
//!
//! A report is either a captured error (with its `source()` chain), a
//! free-form diagnostic message, or a panic. The reporter treats it as an
//! opaque value and only adds the attribute set on submission.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::attributes::AttributeValue;

/// What a report describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReportKind {
    Error {
        error_type: String,
        message: String,
        chain: Vec<String>,
    },
    Message {
        text: String,
    },
    Panic {
        message: String,
        location: String,
        backtrace: String,
    },
}

/// A single report handed to the reporter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub timestamp: String,
    pub version: String,
    pub kind: ReportKind,
    /// Per-report context, in addition to the reporter-wide attributes.
    #[serde(default)]
    pub annotations: BTreeMap<String, AttributeValue>,
}

impl Report {
    fn with_kind(kind: ReportKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            kind,
            annotations: BTreeMap::new(),
        }
    }

    /// Create a report for a free-form diagnostic message.
    pub fn message(text: impl Into<String>) -> Self {
        Self::with_kind(ReportKind::Message { text: text.into() })
    }

    /// Create an error report from its parts.
    pub fn error(error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(ReportKind::Error {
            error_type: error_type.into(),
            message: message.into(),
            chain: Vec::new(),
        })
    }

    /// Capture an error value, walking its `source()` chain.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut chain = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            chain.push(format!("caused by: {cause}"));
            source = cause.source();
        }

        Self::with_kind(ReportKind::Error {
            error_type: short_type_name::<E>(),
            message: err.to_string(),
            chain,
        })
    }

    /// Create a report describing a panic.
    pub fn panic(message: &str, location: &str, backtrace: &str) -> Self {
        Self::with_kind(ReportKind::Panic {
            message: message.to_string(),
            location: location.to_string(),
            backtrace: backtrace.to_string(),
        })
    }

    /// Replace the error chain. No effect on message or panic reports.
    pub fn with_chain(mut self, new_chain: Vec<String>) -> Self {
        if let ReportKind::Error { chain, .. } = &mut self.kind {
            *chain = new_chain;
        }
        self
    }

    pub fn with_annotation(mut self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.annotations.insert(name.into(), value.into());
        self
    }

    /// One-line summary used in trace output.
    pub fn summary(&self) -> String {
        match &self.kind {
            ReportKind::Error { error_type, message, .. } => format!("{error_type}: {message}"),
            ReportKind::Message { text } => text.clone(),
            ReportKind::Panic { message, .. } => format!("panic: {message}"),
        }
    }
}

/// Last path segment of a type name, generics stripped.
fn short_type_name<E: ?Sized>() -> String {
    let full = std::any::type_name::<E>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}

#[cfg(test)]
mod tests {
    use std::fmt;

    use super::*;

    #[derive(Debug)]
    struct Outer(Inner);

    #[derive(Debug)]
    struct Inner;

    impl fmt::Display for Outer {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "sensor read failed")
        }
    }

    impl fmt::Display for Inner {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "permission denied")
        }
    }

    impl std::error::Error for Outer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    impl std::error::Error for Inner {}

    #[test]
    fn test_message_report_creation() {
        let report = Report::message("sensor timeout");
        assert!(!report.id.is_empty());
        assert_eq!(report.kind, ReportKind::Message { text: "sensor timeout".into() });
        assert_eq!(report.summary(), "sensor timeout");
    }

    #[test]
    fn test_from_error_walks_source_chain() {
        let report = Report::from_error(&Outer(Inner));
        match &report.kind {
            ReportKind::Error { error_type, message, chain } => {
                assert_eq!(error_type, "Outer");
                assert_eq!(message, "sensor read failed");
                assert_eq!(chain, &vec!["caused by: permission denied".to_string()]);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_error_report_with_chain() {
        let report = Report::error("IOError", "read failed")
            .with_chain(vec!["caused by: disk full".to_string()]);
        assert!(matches!(report.kind, ReportKind::Error { ref chain, .. } if chain.len() == 1));
    }

    #[test]
    fn test_annotations_serialize_alongside_kind() {
        let report = Report::message("hello").with_annotation("window", "main");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"]["type"], "message");
        assert_eq!(json["annotations"]["window"], "main");

        let back: Report = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
