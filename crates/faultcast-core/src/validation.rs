//! Precondition checks run by a settings flow before reconfiguring.
//!
//! Both checks are stateless and side-effect free apart from the directory
//! listing needed to test emptiness. They never create or modify anything.

use std::path::Path;

use url::Url;

use crate::error::PreconditionError;
use crate::settings::Settings;

/// Base used only to resolve relative references during validation.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Characters permitted unescaped in a URI reference (RFC 3986).
fn is_uri_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || "-._~:/?#[]@!$&'()*+,;=%".contains(c)
}

fn check_percent_escapes(uri: &str) -> Result<(), PreconditionError> {
    let bytes = uri.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(PreconditionError::malformed(uri, "invalid percent escape"));
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    Ok(())
}

fn validate_relative(uri: &str) -> Result<(), PreconditionError> {
    let first_segment = uri.split(['/', '?', '#']).next().unwrap_or_default();
    if first_segment.contains(':') {
        return Err(PreconditionError::malformed(
            uri,
            "relative reference has a colon in its first segment",
        ));
    }

    let base = Url::parse(RELATIVE_BASE).map_err(|e| PreconditionError::malformed(uri, e.to_string()))?;
    base.join(uri)
        .map(|_| ())
        .map_err(|e| PreconditionError::malformed(uri, e.to_string()))
}

/// Check that `uri` is a well-formed absolute or relative URI reference.
///
/// An empty string is malformed. Callers that need to tell "not configured"
/// apart from "configured but invalid" must check for emptiness first.
pub fn validate_endpoint_uri(uri: &str) -> Result<(), PreconditionError> {
    if uri.is_empty() {
        return Err(PreconditionError::malformed(uri, "empty"));
    }
    if let Some(c) = uri.chars().find(|c| !is_uri_char(*c)) {
        return Err(PreconditionError::malformed(
            uri,
            format!("character {c:?} is not allowed"),
        ));
    }
    check_percent_escapes(uri)?;

    match Url::parse(uri) {
        Ok(_) => Ok(()),
        Err(url::ParseError::RelativeUrlWithoutBase) => validate_relative(uri),
        Err(e) => Err(PreconditionError::malformed(uri, e.to_string())),
    }
}

/// Check that `path` is an existing directory with no entries.
pub fn validate_storage_directory(path: impl AsRef<Path>) -> Result<(), PreconditionError> {
    let path = path.as_ref();
    let unreadable = |e: std::io::Error| PreconditionError::StorageUnreadable {
        path: path.to_path_buf(),
        message: e.to_string(),
    };

    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return Err(PreconditionError::StorageNotFound(path.to_path_buf())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(PreconditionError::StorageNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(unreadable(e)),
    }

    let mut entries = std::fs::read_dir(path).map_err(unreadable)?;
    match entries.next() {
        None => Ok(()),
        Some(Ok(_)) => Err(PreconditionError::StorageNotEmpty(path.to_path_buf())),
        Some(Err(e)) => Err(unreadable(e)),
    }
}

/// Run every precondition that applies to `settings` and collect failures.
///
/// Unconfigured settings (missing host or token) have nothing to check.
/// The storage check only runs when a storage path is set.
pub fn validate_settings(settings: &Settings) -> Vec<PreconditionError> {
    let mut errors = Vec::new();
    if !settings.is_reporting_configured() {
        return errors;
    }

    if let Err(e) = validate_endpoint_uri(&settings.remote_host) {
        errors.push(e);
    }
    if let Some(path) = &settings.remote_storage_path {
        if let Err(e) = validate_storage_directory(path) {
            errors.push(e);
        }
    }
    errors
}
