//! Local report database
//!
//! Reports the endpoint could not take are written as JSON files into the
//! configured storage directory, named `report-{yyyymmdd}-{id8}.json`, and
//! resubmitted the next time a reporter starts.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use faultcast_core::Report;

const CLAIMED_EXTENSION: &str = "sending";

/// One stored report file.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub id: String,
    pub date: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

/// File-backed buffer of undelivered reports.
#[derive(Debug, Clone)]
pub struct ReportDatabase {
    dir: PathBuf,
}

impl ReportDatabase {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Persist a report. Creates the directory if needed.
    pub fn save(&self, report: &Report) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;

        let date = Utc::now().format("%Y%m%d");
        let short_id: String = report.id.chars().take(8).collect();
        let path = self.dir.join(format!("report-{date}-{short_id}.json"));

        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// List stored reports, oldest first.
    pub fn list(&self) -> anyhow::Result<Vec<ReportEntry>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if !path.extension().is_some_and(|e| e == "json") {
                continue;
            }

            let stem = path
                .file_stem()
                .unwrap_or_default()
                .to_string_lossy()
                .to_string();
            let Some((date, id)) = parse_report_filename(&stem) else {
                continue;
            };

            entries.push(ReportEntry {
                id,
                date,
                size_bytes: entry.metadata()?.len(),
                path,
            });
        }

        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        Ok(entries)
    }

    /// Load the report stored at `entry`.
    pub fn load(&self, entry: &ReportEntry) -> anyhow::Result<Report> {
        let content = std::fs::read_to_string(&entry.path)
            .with_context(|| format!("Failed to read {}", entry.path.display()))?;
        let report = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt report file {}", entry.path.display()))?;
        Ok(report)
    }

    /// Read a report by its full ID, its 8-character short ID, or any
    /// shorter prefix. The oldest match wins when a prefix is ambiguous.
    pub fn read(&self, id: &str) -> anyhow::Result<Option<Report>> {
        match self.find(id)? {
            Some(entry) => self.load(&entry).map(Some),
            None => Ok(None),
        }
    }

    /// Delete a report by ID. Returns whether anything was removed.
    pub fn delete(&self, id: &str) -> anyhow::Result<bool> {
        match self.find(id)? {
            Some(entry) => {
                std::fs::remove_file(&entry.path)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Delete every stored report. Returns how many were removed.
    pub fn delete_all(&self) -> anyhow::Result<u32> {
        let mut count = 0;
        for entry in self.list()? {
            if std::fs::remove_file(&entry.path).is_ok() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Take exclusive ownership of a stored report for resubmission.
    ///
    /// The file is renamed out of the listing. Returns `None` when another
    /// sender claimed it first.
    pub fn claim(&self, entry: &ReportEntry) -> anyhow::Result<Option<ClaimedReport>> {
        let claimed = entry.path.with_extension(CLAIMED_EXTENSION);
        match std::fs::rename(&entry.path, &claimed) {
            Ok(()) => Ok(Some(ClaimedReport {
                path: claimed,
                original: entry.path.clone(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to claim {}", entry.path.display())),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn find(&self, id: &str) -> anyhow::Result<Option<ReportEntry>> {
        if id.is_empty() {
            return Ok(None);
        }
        Ok(self
            .list()?
            .into_iter()
            .find(|e| e.id.starts_with(id) || id.starts_with(&e.id)))
    }
}

/// A stored report taken out of the listing while it is being resubmitted.
#[derive(Debug)]
pub struct ClaimedReport {
    path: PathBuf,
    original: PathBuf,
}

impl ClaimedReport {
    pub fn report(&self) -> anyhow::Result<Report> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Corrupt report file {}", self.path.display()))
    }

    /// Delivered: remove the file.
    pub fn complete(self) -> anyhow::Result<()> {
        std::fs::remove_file(&self.path)
            .with_context(|| format!("Failed to remove {}", self.path.display()))
    }

    /// Not delivered: put the file back in the listing.
    pub fn release(self) -> anyhow::Result<()> {
        std::fs::rename(&self.path, &self.original)
            .with_context(|| format!("Failed to restore {}", self.original.display()))
    }
}

/// Parse `report-20260207-a1b2c3d4` into `(date, id)`.
fn parse_report_filename(stem: &str) -> Option<(String, String)> {
    let mut parts = stem.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("report"), Some(date), Some(id)) if !id.is_empty() => {
            Some((date.to_string(), id.to_string()))
        }
        _ => None,
    }
}
