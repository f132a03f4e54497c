//! Progress reporting module for scan sessions
//!
//! Emits one JSON object per line on stderr so a host process can follow a
//! scan as it runs.

use serde::Serialize;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::config::ScanOptions;
use crate::error::BrowseError;
use crate::models::{Entry, ScanStatus, ScanSummary};

/// Start message sent when a scan begins
#[derive(Debug, Clone, Serialize)]
pub struct StartMessage {
    /// Message type identifier
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    /// Sequence number
    pub seq: u64,
    /// Timestamp in milliseconds since reporter creation
    pub ts: u64,
    /// Scan root name
    pub root: String,
    /// Whether recursive scanning is enabled
    pub recursive: bool,
    /// Number of excluded folders in the snapshot
    pub exclusions: usize,
}

impl StartMessage {
    pub fn new(seq: u64, ts: u64, root: String, recursive: bool, exclusions: usize) -> Self {
        Self {
            msg_type: "start",
            seq,
            ts,
            root,
            recursive,
            exclusions,
        }
    }
}

/// Sent for every entry as soon as it is found
#[derive(Debug, Clone, Serialize)]
pub struct FoundMessage {
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    pub seq: u64,
    pub ts: u64,
    pub path: String,
    pub name: String,
    /// Running count of entries found
    #[serde(rename = "f")]
    pub files: u64,
}

impl FoundMessage {
    pub fn new(seq: u64, ts: u64, path: String, name: String, files: u64) -> Self {
        Self {
            msg_type: "found",
            seq,
            ts,
            path,
            name,
            files,
        }
    }
}

/// Error message sent when a scan or rename fails
#[derive(Debug, Clone, Serialize)]
pub struct ErrorProgressMessage {
    /// Message type identifier ("err" for error)
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    pub seq: u64,
    pub ts: u64,
    /// Error kind
    pub error_type: String,
    pub message: String,
    /// Path that caused the error (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ErrorProgressMessage {
    pub fn new(
        seq: u64,
        ts: u64,
        error_type: String,
        message: String,
        path: Option<String>,
    ) -> Self {
        Self {
            msg_type: "err",
            seq,
            ts,
            error_type,
            message,
            path,
        }
    }
}

/// Done message sent once the session reaches a terminal status
#[derive(Debug, Clone, Serialize)]
pub struct DoneMessage {
    #[serde(rename = "_t")]
    pub msg_type: &'static str,
    pub seq: u64,
    pub ts: u64,
    pub status: ScanStatus,
    /// Total number of files found
    #[serde(rename = "tf")]
    pub total_files: u64,
    /// Total number of directories listed
    #[serde(rename = "td")]
    pub total_dirs: u64,
    /// Number of skipped subtrees
    #[serde(rename = "sk")]
    pub skipped: usize,
    /// Total scan duration in milliseconds
    pub ms: u64,
}

impl DoneMessage {
    pub fn new(seq: u64, ts: u64, summary: &ScanSummary) -> Self {
        Self {
            msg_type: "done",
            seq,
            ts,
            status: summary.status,
            total_files: summary.files_found,
            total_dirs: summary.dirs_visited,
            skipped: summary.skipped.len(),
            ms: summary.duration_ms,
        }
    }
}

/// Progress reporter writing JSON lines to stderr
pub struct ProgressReporter {
    /// Whether progress reporting is enabled
    enabled: bool,
    /// Sequence number for messages
    seq: AtomicU64,
    /// Entries reported so far
    files: AtomicU64,
    /// Start time of the reporter
    start_time: Instant,
}

impl ProgressReporter {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            seq: AtomicU64::new(0),
            files: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Get the next sequence number (monotonically increasing)
    pub fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::SeqCst)
    }

    /// Milliseconds since reporter creation
    pub fn current_timestamp(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }

    /// Output a serializable message to stderr as JSON
    pub fn output_to_stderr<T: Serialize>(&self, msg: &T) {
        if let Ok(json) = serde_json::to_string(msg) {
            eprintln!("{}", json);
            std::io::stderr().flush().ok();
        }
    }

    pub fn report_start(&self, root: &str, options: &ScanOptions) {
        if !self.enabled {
            return;
        }
        let msg = StartMessage::new(
            self.next_seq(),
            self.current_timestamp(),
            root.to_string(),
            options.recursive,
            options.exclusions.len(),
        );
        self.output_to_stderr(&msg);
    }

    pub fn report_found<H>(&self, entry: &Entry<H>) {
        if !self.enabled {
            return;
        }
        let files = self.files.fetch_add(1, Ordering::SeqCst) + 1;
        let msg = FoundMessage::new(
            self.next_seq(),
            self.current_timestamp(),
            entry.path.clone(),
            entry.name.clone(),
            files,
        );
        self.output_to_stderr(&msg);
    }

    /// Report a scan or rename failure
    pub fn report_error(&self, error: &BrowseError) {
        if !self.enabled {
            return;
        }
        let msg = ErrorProgressMessage::new(
            self.next_seq(),
            self.current_timestamp(),
            format!("{:?}", error.kind),
            error.message.clone(),
            error.path.clone(),
        );
        self.output_to_stderr(&msg);
    }

    pub fn report_done(&self, summary: &ScanSummary) {
        if !self.enabled {
            return;
        }
        let msg = DoneMessage::new(self.next_seq(), self.current_timestamp(), summary);
        self.output_to_stderr(&msg);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrowseErrorKind;
    use crate::models::SkippedPath;

    #[test]
    fn test_start_message_serialization() {
        let msg = StartMessage::new(1, 100, "Movies".to_string(), true, 2);
        let json = serde_json::to_string(&msg).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["_t"], "start");
        assert_eq!(parsed["seq"], 1);
        assert_eq!(parsed["ts"], 100);
        assert_eq!(parsed["root"], "Movies");
        assert_eq!(parsed["recursive"], true);
        assert_eq!(parsed["exclusions"], 2);
    }

    #[test]
    fn test_found_message_serialization() {
        let msg = FoundMessage::new(
            2,
            150,
            "Movies/a.mp4".to_string(),
            "a.mp4".to_string(),
            7,
        );
        let parsed = serde_json::to_value(&msg).unwrap();
        assert_eq!(parsed["_t"], "found");
        assert_eq!(parsed["path"], "Movies/a.mp4");
        assert_eq!(parsed["f"], 7);
    }

    #[test]
    fn test_error_message_without_path() {
        let msg = ErrorProgressMessage::new(
            1,
            100,
            "ScanFailed".to_string(),
            "General IO error".to_string(),
            None,
        );
        let json = serde_json::to_string(&msg).unwrap();
        assert!(!json.contains("\"path\""));
    }

    #[test]
    fn test_done_message_serialization() {
        let summary = ScanSummary {
            status: ScanStatus::Cancelled,
            files_found: 12,
            dirs_visited: 4,
            skipped: vec![SkippedPath {
                path: "Movies/locked".to_string(),
                message: "denied".to_string(),
            }],
            error: None,
            duration_ms: 450,
        };
        let parsed = serde_json::to_value(DoneMessage::new(10, 500, &summary)).unwrap();

        assert_eq!(parsed["_t"], "done");
        assert_eq!(parsed["status"], "cancelled");
        assert_eq!(parsed["tf"], 12);
        assert_eq!(parsed["td"], 4);
        assert_eq!(parsed["sk"], 1);
        assert_eq!(parsed["ms"], 450);
    }

    #[test]
    fn test_sequence_numbers_increase() {
        let reporter = ProgressReporter::new(true);
        assert_eq!(reporter.next_seq(), 0);
        assert_eq!(reporter.next_seq(), 1);
        assert_eq!(reporter.next_seq(), 2);
    }

    #[test]
    fn test_disabled_reporter_is_silent() {
        let reporter = ProgressReporter::new(false);
        assert!(!reporter.is_enabled());

        reporter.report_start("Movies", &ScanOptions::default());
        reporter.report_error(&BrowseError::new(BrowseErrorKind::ScanFailed, None, "x"));
        reporter.report_done(&ScanSummary::default());

        // Sequence should not advance when disabled
        assert_eq!(reporter.next_seq(), 0);
    }
}
