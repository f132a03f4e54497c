//! Core data models for the video browser

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of filesystem object behind an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metadata returned when a file is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMeta {
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

/// Stable key used to deduplicate an entry across re-renders.
///
/// Built from the full path and the modification time in milliseconds, so
/// same-named files in different folders stay distinct within a scan.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    pub fn new(path: &str, modified: DateTime<Utc>) -> Self {
        Self(format!("{}-{}", path, modified.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A discovered file plus the storage handle it was found through
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = ""))]
pub struct Entry<H> {
    /// Storage handle (not serialized)
    #[serde(skip)]
    pub handle: H,
    /// Slash-joined path from the scan root, root name first
    pub path: String,
    /// Final path segment including extension
    pub name: String,
    pub kind: EntryKind,
    pub identity: Identity,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: DateTime<Utc>,
}

impl<H> Entry<H> {
    /// Create a file entry below `parent_path`
    pub fn file(handle: H, parent_path: &str, name: &str, meta: FileMeta) -> Self {
        let path = join_path(parent_path, name);
        Self {
            handle,
            identity: Identity::new(&path, meta.modified),
            path,
            name: name.to_string(),
            kind: EntryKind::File,
            size: meta.size,
            modified: meta.modified,
        }
    }

    /// Folder part of the entry path
    pub fn parent_path(&self) -> &str {
        crate::exclusion::folder_of(&self.path)
    }
}

/// Join a parent path and a child name with `/`
pub fn join_path(parent: &str, name: &str) -> String {
    format!("{}/{}", parent, name)
}

/// Terminal and non-terminal states of a scan session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// Created but not started
    #[default]
    Pending,
    Running,
    /// Walked every subtree without cancellation
    Completed,
    Cancelled,
    /// The root (or, under the abort policy, any directory) could not be read
    Failed,
}

impl ScanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScanStatus::Completed | ScanStatus::Cancelled | ScanStatus::Failed
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Cancelled => "cancelled",
            ScanStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A subtree the walker could not read and skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPath {
    pub path: String,
    pub message: String,
}

/// Final report of one scan session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanSummary {
    pub status: ScanStatus,
    /// Number of video files emitted
    pub files_found: u64,
    /// Number of directories listed
    pub dirs_visited: u64,
    /// Subtrees skipped because they could not be read
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedPath>,
    /// Failure message when status is failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Total scan duration in milliseconds
    pub duration_ms: u64,
}

impl ScanSummary {
    /// Completed without a single matching file
    pub fn is_empty_result(&self) -> bool {
        self.status == ScanStatus::Completed && self.files_found == 0
    }

    pub fn is_failed(&self) -> bool {
        self.status == ScanStatus::Failed
    }
}

/// Events streamed from a running session
#[derive(Debug, Clone)]
pub enum ScanEvent<H> {
    EntryFound(Entry<H>),
    Terminal(ScanSummary),
}

/// Outcome of a rename
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = ""))]
pub struct RenameResult<H> {
    pub final_name: String,
    pub final_path: String,
    /// Entry reflecting the new name, handle and identity
    pub entry: Entry<H>,
}
