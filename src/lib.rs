//! Local video file browser core
//!
//! Incrementally discovers video files below a chosen root, with cancellable
//! scans, folder exclusion and collision-free renames. All I/O goes through a
//! pluggable [`StorageProvider`].

pub mod config;
pub mod error;
pub mod exclusion;
pub mod library;
pub mod models;
pub mod progress;
pub mod renamer;
pub mod session;
pub mod storage;
pub mod walker;

pub use config::{is_video_name, ErrorPolicy, ScanOptions, VIDEO_EXTENSIONS};
pub use error::{BrowseError, BrowseErrorKind};
pub use exclusion::{is_excluded, ExclusionSet};
pub use library::Library;
pub use models::{
    Entry, EntryKind, FileMeta, Identity, RenameResult, ScanEvent, ScanStatus, ScanSummary,
    SkippedPath,
};
pub use progress::ProgressReporter;
pub use renamer::{plan_final_name, Renamer};
pub use session::{CancelToken, ScanHandle, ScanSession};
pub use storage::{AccessMode, LocalStorage, MemoryStorage, StorageProvider};
pub use walker::walk;
