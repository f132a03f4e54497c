//! Host-side collection of discovered videos
//!
//! Keeps the entries shown to the user in discovery order together with the
//! exclusion set used for the next scan.

use crate::config::ScanOptions;
use crate::exclusion::{folder_of, is_under, ExclusionSet};
use crate::models::{Entry, RenameResult};

/// Discovered entries plus the current exclusion set
#[derive(Debug, Clone)]
pub struct Library<H> {
    entries: Vec<Entry<H>>,
    exclusions: ExclusionSet,
    recursive: bool,
    limit: Option<usize>,
}

impl<H> Default for Library<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            exclusions: ExclusionSet::new(),
            recursive: true,
            limit: None,
        }
    }
}

impl<H: Clone> Library<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exclusions(exclusions: ExclusionSet) -> Self {
        Self {
            exclusions,
            ..Self::default()
        }
    }

    /// Toggle recursive scanning for the next session
    pub fn set_recursive(&mut self, recursive: bool) {
        self.recursive = recursive;
    }

    /// Cap the number of entries kept; later adds are refused
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// Whether the entry cap has been reached
    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.entries.len() >= limit)
    }

    /// Drop every entry before a fresh scan; exclusions survive
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Add a discovered entry. Returns false when the library is full or the
    /// entry lies under an excluded folder.
    pub fn add(&mut self, entry: Entry<H>) -> bool {
        if self.is_full() || self.exclusions.is_excluded(&entry.path) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Exclude the folder owning `file_path` and drop entries below it.
    ///
    /// Returns the number of entries removed.
    pub fn exclude(&mut self, file_path: &str) -> usize {
        let folder = folder_of(file_path).to_string();
        self.exclusions.exclude(file_path);

        let before = self.entries.len();
        self.entries.retain(|entry| !is_under(&entry.path, &folder));
        before - self.entries.len()
    }

    /// Replace the entry previously stored at `old_path` with the renamed one.
    ///
    /// Other entries are left untouched. Returns false if no entry had that path.
    pub fn apply_rename(&mut self, old_path: &str, result: &RenameResult<H>) -> bool {
        let Some(slot) = self.entries.iter_mut().find(|e| e.path == old_path) else {
            return false;
        };
        *slot = result.entry.clone();
        true
    }

    pub fn entries(&self) -> &[Entry<H>] {
        &self.entries
    }

    pub fn find(&self, path: &str) -> Option<&Entry<H>> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Options snapshot for the next scan session
    pub fn options_for_next_scan(&self) -> ScanOptions {
        ScanOptions::builder()
            .recursive(self.recursive)
            .exclusions(self.exclusions.clone())
            .build()
    }
}
