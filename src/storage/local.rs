//! Real filesystem provider backed by walkdir and std::fs

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use super::{AccessMode, Child, StorageProvider};
use crate::error::{BrowseError, Result};
use crate::models::{EntryKind, FileMeta};

/// Provider for the local filesystem. Handles are plain paths.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage {
    access: AccessMode,
}

impl LocalStorage {
    pub fn new(access: AccessMode) -> Self {
        Self { access }
    }

    pub fn read_only() -> Self {
        Self::new(AccessMode::ReadOnly)
    }

    pub fn access(&self) -> AccessMode {
        self.access
    }
}

fn display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

/// Whether `a` and `b` name the same file, as on case-insensitive volumes
/// where `clip.mp4` and `Clip.mp4` resolve to one object.
#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;
    match (a.symlink_metadata(), b.symlink_metadata()) {
        (Ok(a), Ok(b)) => a.dev() == b.dev() && a.ino() == b.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> bool {
    let names_match = match (a.file_name(), b.file_name()) {
        (Some(a), Some(b)) => a.to_string_lossy().eq_ignore_ascii_case(&b.to_string_lossy()),
        _ => false,
    };
    names_match && a.parent() == b.parent()
}

impl StorageProvider for LocalStorage {
    type Handle = PathBuf;

    fn name(&self, handle: &PathBuf) -> String {
        handle
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| display(handle))
    }

    fn list_children(&self, dir: &PathBuf) -> Result<Vec<Child<PathBuf>>> {
        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name();

        let mut children = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| BrowseError::from(e).with_path(display(dir)))?;
            let file_type = entry.file_type();
            let kind = if file_type.is_dir() {
                EntryKind::Directory
            } else if file_type.is_file() {
                EntryKind::File
            } else {
                log::debug!("Skipping non-regular entry {:?}", entry.path());
                continue;
            };
            children.push(Child {
                name: entry.file_name().to_string_lossy().to_string(),
                handle: entry.into_path(),
                kind,
            });
        }
        Ok(children)
    }

    fn open_file(&self, file: &PathBuf) -> Result<FileMeta> {
        let metadata =
            std::fs::metadata(file).map_err(|e| BrowseError::from(e).with_path(display(file)))?;
        if !metadata.is_file() {
            return Err(BrowseError::not_found(display(file)));
        }
        let modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();
        Ok(FileMeta {
            size: metadata.len(),
            modified,
        })
    }

    fn child_dir(&self, dir: &PathBuf, name: &str) -> Result<PathBuf> {
        let path = dir.join(name);
        if path.is_dir() {
            Ok(path)
        } else {
            Err(BrowseError::not_found(display(&path)))
        }
    }

    fn move_file(&self, file: &PathBuf, dest_dir: &PathBuf, new_name: &str) -> Result<PathBuf> {
        if self.access == AccessMode::ReadOnly {
            return Err(BrowseError::permission_denied(display(file)));
        }
        let dest = dest_dir.join(new_name);
        if dest.symlink_metadata().is_ok() && !same_file(file, &dest) {
            return Err(BrowseError::already_exists(display(&dest)));
        }
        std::fs::rename(file, &dest).map_err(|e| BrowseError::from(e).with_path(display(file)))?;
        Ok(dest)
    }
}
