//! Walker - depth-first traversal of a storage tree
//!
//! The walker holds no result buffer: every matching file is handed to the
//! caller's callback as soon as it is found. Cancellation is checked before
//! each sibling and before each descent.

use crate::config::{is_video_name, ErrorPolicy, ScanOptions};
use crate::error::{BrowseError, Result};
use crate::models::{join_path, Entry, EntryKind, SkippedPath};
use crate::session::CancelToken;
use crate::storage::StorageProvider;

/// Counters collected while walking
#[derive(Debug, Clone, Default)]
pub struct WalkStats {
    /// Directories successfully listed
    pub dirs_visited: u64,
    /// Video files handed to the callback
    pub files_found: u64,
    /// Subtrees or files skipped under [`ErrorPolicy::SkipSubtree`]
    pub skipped: Vec<SkippedPath>,
}

/// Walk `dir`, whose slash-joined path is `path_prefix`.
///
/// Errors listing `dir` itself always propagate. Errors below it follow
/// `options.error_policy`.
pub fn walk<S, F>(
    storage: &S,
    dir: &S::Handle,
    path_prefix: &str,
    options: &ScanOptions,
    cancel: &CancelToken,
    on_file_found: F,
) -> Result<WalkStats>
where
    S: StorageProvider + ?Sized,
    F: FnMut(Entry<S::Handle>),
{
    let mut stats = WalkStats::default();
    walk_with_stats(
        storage,
        dir,
        path_prefix,
        options,
        cancel,
        on_file_found,
        &mut stats,
    )?;
    Ok(stats)
}

/// Same as [`walk`], but counters gathered before a failure are kept in
/// `stats`.
pub fn walk_with_stats<S, F>(
    storage: &S,
    dir: &S::Handle,
    path_prefix: &str,
    options: &ScanOptions,
    cancel: &CancelToken,
    on_file_found: F,
    stats: &mut WalkStats,
) -> Result<()>
where
    S: StorageProvider + ?Sized,
    F: FnMut(Entry<S::Handle>),
{
    let mut walker = Walker {
        storage,
        options,
        cancel,
        on_file_found,
        stats: std::mem::take(stats),
    };
    let result = walker.walk_dir(dir, path_prefix, true);
    *stats = walker.stats;
    result
}

struct Walker<'a, S: StorageProvider + ?Sized, F> {
    storage: &'a S,
    options: &'a ScanOptions,
    cancel: &'a CancelToken,
    on_file_found: F,
    stats: WalkStats,
}

impl<'a, S, F> Walker<'a, S, F>
where
    S: StorageProvider + ?Sized,
    F: FnMut(Entry<S::Handle>),
{
    fn walk_dir(&mut self, dir: &S::Handle, path: &str, is_root: bool) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Ok(());
        }

        log::debug!("Entering {}", path);
        let children = match self.storage.list_children(dir) {
            Ok(children) => children,
            Err(err) => {
                let err = err.with_path(path).into_scan_failure();
                return self.tolerate(err, path, is_root);
            }
        };
        self.stats.dirs_visited += 1;

        for child in children {
            if self.cancel.is_cancelled() {
                return Ok(());
            }

            let child_path = join_path(path, &child.name);
            if self.options.exclusions.is_excluded(&child_path) {
                log::debug!("Skipping excluded {}", child_path);
                continue;
            }

            match child.kind {
                EntryKind::File if is_video_name(&child.name) => {
                    let meta = match self.storage.open_file(&child.handle) {
                        Ok(meta) => meta,
                        Err(err) => {
                            self.tolerate(err.with_path(child_path.as_str()), &child_path, false)?;
                            continue;
                        }
                    };
                    let entry = Entry::file(child.handle, path, &child.name, meta);
                    self.stats.files_found += 1;
                    (self.on_file_found)(entry);
                }
                EntryKind::File => {}
                EntryKind::Directory => {
                    if self.options.recursive {
                        self.walk_dir(&child.handle, &child_path, false)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Apply the error policy to a failure at `path`
    fn tolerate(&mut self, err: BrowseError, path: &str, is_root: bool) -> Result<()> {
        if is_root || self.options.error_policy == ErrorPolicy::Abort {
            return Err(err);
        }
        log::warn!("Skipping unreadable {}: {}", path, err.message);
        self.stats.skipped.push(SkippedPath {
            path: path.to_string(),
            message: err.message,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrowseErrorKind;
    use crate::storage::MemoryStorage;

    fn tree() -> MemoryStorage {
        let storage = MemoryStorage::new("root");
        storage
            .add_file("root/top.mp4", 1, 1)
            .add_file("root/notes.txt", 1, 1)
            .add_file("root/Vacation/a.MOV", 1, 2)
            .add_file("root/Vacation/day2/b.mkv", 1, 3)
            .add_file("root/Vacationer/c.avi", 1, 4)
            .add_file("root/Work/d.webm", 1, 5)
            .add_file("root/Work/readme.md", 1, 6);
        storage
    }

    fn collect(storage: &MemoryStorage, options: &ScanOptions) -> Result<(Vec<String>, WalkStats)> {
        let cancel = CancelToken::new();
        let mut found = Vec::new();
        let stats = walk(storage, &storage.root(), "root", options, &cancel, |e| {
            found.push(e.path)
        })?;
        found.sort();
        Ok((found, stats))
    }

    #[test]
    fn test_walk_finds_only_videos() {
        let storage = tree();
        let (found, stats) = collect(&storage, &ScanOptions::default()).unwrap();
        assert_eq!(
            found,
            vec![
                "root/Vacation/a.MOV",
                "root/Vacation/day2/b.mkv",
                "root/Vacationer/c.avi",
                "root/Work/d.webm",
                "root/top.mp4",
            ]
        );
        assert_eq!(stats.files_found, 5);
        assert_eq!(stats.dirs_visited, 5);
    }

    #[test]
    fn test_excluded_subtree_is_pruned() {
        let storage = tree();
        let options = ScanOptions::builder()
            .exclude_folder("root/Vacation")
            .build();
        let (found, stats) = collect(&storage, &options).unwrap();
        assert_eq!(
            found,
            vec!["root/Vacationer/c.avi", "root/Work/d.webm", "root/top.mp4"]
        );
        // Vacation and Vacation/day2 never listed
        assert_eq!(stats.dirs_visited, 3);
    }

    #[test]
    fn test_non_recursive_only_top_level() {
        let storage = tree();
        let options = ScanOptions::builder().recursive(false).build();
        let (found, stats) = collect(&storage, &options).unwrap();
        assert_eq!(found, vec!["root/top.mp4"]);
        assert_eq!(stats.dirs_visited, 1);
    }

    #[test]
    fn test_non_recursive_nested_only_yields_nothing() {
        let storage = MemoryStorage::new("root");
        storage.add_file("root/a/b.mp4", 1, 1);
        let options = ScanOptions::builder().recursive(false).build();
        let (found, _) = collect(&storage, &options).unwrap();
        assert!(found.is_empty());
    }

    #[test]
    fn test_root_error_propagates() {
        let storage = tree();
        storage.deny_read("root");
        let err = collect(&storage, &ScanOptions::default()).unwrap_err();
        assert_eq!(err.kind, BrowseErrorKind::PermissionDenied);
    }

    #[test]
    fn test_unreadable_subtree_skipped_by_default() {
        let storage = tree();
        storage.deny_read("root/Vacation");
        let (found, stats) = collect(&storage, &ScanOptions::default()).unwrap();
        assert_eq!(
            found,
            vec!["root/Vacationer/c.avi", "root/Work/d.webm", "root/top.mp4"]
        );
        assert_eq!(stats.skipped.len(), 1);
        assert_eq!(stats.skipped[0].path, "root/Vacation");
    }

    #[test]
    fn test_unreadable_subtree_aborts_under_strict_policy() {
        let storage = tree();
        storage.deny_read("root/Work");
        let options = ScanOptions::builder()
            .error_policy(ErrorPolicy::Abort)
            .build();
        let cancel = CancelToken::new();
        let mut found = Vec::new();
        let err = walk(&storage, &storage.root(), "root", &options, &cancel, |e| {
            found.push(e.path)
        })
        .unwrap_err();
        assert_eq!(err.kind, BrowseErrorKind::PermissionDenied);
        assert_eq!(err.path.as_deref(), Some("root/Work"));
        // Vacation and Vacationer sort before Work and were already reported
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_stats_survive_strict_failure() {
        let storage = tree();
        storage.deny_read("root/Work");
        let options = ScanOptions::builder()
            .error_policy(ErrorPolicy::Abort)
            .build();
        let cancel = CancelToken::new();
        let mut stats = WalkStats::default();
        let result = walk_with_stats(
            &storage,
            &storage.root(),
            "root",
            &options,
            &cancel,
            |_| {},
            &mut stats,
        );
        assert!(result.is_err());
        // root, Vacation, Vacation/day2 and Vacationer were listed
        assert_eq!(stats.dirs_visited, 4);
        assert_eq!(stats.files_found, 3);
    }

    #[test]
    fn test_cancel_stops_between_siblings() {
        let storage = MemoryStorage::new("root");
        for i in 0..10 {
            storage.add_file(&format!("root/big/clip{i}.mp4"), 1, i);
        }
        let cancel = CancelToken::new();
        let mut found = Vec::new();
        walk(
            &storage,
            &storage.root(),
            "root",
            &ScanOptions::default(),
            &cancel,
            |e| {
                found.push(e.path);
                if found.len() == 2 {
                    cancel.cancel();
                }
            },
        )
        .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_cancel_before_start_lists_nothing() {
        let storage = tree();
        let cancel = CancelToken::new();
        cancel.cancel();
        let stats = walk(
            &storage,
            &storage.root(),
            "root",
            &ScanOptions::default(),
            &cancel,
            |_| panic!("nothing should be reported"),
        )
        .unwrap();
        assert_eq!(stats.dirs_visited, 0);
    }
}
