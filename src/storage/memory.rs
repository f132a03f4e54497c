//! In-memory storage provider
//!
//! Objects are keyed by their slash-joined path, root name first. Handles are
//! those paths, so a handle goes stale once the object behind it moves.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use super::{AccessMode, Child, StorageProvider};
use crate::error::{BrowseError, Result};
use crate::exclusion::folder_of;
use crate::models::{join_path, EntryKind, FileMeta};

#[derive(Debug, Clone, Copy)]
struct Node {
    kind: EntryKind,
    meta: FileMeta,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: BTreeMap<String, Node>,
    unreadable: HashSet<String>,
}

/// Provider keeping a whole directory tree in memory
#[derive(Debug)]
pub struct MemoryStorage {
    root: String,
    access: AccessMode,
    case_insensitive: bool,
    tree: Mutex<Tree>,
}

fn millis(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

impl MemoryStorage {
    /// Create an empty tree whose root directory is called `root`
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut tree = Tree::default();
        tree.nodes.insert(
            root.clone(),
            Node {
                kind: EntryKind::Directory,
                meta: FileMeta {
                    size: 0,
                    modified: millis(0),
                },
            },
        );
        Self {
            root,
            access: AccessMode::ReadWrite,
            case_insensitive: false,
            tree: Mutex::new(tree),
        }
    }

    /// Handle of the root directory
    pub fn root(&self) -> String {
        self.root.clone()
    }

    /// Restrict the tree to reads; moves fail with permission denied
    pub fn with_access(mut self, access: AccessMode) -> Self {
        self.access = access;
        self
    }

    /// Compare move targets ignoring ASCII case, like APFS or NTFS volumes.
    /// Listings still report names as stored.
    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Add a file, creating missing parent directories
    pub fn add_file(&self, path: &str, size: u64, modified_ms: i64) -> &Self {
        self.add_dir(folder_of(path));
        self.lock().nodes.insert(
            path.to_string(),
            Node {
                kind: EntryKind::File,
                meta: FileMeta {
                    size,
                    modified: millis(modified_ms),
                },
            },
        );
        self
    }

    /// Add a directory and its missing ancestors
    pub fn add_dir(&self, path: &str) -> &Self {
        let mut tree = self.lock();
        let mut current = String::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            current = if current.is_empty() {
                segment.to_string()
            } else {
                join_path(&current, segment)
            };
            tree.nodes.entry(current.clone()).or_insert(Node {
                kind: EntryKind::Directory,
                meta: FileMeta {
                    size: 0,
                    modified: millis(0),
                },
            });
        }
        drop(tree);
        self
    }

    /// Make listing `path` fail with permission denied
    pub fn deny_read(&self, path: &str) -> &Self {
        self.lock().unreadable.insert(path.to_string());
        self
    }

    /// Remove an object and everything below it
    pub fn remove(&self, path: &str) -> &Self {
        self.lock()
            .nodes
            .retain(|key, _| !crate::exclusion::is_under(key, path));
        self
    }

    /// Whether an object exists at `path`
    pub fn exists(&self, path: &str) -> bool {
        self.lock().nodes.contains_key(path)
    }

    /// Paths of every file in the tree
    pub fn file_paths(&self) -> Vec<String> {
        self.lock()
            .nodes
            .iter()
            .filter(|(_, node)| node.kind == EntryKind::File)
            .map(|(path, _)| path.clone())
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl StorageProvider for MemoryStorage {
    type Handle = String;

    fn name(&self, handle: &String) -> String {
        match handle.rfind('/') {
            Some(idx) => handle[idx + 1..].to_string(),
            None => handle.clone(),
        }
    }

    fn list_children(&self, dir: &String) -> Result<Vec<Child<String>>> {
        let tree = self.lock();
        if tree.unreadable.contains(dir) {
            return Err(BrowseError::permission_denied(dir.clone()));
        }
        match tree.nodes.get(dir) {
            Some(node) if node.kind == EntryKind::Directory => {}
            _ => return Err(BrowseError::not_found(dir.clone())),
        }
        let children = tree
            .nodes
            .iter()
            .filter(|(path, _)| folder_of(path) == dir.as_str())
            .map(|(path, node)| Child {
                handle: path.clone(),
                name: self.name(path),
                kind: node.kind,
            })
            .collect();
        Ok(children)
    }

    fn open_file(&self, file: &String) -> Result<FileMeta> {
        match self.lock().nodes.get(file) {
            Some(node) if node.kind == EntryKind::File => Ok(node.meta),
            _ => Err(BrowseError::not_found(file.clone())),
        }
    }

    fn child_dir(&self, dir: &String, name: &str) -> Result<String> {
        let path = join_path(dir, name);
        match self.lock().nodes.get(&path) {
            Some(node) if node.kind == EntryKind::Directory => Ok(path),
            _ => Err(BrowseError::not_found(path)),
        }
    }

    fn move_file(&self, file: &String, dest_dir: &String, new_name: &str) -> Result<String> {
        if self.access == AccessMode::ReadOnly {
            return Err(BrowseError::permission_denied(file.clone()));
        }
        let mut tree = self.lock();
        let dest = join_path(dest_dir, new_name);
        let occupant = tree.nodes.keys().find(|key| {
            if self.case_insensitive {
                key.eq_ignore_ascii_case(&dest)
            } else {
                **key == dest
            }
        });
        if let Some(occupant) = occupant {
            if occupant != file {
                return Err(BrowseError::already_exists(dest));
            }
        }
        match tree.nodes.get(dest_dir) {
            Some(node) if node.kind == EntryKind::Directory => {}
            _ => return Err(BrowseError::not_found(dest_dir.clone())),
        }
        let node = match tree.nodes.remove(file) {
            Some(node) if node.kind == EntryKind::File => node,
            Some(node) => {
                tree.nodes.insert(file.clone(), node);
                return Err(BrowseError::not_found(file.clone()));
            }
            None => return Err(BrowseError::not_found(file.clone())),
        };
        tree.nodes.insert(dest.clone(), node);
        Ok(dest)
    }
}
