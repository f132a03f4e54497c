//! Storage provider capability
//!
//! The walker, session and renamer only talk to storage through
//! [`StorageProvider`]. Two providers ship with the crate: [`LocalStorage`]
//! for the real filesystem and [`MemoryStorage`] for hosts without a disk.

use std::fmt::Debug;

use crate::error::Result;
use crate::models::{EntryKind, FileMeta};

pub mod local;
pub mod memory;

pub use local::LocalStorage;
pub use memory::MemoryStorage;

/// One child returned by a directory listing
#[derive(Debug, Clone)]
pub struct Child<H> {
    pub handle: H,
    pub name: String,
    pub kind: EntryKind,
}

/// Access granted by the host for a root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    ReadOnly,
    #[default]
    ReadWrite,
}

/// Host-provided file-handle primitives.
///
/// Every method is a suspension point for the session: it may block on the
/// underlying storage and completes before cancellation is observed.
pub trait StorageProvider {
    /// Opaque handle to a file or directory
    type Handle: Clone + Debug + Send + 'static;

    /// Display name of the object behind a handle (last path segment)
    fn name(&self, handle: &Self::Handle) -> String;

    /// List the direct children of a directory
    fn list_children(&self, dir: &Self::Handle) -> Result<Vec<Child<Self::Handle>>>;

    /// Open a file and read its metadata
    fn open_file(&self, file: &Self::Handle) -> Result<FileMeta>;

    /// Resolve a subdirectory by name
    fn child_dir(&self, dir: &Self::Handle, name: &str) -> Result<Self::Handle>;

    /// Move `file` into `dest_dir` under `new_name`, returning the new handle.
    ///
    /// Must not overwrite an existing object.
    fn move_file(
        &self,
        file: &Self::Handle,
        dest_dir: &Self::Handle,
        new_name: &str,
    ) -> Result<Self::Handle>;
}
