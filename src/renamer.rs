//! Renamer - collision-free renames that keep the original extension

use crate::error::{BrowseError, BrowseErrorKind, Result};
use crate::models::{Entry, EntryKind, RenameResult};
use crate::storage::{AccessMode, StorageProvider};

/// Split a file name into stem and extension (the extension keeps its dot).
///
/// The extension runs from the last `.` to the end; a name without a dot
/// has an empty extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) => name.split_at(idx),
        None => (name, ""),
    }
}

/// Check a requested base name and return it trimmed
pub fn validate_base_name(desired: &str) -> Result<&str> {
    let trimmed = desired.trim();
    if trimmed.is_empty() {
        return Err(BrowseError::invalid_name(desired, "name is empty"));
    }
    if trimmed.contains('/') || trimmed.contains('\0') {
        return Err(BrowseError::invalid_name(
            desired,
            "name contains a path separator or NUL",
        ));
    }
    if trimmed == "." || trimmed == ".." {
        return Err(BrowseError::invalid_name(desired, "reserved name"));
    }
    Ok(trimmed)
}

/// Pick the final name for renaming `current_name` to `desired_base`.
///
/// Tries `desired_base + ext`, then `desired_base_1 + ext`, `_2`, ... until
/// no sibling other than the file itself carries that name.
pub fn plan_final_name<S: AsRef<str>>(
    current_name: &str,
    desired_base: &str,
    sibling_names: &[S],
) -> String {
    let (_, extension) = split_extension(current_name);
    let taken = |candidate: &str| {
        sibling_names
            .iter()
            .map(AsRef::as_ref)
            .any(|name| name == candidate && name != current_name)
    };

    let mut candidate = format!("{}{}", desired_base, extension);
    let mut counter: u64 = 1;
    while taken(&candidate) {
        candidate = format!("{}_{}{}", desired_base, counter, extension);
        counter += 1;
    }
    candidate
}

/// Performs renames below one root
pub struct Renamer<'a, S: StorageProvider + ?Sized> {
    storage: &'a S,
    root: S::Handle,
    access: AccessMode,
}

impl<'a, S: StorageProvider + ?Sized> Renamer<'a, S> {
    pub fn new(storage: &'a S, root: S::Handle, access: AccessMode) -> Self {
        Self {
            storage,
            root,
            access,
        }
    }

    /// Resolve a slash-joined path (root name first) to a file entry
    pub fn locate(&self, path: &str) -> Result<Entry<S::Handle>> {
        let segments: Vec<&str> = path.split('/').collect();
        let (name, dirs) = match segments.split_last() {
            Some((name, dirs)) if !dirs.is_empty() => (*name, dirs),
            _ => return Err(BrowseError::not_found(path)),
        };
        let parent = self.resolve_dir(dirs).map_err(|e| e.with_path(path))?;
        let child = self
            .storage
            .list_children(&parent)?
            .into_iter()
            .find(|c| c.kind == EntryKind::File && c.name == name)
            .ok_or_else(|| BrowseError::not_found(path))?;
        let meta = self.storage.open_file(&child.handle)?;
        Ok(Entry::file(child.handle, &dirs.join("/"), name, meta))
    }

    /// Walk `segments` (root name first) down from the root
    fn resolve_dir(&self, segments: &[&str]) -> Result<S::Handle> {
        let root_name = self.storage.name(&self.root);
        match segments.first() {
            Some(first) if *first == root_name => {}
            _ => return Err(BrowseError::not_found(segments.join("/"))),
        }
        let mut dir = self.root.clone();
        for segment in &segments[1..] {
            dir = self.storage.child_dir(&dir, segment)?;
        }
        Ok(dir)
    }

    /// Rename `entry` to `desired_base` plus its current extension.
    ///
    /// Name collisions are resolved with `_1`, `_2`, ... suffixes and never
    /// surface as errors.
    pub fn rename(
        &self,
        entry: &Entry<S::Handle>,
        desired_base: &str,
    ) -> Result<RenameResult<S::Handle>> {
        let desired_base = validate_base_name(desired_base)?;
        if self.access == AccessMode::ReadOnly {
            return Err(BrowseError::permission_denied(entry.path.as_str()));
        }

        // The file may have vanished since it was discovered
        self.storage
            .open_file(&entry.handle)
            .map_err(|e| e.with_path(entry.path.as_str()))?;

        let parent_path = entry.parent_path();
        let segments: Vec<&str> = parent_path.split('/').collect();
        let parent = self.resolve_dir(&segments)?;
        let mut taken: Vec<String> = self
            .storage
            .list_children(&parent)?
            .into_iter()
            .map(|c| c.name)
            .collect();

        loop {
            let final_name = plan_final_name(&entry.name, desired_base, &taken);
            log::debug!("Planned rename {} -> {}", entry.path, final_name);
            if final_name == entry.name {
                return Ok(RenameResult {
                    final_path: entry.path.clone(),
                    final_name,
                    entry: entry.clone(),
                });
            }

            // Storage may match names more loosely than the listing, e.g.
            // ignoring case, so a planned name can still be occupied
            let handle = match self.storage.move_file(&entry.handle, &parent, &final_name) {
                Ok(handle) => handle,
                Err(err) if err.kind == BrowseErrorKind::AlreadyExists => {
                    log::debug!("{} is taken, trying the next suffix", final_name);
                    taken.push(final_name);
                    continue;
                }
                Err(err) => return Err(err.with_path(entry.path.as_str())),
            };
            let meta = self.storage.open_file(&handle)?;
            let updated = Entry::file(handle, parent_path, &final_name, meta);
            log::info!("Renamed {} to {}", entry.path, updated.path);

            return Ok(RenameResult {
                final_name,
                final_path: updated.path.clone(),
                entry: updated,
            });
        }
    }

    /// Locate the file at `path` and rename it
    pub fn rename_path(&self, path: &str, desired_base: &str) -> Result<RenameResult<S::Handle>> {
        validate_base_name(desired_base)?;
        let entry = self.locate(path)?;
        self.rename(&entry, desired_base)
    }
}
