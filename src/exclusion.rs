//! Folder exclusion: segment-aware path matching and the exclusion set

use serde::{Deserialize, Serialize};

/// Returns true when `candidate` equals `excluded` or lies below it.
///
/// Matching is segment-aware: `"/a/bb"` is not under `"/a/b"`.
pub fn is_under(candidate: &str, excluded: &str) -> bool {
    match candidate.strip_prefix(excluded) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Returns true when `candidate` is excluded by any member of `exclusions`.
pub fn is_excluded<S: AsRef<str>>(candidate: &str, exclusions: &[S]) -> bool {
    exclusions
        .iter()
        .any(|excluded| is_under(candidate, excluded.as_ref()))
}

/// Folder part of a slash-joined file path (everything before the last `/`).
///
/// A path without any `/` has an empty folder.
pub fn folder_of(file_path: &str) -> &str {
    match file_path.rfind('/') {
        Some(idx) => &file_path[..idx],
        None => "",
    }
}

/// Set of excluded folder paths.
///
/// Insertion order is kept for display; duplicates are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct ExclusionSet {
    folders: Vec<String>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude the folder owning `file_path` and return the updated set.
    pub fn exclude(&mut self, file_path: &str) -> &Self {
        let folder = folder_of(file_path);
        if self.insert_folder(folder) {
            log::info!("Excluded folder {}", folder);
        } else {
            log::debug!("Folder {} already excluded", folder);
        }
        self
    }

    /// Add a folder path directly. Returns false if it was already present.
    ///
    /// Dedup is by exact string: a folder subsumed by an existing entry is
    /// still inserted.
    pub fn insert_folder(&mut self, folder: &str) -> bool {
        let folder = folder.trim_end_matches('/');
        if self.folders.iter().any(|f| f == folder) {
            return false;
        }
        self.folders.push(folder.to_string());
        true
    }

    /// Check a path against every excluded folder
    pub fn is_excluded(&self, path: &str) -> bool {
        is_excluded(path, &self.folders)
    }

    pub fn folders(&self) -> &[String] {
        &self.folders
    }

    pub fn len(&self) -> usize {
        self.folders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.folders.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = Self::new();
        for folder in iter {
            set.insert_folder(&folder.into());
        }
        set
    }
}

impl From<Vec<String>> for ExclusionSet {
    fn from(folders: Vec<String>) -> Self {
        folders.into_iter().collect()
    }
}

impl From<ExclusionSet> for Vec<String> {
    fn from(set: ExclusionSet) -> Self {
        set.folders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_and_descendant_match() {
        let set: ExclusionSet = ["/root/Vacation"].into_iter().collect();
        assert!(set.is_excluded("/root/Vacation"));
        assert!(set.is_excluded("/root/Vacation/clip.mp4"));
        assert!(set.is_excluded("/root/Vacation/day1/clip.mp4"));
        assert!(!set.is_excluded("/root/Other/clip.mp4"));
        assert!(!set.is_excluded("/root"));
    }

    #[test]
    fn test_no_sibling_prefix_collision() {
        assert!(!is_excluded("/a/bb", &["/a/b"]));
        assert!(!is_excluded("/a/b.mp4", &["/a/b"]));
        assert!(is_excluded("/a/b/c", &["/a/b"]));
    }

    #[test]
    fn test_empty_set_excludes_nothing() {
        let set = ExclusionSet::new();
        assert!(!set.is_excluded("root/a.mp4"));
        assert!(set.is_empty());
    }

    #[test]
    fn test_exclude_is_idempotent_per_folder() {
        let mut set = ExclusionSet::new();
        set.exclude("/root/Vacation/clip.mp4");
        set.exclude("/root/Vacation/other.mov");
        assert_eq!(set.folders(), &["/root/Vacation".to_string()]);
    }

    #[test]
    fn test_subsumed_folder_is_still_inserted() {
        let mut set = ExclusionSet::new();
        assert!(set.insert_folder("/root/a"));
        assert!(set.insert_folder("/root/a/b"));
        assert!(!set.insert_folder("/root/a/"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_deserialize_drops_duplicates() {
        let set: ExclusionSet = serde_json::from_str(r#"["r/a", "r/a", "r/b"]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["r/a","r/b"]"#);
    }

    #[test]
    fn test_folder_of() {
        assert_eq!(folder_of("root/a/b.mp4"), "root/a");
        assert_eq!(folder_of("/clip.mp4"), "");
        assert_eq!(folder_of("clip.mp4"), "");
    }

    proptest! {
        #[test]
        fn prop_descendants_always_excluded(
            base in "[a-z]{1,6}(/[a-z]{1,6}){0,3}",
            tail in "(/[a-z0-9.]{1,6}){0,3}"
        ) {
            let candidate = format!("{base}{tail}");
            prop_assert!(is_excluded(&candidate, &[base.as_str()]));
        }

        #[test]
        fn prop_longer_segment_never_matches(
            base in "[a-z]{1,6}(/[a-z]{1,6}){0,3}",
            extra in "[a-z0-9]{1,4}"
        ) {
            let candidate = format!("{base}{extra}");
            prop_assert!(!is_excluded(&candidate, &[base.as_str()]));
        }

        #[test]
        fn prop_matches_prefix_definition(
            candidate in "[ab]{1,3}(/[ab]{1,3}){0,3}",
            excluded in proptest::collection::vec("[ab]{1,3}(/[ab]{1,3}){0,2}", 0..4)
        ) {
            let expected = excluded
                .iter()
                .any(|e| candidate == *e || candidate.starts_with(&format!("{e}/")));
            prop_assert_eq!(is_excluded(&candidate, &excluded), expected);
        }
    }
}
