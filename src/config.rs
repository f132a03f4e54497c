//! Configuration for scan sessions

use serde::{Deserialize, Serialize};

use crate::exclusion::ExclusionSet;

/// Recognized video extensions (matched case-insensitively as suffixes)
pub const VIDEO_EXTENSIONS: [&str; 5] = [".mp4", ".mov", ".mkv", ".avi", ".webm"];

/// Check if a file name carries one of the recognized video extensions
pub fn is_video_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    VIDEO_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// What the walker does when a directory below the root cannot be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Abort the whole walk; the session ends as failed
    Abort,
    /// Skip only the unreadable subtree and keep walking
    #[default]
    SkipSubtree,
}

/// Options snapshot taken when a scan session starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Whether to descend into subdirectories.
    /// If false, only files directly in the root are reported.
    pub recursive: bool,

    /// Handling of unreadable subdirectories
    pub error_policy: ErrorPolicy,

    /// Folders skipped entirely during the walk
    pub exclusions: ExclusionSet,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            error_policy: ErrorPolicy::default(),
            exclusions: ExclusionSet::new(),
        }
    }
}

impl ScanOptions {
    /// Create an options builder
    pub fn builder() -> ScanOptionsBuilder {
        ScanOptionsBuilder::new()
    }
}

/// Builder for ScanOptions
#[derive(Debug, Default)]
pub struct ScanOptionsBuilder {
    options: ScanOptions,
}

impl ScanOptionsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable recursive scanning
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.options.recursive = enabled;
        self
    }

    pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.options.error_policy = policy;
        self
    }

    /// Replace the exclusion snapshot
    pub fn exclusions(mut self, exclusions: ExclusionSet) -> Self {
        self.options.exclusions = exclusions;
        self
    }

    /// Exclude one folder path
    pub fn exclude_folder(mut self, folder: impl AsRef<str>) -> Self {
        self.options.exclusions.insert_folder(folder.as_ref());
        self
    }

    /// Build the options
    pub fn build(self) -> ScanOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = ScanOptions::default();
        assert!(options.recursive);
        assert_eq!(options.error_policy, ErrorPolicy::SkipSubtree);
        assert!(options.exclusions.is_empty());
    }

    #[test]
    fn test_is_video_name() {
        assert!(is_video_name("clip.mp4"));
        assert!(is_video_name("CLIP.MOV"));
        assert!(is_video_name("a.b.mkv"));
        assert!(is_video_name("x.Avi"));
        assert!(is_video_name("talk.webm"));
        assert!(!is_video_name("notes.txt"));
        assert!(!is_video_name("mp4"));
        assert!(!is_video_name("clip.mp4.part"));
    }

    #[test]
    fn test_options_builder() {
        let options = ScanOptions::builder()
            .recursive(false)
            .error_policy(ErrorPolicy::Abort)
            .exclude_folder("root/skip")
            .exclude_folder("root/skip")
            .build();

        assert!(!options.recursive);
        assert_eq!(options.error_policy, ErrorPolicy::Abort);
        assert_eq!(options.exclusions.len(), 1);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ScanOptions = serde_json::from_str(r#"{"recursive": false}"#).unwrap();
        assert!(!options.recursive);
        assert_eq!(options.error_policy, ErrorPolicy::SkipSubtree);

        let options: ScanOptions =
            serde_json::from_str(r#"{"error_policy": "abort", "exclusions": ["r/a"]}"#).unwrap();
        assert!(options.recursive);
        assert_eq!(options.error_policy, ErrorPolicy::Abort);
        assert!(options.exclusions.is_excluded("r/a/b.mp4"));
    }
}
