//! Error types for the video browser core

use thiserror::Error;

/// Error kinds surfaced by scans and renames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseErrorKind {
    /// The user aborted root selection; not a failure
    PickerCancelled,
    /// Read or write access was not granted
    PermissionDenied,
    /// The target vanished between discovery and use
    NotFound,
    /// Unexpected I/O error while reading a directory
    ScanFailed,
    /// A requested file name cannot be used
    InvalidName,
    /// Operation not allowed in the current session state
    InvalidState,
    /// A move target is already taken by another object
    AlreadyExists,
    /// Anything else
    Unknown,
}

/// Represents an error raised by the browser core
#[derive(Debug, Clone, Error)]
#[error("{kind:?}: {message} (path: {path:?})")]
pub struct BrowseError {
    /// The kind of error
    pub kind: BrowseErrorKind,
    /// Slash-joined path the error refers to, when known
    pub path: Option<String>,
    /// Human-readable error message
    pub message: String,
}

pub type Result<T> = std::result::Result<T, BrowseError>;

impl BrowseError {
    /// Create a new error
    pub fn new(kind: BrowseErrorKind, path: Option<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            path,
            message: message.into(),
        }
    }

    pub fn picker_cancelled() -> Self {
        Self::new(BrowseErrorKind::PickerCancelled, None, "Root selection cancelled")
    }

    pub fn permission_denied(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("Permission denied: {}", path);
        Self::new(BrowseErrorKind::PermissionDenied, Some(path), message)
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("Not found: {}", path);
        Self::new(BrowseErrorKind::NotFound, Some(path), message)
    }

    pub fn scan_failed(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(BrowseErrorKind::ScanFailed, Some(path.into()), message)
    }

    pub fn invalid_name(name: &str, reason: &str) -> Self {
        Self::new(
            BrowseErrorKind::InvalidName,
            None,
            format!("Invalid name {:?}: {}", name, reason),
        )
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(BrowseErrorKind::InvalidState, None, message)
    }

    pub fn already_exists(path: impl Into<String>) -> Self {
        let path = path.into();
        let message = format!("Destination already exists: {}", path);
        Self::new(BrowseErrorKind::AlreadyExists, Some(path), message)
    }

    /// Attach a path if none is set yet
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        if self.path.is_none() {
            self.path = Some(path.into());
        }
        self
    }

    /// True for signals that hosts must not present as failures
    pub fn is_benign(&self) -> bool {
        self.kind == BrowseErrorKind::PickerCancelled
    }

    /// Re-label a directory read failure as a scan failure, keeping
    /// permission errors distinguishable.
    pub(crate) fn into_scan_failure(self) -> Self {
        match self.kind {
            BrowseErrorKind::PermissionDenied | BrowseErrorKind::ScanFailed => self,
            _ => Self {
                kind: BrowseErrorKind::ScanFailed,
                ..self
            },
        }
    }
}

impl From<std::io::Error> for BrowseError {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::PermissionDenied => BrowseErrorKind::PermissionDenied,
            std::io::ErrorKind::NotFound => BrowseErrorKind::NotFound,
            std::io::ErrorKind::AlreadyExists => BrowseErrorKind::AlreadyExists,
            _ => BrowseErrorKind::Unknown,
        };
        Self::new(kind, None, err.to_string())
    }
}

impl From<walkdir::Error> for BrowseError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(|p| p.to_string_lossy().to_string());
        let message = err.to_string();
        let kind = match err.io_error().map(|e| e.kind()) {
            Some(std::io::ErrorKind::PermissionDenied) => BrowseErrorKind::PermissionDenied,
            Some(std::io::ErrorKind::NotFound) => BrowseErrorKind::NotFound,
            _ => BrowseErrorKind::ScanFailed,
        };
        Self::new(kind, path, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_mapping() {
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope");
        assert_eq!(BrowseError::from(denied).kind, BrowseErrorKind::PermissionDenied);

        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(BrowseError::from(missing).kind, BrowseErrorKind::NotFound);

        let taken = std::io::Error::new(std::io::ErrorKind::AlreadyExists, "taken");
        assert_eq!(BrowseError::from(taken).kind, BrowseErrorKind::AlreadyExists);

        let other = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        assert_eq!(BrowseError::from(other).kind, BrowseErrorKind::Unknown);
    }

    #[test]
    fn test_scan_failure_relabel() {
        let err = BrowseError::not_found("root/a").into_scan_failure();
        assert_eq!(err.kind, BrowseErrorKind::ScanFailed);
        assert_eq!(err.path.as_deref(), Some("root/a"));

        let denied = BrowseError::permission_denied("root/b").into_scan_failure();
        assert_eq!(denied.kind, BrowseErrorKind::PermissionDenied);
    }

    #[test]
    fn test_picker_cancelled_is_benign() {
        assert!(BrowseError::picker_cancelled().is_benign());
        assert!(!BrowseError::not_found("x").is_benign());
    }

    #[test]
    fn test_with_path_keeps_existing() {
        let err = BrowseError::not_found("first").with_path("second");
        assert_eq!(err.path.as_deref(), Some("first"));

        let err = BrowseError::invalid_state("done").with_path("set");
        assert_eq!(err.path.as_deref(), Some("set"));
    }
}
