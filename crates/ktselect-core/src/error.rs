//! Error types and error code constants for ktselect.
//!
//! This module provides the error taxonomy of the selection engine and
//! maps each kind onto a stable process exit code.
//!
//! ## Error Code Mapping
//!
//! - `1`: Findings reported (lint completed, but files have violations)
//! - `2`: Invalid arguments (malformed pattern, bad flag value)
//! - `3`: Resolution errors (missing archive, unavailable root)
//! - `10`: Internal errors (I/O outside the scan, unexpected state)
//!
//! ## Design
//!
//! - **Fatal vs recoverable**: `SelectError` aborts the invocation before
//!   any file is processed; `ScanEntryError` is reported per entry and the
//!   walk continues.
//! - **Code mapping**: `OutputErrorCode` provides stable integer codes for
//!   exit status and JSON output.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Error codes for exit status and JSON output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Lint ran to completion and reported at least one finding.
    FindingsReported = 1,
    /// Invalid arguments from caller (malformed pattern, bad flag value).
    InvalidArguments = 2,
    /// Resolution errors (missing archive, unavailable root).
    ResolutionError = 3,
    /// Internal errors (I/O outside the scan, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Fatal Errors
// ============================================================================

/// Fatal errors of the selection step.
///
/// Every variant aborts the invocation before any lint/format work starts.
#[derive(Debug, Error)]
pub enum SelectError {
    /// A pattern failed to compile under its declared syntax.
    #[error("invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// A rule-module archive path does not exist on disk.
    ///
    /// `path` is the argument as the user supplied it.
    #[error("{path} does not exist")]
    MissingArchive { path: String },

    /// The scan root cannot be opened.
    #[error("cannot open root directory {}: {source}", .path.display())]
    RootUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Invalid arguments that are not patterns (e.g. malformed `key=value`).
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    /// IO error outside the directory walk.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SelectError {
    /// Create an invalid pattern error.
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        SelectError::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        SelectError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a root unavailable error.
    pub fn root_unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SelectError::RootUnavailable {
            path: path.into(),
            source,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

impl From<&SelectError> for OutputErrorCode {
    fn from(err: &SelectError) -> Self {
        match err {
            SelectError::InvalidPattern { .. } => OutputErrorCode::InvalidArguments,
            SelectError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            SelectError::MissingArchive { .. } => OutputErrorCode::ResolutionError,
            SelectError::RootUnavailable { .. } => OutputErrorCode::ResolutionError,
            SelectError::Io(_) => OutputErrorCode::InternalError,
        }
    }
}

/// Result type for selection operations.
pub type SelectResult<T> = Result<T, SelectError>;

// ============================================================================
// Recoverable Errors
// ============================================================================

/// An entry that could not be read during the walk.
///
/// The scanner yields this in place of the entry and keeps going.
#[derive(Debug, Error)]
#[error("{}: {message}", display_entry_path(.path))]
pub struct ScanEntryError {
    /// Path of the entry, when the walker knows it.
    pub path: Option<PathBuf>,
    /// Depth below the root at which the failure happened.
    pub depth: usize,
    /// Human-readable cause.
    pub message: String,
}

impl ScanEntryError {
    pub fn new(path: Option<PathBuf>, depth: usize, message: impl Into<String>) -> Self {
        ScanEntryError {
            path,
            depth,
            message: message.into(),
        }
    }
}

impl From<walkdir::Error> for ScanEntryError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(Path::to_path_buf);
        let depth = err.depth();
        let message = match err.io_error() {
            Some(io_err) => io_err.to_string(),
            None => err.to_string(),
        };
        ScanEntryError {
            path,
            depth,
            message,
        }
    }
}

fn display_entry_path(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => p.display().to_string(),
        None => "<unknown entry>".to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_pattern_maps_to_invalid_arguments() {
            let err = SelectError::invalid_pattern("[abc", "missing ']'");
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn missing_archive_maps_to_resolution_error() {
            let err = SelectError::MissingArchive {
                path: "rules.jar".to_string(),
            };
            assert_eq!(err.error_code(), OutputErrorCode::ResolutionError);
        }

        #[test]
        fn root_unavailable_maps_to_resolution_error() {
            let err = SelectError::root_unavailable(
                "/nope",
                io::Error::new(io::ErrorKind::NotFound, "gone"),
            );
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn io_maps_to_internal_error() {
            let err = SelectError::from(io::Error::other("boom"));
            assert_eq!(err.error_code(), OutputErrorCode::InternalError);
        }
    }

    mod display {
        use super::*;

        #[test]
        fn missing_archive_names_the_path() {
            let err = SelectError::MissingArchive {
                path: "~/rules.jar".to_string(),
            };
            assert_eq!(err.to_string(), "~/rules.jar does not exist");
        }

        #[test]
        fn invalid_pattern_carries_raw_text() {
            let err = SelectError::invalid_pattern("regex:(", "unclosed group");
            assert!(err.to_string().contains("regex:("));
        }

        #[test]
        fn scan_entry_error_without_path() {
            let err = ScanEntryError::new(None, 2, "permission denied");
            assert_eq!(err.to_string(), "<unknown entry>: permission denied");
        }
    }
}
