//! JSON output types and serialization for CLI responses.
//!
//! ## Design Principles
//!
//! 1. **Status first:** Every response has `status` as first field
//! 2. **Deterministic:** Same input -> same output (field order, array ordering)
//! 3. **Nullable vs absent:** absent field means "not applicable"
//! 4. **Versioned:** Schema version in response enables forward compatibility

use std::io::{self, Write};

use serde::Serialize;

use crate::engine::{Finding, SourceKind};
use crate::error::{OutputErrorCode, ScanEntryError, SelectError};
use crate::paths::ArchiveLocator;
use crate::scan::PathRendering;

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Selection
// ============================================================================

/// One selected file in a listing.
#[derive(Debug, Clone, Serialize)]
pub struct SelectedFileInfo {
    /// Path in the requested rendering.
    pub path: String,
    /// How the engine would parse the file.
    pub kind: SourceKind,
    /// Pattern that selected the file (only with `--explain`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
}

/// An entry the scan could not read.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedEntry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Depth below the root (the root itself is 0).
    pub depth: usize,
    pub message: String,
}

impl From<&ScanEntryError> for SkippedEntry {
    fn from(err: &ScanEntryError) -> Self {
        SkippedEntry {
            path: err.path.as_ref().map(|p| p.display().to_string()),
            depth: err.depth,
            message: err.message.clone(),
        }
    }
}

/// Response for the list command.
#[derive(Debug, Clone, Serialize)]
pub struct ListResponse {
    pub status: String,
    pub schema_version: String,
    /// Canonical scan root.
    pub root: String,
    pub rendering: PathRendering,
    pub files: Vec<SelectedFileInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

impl ListResponse {
    pub fn new(
        root: impl Into<String>,
        rendering: PathRendering,
        files: Vec<SelectedFileInfo>,
        skipped: Vec<SkippedEntry>,
    ) -> Self {
        ListResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            root: root.into(),
            rendering,
            files,
            skipped,
        }
    }
}

/// Response for the archives command.
#[derive(Debug, Clone, Serialize)]
pub struct ArchivesResponse {
    pub status: String,
    pub schema_version: String,
    pub archives: Vec<ArchiveLocator>,
}

impl ArchivesResponse {
    pub fn new(archives: Vec<ArchiveLocator>) -> Self {
        ArchivesResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            archives,
        }
    }
}

// ============================================================================
// Lint / Format
// ============================================================================

/// A finding attached to a file report.
#[derive(Debug, Clone, Serialize)]
pub struct FindingInfo {
    #[serde(flatten)]
    pub finding: Finding,
    /// Whether format corrected it (absent for lint).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected: Option<bool>,
}

impl FindingInfo {
    /// A finding reported by lint.
    pub fn linted(finding: &Finding) -> Self {
        FindingInfo {
            finding: finding.clone(),
            corrected: None,
        }
    }

    /// A finding reported by format, with whether it was corrected.
    pub fn formatted(finding: &Finding, corrected: bool) -> Self {
        FindingInfo {
            finding: finding.clone(),
            corrected: Some(corrected),
        }
    }
}

/// Per-file result of a lint or format run.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: String,
    pub findings: Vec<FindingInfo>,
    /// Whether format rewrote the file.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub rewritten: bool,
    /// Read or engine failure for this file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn new(path: impl Into<String>) -> Self {
        FileReport {
            path: path.into(),
            findings: Vec::new(),
            rewritten: false,
            error: None,
        }
    }

    /// Findings that remain after the run.
    pub fn outstanding(&self) -> usize {
        self.findings
            .iter()
            .filter(|f| f.corrected != Some(true))
            .count()
    }
}

/// Response for the lint and format commands.
#[derive(Debug, Clone, Serialize)]
pub struct RunResponse {
    pub status: String,
    pub schema_version: String,
    /// `lint` or `format`.
    pub mode: String,
    pub files: Vec<FileReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedEntry>,
}

impl RunResponse {
    pub fn new(mode: impl Into<String>, files: Vec<FileReport>, skipped: Vec<SkippedEntry>) -> Self {
        RunResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            mode: mode.into(),
            files,
            skipped,
        }
    }

    /// Total findings still present after the run.
    pub fn outstanding(&self) -> usize {
        self.files.iter().map(FileReport::outstanding).sum()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Error information for error responses.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    /// Numeric error code.
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    pub fn from_error(err: &SelectError) -> Self {
        let code = OutputErrorCode::from(err).code();
        let details = match err {
            SelectError::InvalidPattern { pattern, .. } => {
                Some(serde_json::json!({ "pattern": pattern }))
            }
            SelectError::MissingArchive { path } => Some(serde_json::json!({ "path": path })),
            SelectError::RootUnavailable { path, .. } => {
                Some(serde_json::json!({ "root": path.display().to_string() }))
            }
            SelectError::InvalidArguments { .. } | SelectError::Io(_) => None,
        };
        ErrorInfo {
            code,
            message: err.to_string(),
            details,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn new(err: &SelectError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emission
// ============================================================================

/// Emit a response as pretty JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

// ============================================================================
// Tests
// ============================================================================
