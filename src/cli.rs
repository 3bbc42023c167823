//! CLI front door.
//!
//! Command helpers behind the `ktselect` binary, usable by any front end
//! that embeds a lint/format engine:
//! - `list_files` - scan a root and describe every selected file
//! - `resolve_rule_sets` - validate rule-module archives before any scan
//! - `run_lint` / `run_format` - feed a scan through an [`Engine`]
//!
//! ## Error Handling
//!
//! Fatal conditions (bad pattern, missing archive, unusable root) are
//! returned as `SelectError` before any file is touched. Per-file problems
//! (unreadable entry, read failure, engine failure) are recorded in the
//! response and the run moves on to the next file.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, info, warn};

use ktselect_core::engine::{format_file, lint_file, Engine, EngineOptions, RuleSet, SourceKind};
use ktselect_core::error::{OutputErrorCode, SelectError};
use ktselect_core::filter::{PatternSet, Selector};
use ktselect_core::output::{
    FileReport, FindingInfo, ListResponse, RunResponse, SelectedFileInfo, SkippedEntry,
};
use ktselect_core::paths::resolve_archives;
use ktselect_core::scan::{PathRendering, Scan, ScanOptions, SelectedFile, TreeScanner};

// ============================================================================
// Selection
// ============================================================================

/// Compile user patterns and bind them to `root`.
///
/// Patterns are tilde-expanded against `home`; no patterns means the
/// default Kotlin set.
pub fn build_scanner(
    root: &Path,
    patterns: &[String],
    home: Option<&Path>,
    options: ScanOptions,
) -> Result<TreeScanner, SelectError> {
    let selector = Selector::new(PatternSet::from_args(patterns, home)?);
    Ok(TreeScanner::new(root, selector)?.with_options(options))
}

/// List the files selected under `root`.
///
/// With `explain`, each file carries the raw pattern that selected it.
pub fn list_files(
    root: &Path,
    patterns: &[String],
    home: Option<&Path>,
    rendering: PathRendering,
    options: ScanOptions,
    explain: bool,
) -> Result<ListResponse, SelectError> {
    let scanner = build_scanner(root, patterns, home, options)?;
    let root_text = scanner.root().display().to_string();
    let explainer = explain.then(|| scanner.selector().clone());

    let mut files = Vec::new();
    let mut skipped = Vec::new();
    for result in scanner {
        match result {
            Ok(file) => {
                let path = rendered(&file, rendering);
                let decided_by = explainer
                    .as_ref()
                    .and_then(|s| s.explain(file.relative()).decided_by);
                files.push(SelectedFileInfo {
                    kind: SourceKind::from_file_name(&path),
                    path,
                    decided_by,
                });
            }
            Err(err) => skipped.push(SkippedEntry::from(&err)),
        }
    }

    debug!(selected = files.len(), skipped = skipped.len(), "listed files");
    Ok(ListResponse::new(root_text, rendering, files, skipped))
}

/// Write a listing as plain text, one path per line.
///
/// Skipped entries go to `errors` so they never mix with paths.
pub fn write_list_text(
    response: &ListResponse,
    out: &mut impl Write,
    errors: &mut impl Write,
) -> io::Result<()> {
    for file in &response.files {
        match &file.decided_by {
            Some(pattern) => writeln!(out, "{}\t{}", file.path, pattern)?,
            None => writeln!(out, "{}", file.path)?,
        }
    }
    for entry in &response.skipped {
        match &entry.path {
            Some(path) => writeln!(errors, "warning: skipped {}: {}", path, entry.message)?,
            None => writeln!(errors, "warning: skipped entry: {}", entry.message)?,
        }
    }
    Ok(())
}

// ============================================================================
// Engine configuration
// ============================================================================

/// Resolve rule-module archives into rule sets.
///
/// The first archive that does not exist aborts with
/// [`SelectError::MissingArchive`].
pub fn resolve_rule_sets(
    archives: &[String],
    home: Option<&Path>,
) -> Result<Vec<RuleSet>, SelectError> {
    Ok(resolve_archives(archives, home)?
        .into_iter()
        .map(RuleSet::from_archive)
        .collect())
}

/// Parse `key=value` arguments into user data for the engine.
pub fn parse_user_data(pairs: &[String]) -> Result<BTreeMap<String, String>, SelectError> {
    pairs
        .iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(SelectError::invalid_args(format!(
                "invalid user data '{}', expected key=value",
                pair
            ))),
        })
        .collect()
}

// ============================================================================
// Lint / Format Drivers
// ============================================================================

/// Lint every file the scan yields.
pub fn run_lint<E: Engine + ?Sized>(
    engine: &E,
    scan: Scan,
    rendering: PathRendering,
    options: &EngineOptions,
) -> RunResponse {
    let mut reports = Vec::new();
    let mut skipped = Vec::new();

    for result in scan {
        let file = match result {
            Ok(file) => file,
            Err(err) => {
                skipped.push(SkippedEntry::from(&err));
                continue;
            }
        };
        let name = rendered(&file, rendering);
        let mut report = FileReport::new(name.clone());

        match fs::read_to_string(file.absolute()) {
            Ok(text) => {
                let result = lint_file(engine, &name, &text, options, &mut |finding| {
                    report.findings.push(FindingInfo::linted(finding))
                });
                if let Err(err) = result {
                    warn!(file = %name, error = %err, "lint failed");
                    report.error = Some(err.to_string());
                }
            }
            Err(err) => {
                warn!(file = %name, error = %err, "cannot read file");
                report.error = Some(err.to_string());
            }
        }
        reports.push(report);
    }

    info!(files = reports.len(), "lint finished");
    RunResponse::new("lint", reports, skipped)
}

/// Format every file the scan yields, writing back changed text.
pub fn run_format<E: Engine + ?Sized>(
    engine: &E,
    scan: Scan,
    rendering: PathRendering,
    options: &EngineOptions,
) -> RunResponse {
    let mut reports = Vec::new();
    let mut skipped = Vec::new();

    for result in scan {
        let file = match result {
            Ok(file) => file,
            Err(err) => {
                skipped.push(SkippedEntry::from(&err));
                continue;
            }
        };
        let name = rendered(&file, rendering);
        let mut report = FileReport::new(name.clone());

        let text = match fs::read_to_string(file.absolute()) {
            Ok(text) => text,
            Err(err) => {
                warn!(file = %name, error = %err, "cannot read file");
                report.error = Some(err.to_string());
                reports.push(report);
                continue;
            }
        };

        let result = format_file(engine, &name, &text, options, &mut |finding, corrected| {
            report.findings.push(FindingInfo::formatted(finding, corrected))
        });
        match result {
            Ok(formatted) if formatted != text => match fs::write(file.absolute(), formatted) {
                Ok(()) => {
                    debug!(file = %name, "rewrote file");
                    report.rewritten = true;
                }
                Err(err) => {
                    warn!(file = %name, error = %err, "cannot write file");
                    report.error = Some(err.to_string());
                }
            },
            Ok(_) => {}
            Err(err) => {
                warn!(file = %name, error = %err, "format failed");
                report.error = Some(err.to_string());
            }
        }
        reports.push(report);
    }

    info!(files = reports.len(), "format finished");
    RunResponse::new("format", reports, skipped)
}

/// Process exit code for a finished run.
///
/// Outstanding findings map to [`OutputErrorCode::FindingsReported`];
/// a clean run is `0`.
pub fn run_exit_code(response: &RunResponse) -> u8 {
    if response.outstanding() > 0 {
        OutputErrorCode::FindingsReported.code()
    } else {
        0
    }
}

fn rendered(file: &SelectedFile, rendering: PathRendering) -> String {
    file.render(rendering).to_string_lossy().into_owned()
}
