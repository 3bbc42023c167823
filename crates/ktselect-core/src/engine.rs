//! Lint/format engine seam.
//!
//! The engine that actually lints or formats Kotlin lives outside this
//! crate. This module defines the [`Engine`] trait it plugs in through, the
//! per-file parameters handed to it, and the helpers that derive those
//! parameters from a selected file.
//!
//! # Script detection
//!
//! A file is linted as ordinary source only when its name ends in `.kt`
//! (case-insensitively). Every other selected file, `.kts` included, is
//! handed to the engine as a script.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::paths::ArchiveLocator;

/// How the engine should parse a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Ordinary `.kt` source.
    Source,
    /// Kotlin script (`.kts` or anything else that was selected).
    Script,
}

impl SourceKind {
    pub fn from_file_name(file_name: &str) -> Self {
        let is_kt = file_name
            .len()
            .checked_sub(3)
            .and_then(|start| file_name.get(start..))
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".kt"));
        if is_kt {
            SourceKind::Source
        } else {
            SourceKind::Script
        }
    }

    pub fn is_script(self) -> bool {
        self == SourceKind::Script
    }
}

/// A problem reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub line: u32,
    pub col: u32,
    pub rule_id: String,
    pub detail: String,
    pub can_be_autocorrected: bool,
}

/// A set of rules the engine should apply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    pub id: String,
    /// Archive the rules were loaded from; `None` for built-in sets.
    pub archive: Option<ArchiveLocator>,
}

impl RuleSet {
    pub fn builtin(id: impl Into<String>) -> Self {
        RuleSet {
            id: id.into(),
            archive: None,
        }
    }

    pub fn from_archive(archive: ArchiveLocator) -> Self {
        let id = archive
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| archive.arg.clone());
        RuleSet {
            id,
            archive: Some(archive),
        }
    }
}

/// Invocation-wide engine settings.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    pub rule_sets: Vec<RuleSet>,
    /// Free-form key/value data passed through to rules.
    pub user_data: BTreeMap<String, String>,
    pub editorconfig_path: Option<PathBuf>,
    pub debug: bool,
}

/// Everything the engine receives for one file.
#[derive(Debug, Clone, Copy)]
pub struct EngineParams<'a> {
    pub file_name: &'a str,
    pub text: &'a str,
    pub rule_sets: &'a [RuleSet],
    pub user_data: &'a BTreeMap<String, String>,
    pub editorconfig_path: Option<&'a Path>,
    pub debug: bool,
    pub script: bool,
}

impl<'a> EngineParams<'a> {
    pub fn new(file_name: &'a str, text: &'a str, options: &'a EngineOptions) -> Self {
        EngineParams {
            file_name,
            text,
            rule_sets: &options.rule_sets,
            user_data: &options.user_data,
            editorconfig_path: options.editorconfig_path.as_deref(),
            debug: options.debug,
            script: SourceKind::from_file_name(file_name).is_script(),
        }
    }
}

/// A lint/format implementation.
pub trait Engine {
    /// The error type for this engine.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Lint one file, reporting each finding through `on_finding`.
    fn lint(
        &self,
        params: &EngineParams<'_>,
        on_finding: &mut dyn FnMut(&Finding),
    ) -> Result<(), Self::Error>;

    /// Format one file and return the corrected text.
    ///
    /// `on_finding` receives each finding and whether it was corrected.
    fn format(
        &self,
        params: &EngineParams<'_>,
        on_finding: &mut dyn FnMut(&Finding, bool),
    ) -> Result<String, Self::Error>;
}

/// Lint a Kotlin source or script file.
pub fn lint_file<E: Engine + ?Sized>(
    engine: &E,
    file_name: &str,
    contents: &str,
    options: &EngineOptions,
    on_finding: &mut dyn FnMut(&Finding),
) -> Result<(), E::Error> {
    let params = EngineParams::new(file_name, contents, options);
    engine.lint(&params, on_finding)
}

/// Format a Kotlin source or script file.
pub fn format_file<E: Engine + ?Sized>(
    engine: &E,
    file_name: &str,
    contents: &str,
    options: &EngineOptions,
    on_finding: &mut dyn FnMut(&Finding, bool),
) -> Result<String, E::Error> {
    let params = EngineParams::new(file_name, contents, options);
    engine.format(&params, on_finding)
}

// ============================================================================
// Tests
// ============================================================================
