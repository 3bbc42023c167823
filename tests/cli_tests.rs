//! Integration tests for the CLI helpers and the lint/format drivers.

use std::cell::RefCell;
use std::fs;
use std::path::Path;

use ktselect::cli::{
    build_scanner, list_files, parse_user_data, resolve_rule_sets, run_exit_code, run_format,
    run_lint, write_list_text,
};
use ktselect::engine::{Engine, EngineOptions, EngineParams, Finding, SourceKind};
use ktselect::error::SelectError;
use ktselect::output::emit_response;
use ktselect::scan::{PathRendering, ScanOptions};
use tempfile::TempDir;

// ============================================================================
// Support
// ============================================================================

fn create_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (file, contents) in files {
        let path = dir.path().join(file);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
    }
    dir
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug)]
struct FakeEngineError(String);

impl std::fmt::Display for FakeEngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for FakeEngineError {}

/// Flags `TODO` lines and formats by collapsing double spaces.
///
/// Files whose text contains `BOOM` make the engine fail.
#[derive(Default)]
struct FakeEngine {
    calls: RefCell<Vec<(String, bool)>>,
}

impl FakeEngine {
    fn findings(text: &str) -> Vec<Finding> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| line.contains("TODO") || line.contains("  "))
            .map(|(i, line)| Finding {
                line: i as u32 + 1,
                col: 1,
                rule_id: if line.contains("TODO") { "no-todo" } else { "no-multi-spaces" }
                    .to_string(),
                detail: line.trim().to_string(),
                can_be_autocorrected: !line.contains("TODO"),
            })
            .collect()
    }
}

impl Engine for FakeEngine {
    type Error = FakeEngineError;

    fn lint(
        &self,
        params: &EngineParams<'_>,
        on_finding: &mut dyn FnMut(&Finding),
    ) -> Result<(), FakeEngineError> {
        self.calls
            .borrow_mut()
            .push((params.file_name.to_string(), params.script));
        if params.text.contains("BOOM") {
            return Err(FakeEngineError("engine crashed".to_string()));
        }
        for finding in Self::findings(params.text) {
            on_finding(&finding);
        }
        Ok(())
    }

    fn format(
        &self,
        params: &EngineParams<'_>,
        on_finding: &mut dyn FnMut(&Finding, bool),
    ) -> Result<String, FakeEngineError> {
        if params.text.contains("BOOM") {
            return Err(FakeEngineError("engine crashed".to_string()));
        }
        for finding in Self::findings(params.text) {
            let corrected = finding.can_be_autocorrected;
            on_finding(&finding, corrected);
        }
        Ok(params.text.replace("  ", " "))
    }
}

// ============================================================================
// Listing
// ============================================================================

#[test]
fn list_uses_default_patterns_without_arguments() {
    let dir = create_tree(&[
        ("src/App.kt", ""),
        ("build.gradle.kts", ""),
        ("README.md", ""),
    ]);
    let response = list_files(
        dir.path(),
        &[],
        None,
        PathRendering::Relative,
        ScanOptions { sorted: true },
        false,
    )
    .unwrap();

    let paths: Vec<_> = response
        .files
        .iter()
        .map(|f| (f.path.replace('\\', "/"), f.kind))
        .collect();
    assert_eq!(
        paths,
        vec![
            ("build.gradle.kts".to_string(), SourceKind::Script),
            ("src/App.kt".to_string(), SourceKind::Source),
        ]
    );
}

#[test]
fn list_explain_names_selecting_pattern() {
    let dir = create_tree(&[("gen/keep/A.kt", ""), ("gen/B.kt", ""), ("C.kt", "")]);
    let patterns = strings(&["**.kt", "!gen/**", "gen/keep/**"]);
    let response = list_files(
        dir.path(),
        &patterns,
        None,
        PathRendering::Relative,
        ScanOptions { sorted: true },
        true,
    )
    .unwrap();

    let explained: Vec<_> = response
        .files
        .iter()
        .map(|f| (f.path.replace('\\', "/"), f.decided_by.clone().unwrap()))
        .collect();
    assert_eq!(
        explained,
        vec![
            ("C.kt".to_string(), "**.kt".to_string()),
            ("gen/keep/A.kt".to_string(), "gen/keep/**".to_string()),
        ]
    );

    let mut out = Vec::new();
    let mut err = Vec::new();
    write_list_text(&response, &mut out, &mut err).unwrap();
    let text = String::from_utf8(out).unwrap();
    assert!(text.lines().any(|l| l.ends_with("\tgen/keep/**")));
    assert!(err.is_empty());
}

#[test]
fn list_absolute_rendering_is_under_canonical_root() {
    let dir = create_tree(&[("A.kt", "")]);
    let response = list_files(
        dir.path(),
        &[],
        None,
        PathRendering::Absolute,
        ScanOptions::default(),
        false,
    )
    .unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    assert_eq!(response.root, root.display().to_string());
    assert_eq!(Path::new(&response.files[0].path), root.join("A.kt"));
}

#[test]
fn list_json_shape() {
    let dir = create_tree(&[("A.kt", "")]);
    let response = list_files(
        dir.path(),
        &[],
        None,
        PathRendering::Relative,
        ScanOptions::default(),
        false,
    )
    .unwrap();
    let mut buf = Vec::new();
    emit_response(&response, &mut buf).unwrap();
    let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["files"][0]["path"], "A.kt");
    assert_eq!(json["files"][0]["kind"], "source");
}

#[test]
fn list_rejects_malformed_pattern() {
    let dir = create_tree(&[("A.kt", "")]);
    let err = list_files(
        dir.path(),
        &strings(&["src/{a,b"]),
        None,
        PathRendering::Relative,
        ScanOptions::default(),
        false,
    )
    .unwrap_err();
    assert!(matches!(err, SelectError::InvalidPattern { .. }));
    assert_eq!(err.error_code().code(), 2);
}

// ============================================================================
// Engine configuration
// ============================================================================

#[test]
fn user_data_parsing() {
    let data = parse_user_data(&strings(&["android=true", "max_line_length=120", "empty="]))
        .unwrap();
    assert_eq!(data.get("android").map(String::as_str), Some("true"));
    assert_eq!(data.get("max_line_length").map(String::as_str), Some("120"));
    assert_eq!(data.get("empty").map(String::as_str), Some(""));

    assert!(parse_user_data(&strings(&["novalue"])).is_err());
    assert!(parse_user_data(&strings(&["=x"])).is_err());
}

#[test]
fn missing_rule_archive_is_fatal() {
    let dir = create_tree(&[("rules/present.jar", "PK")]);
    let present = dir.path().join("rules/present.jar").display().to_string();
    let missing = dir.path().join("rules/absent.jar").display().to_string();

    let sets = resolve_rule_sets(&[present.clone()], None).unwrap();
    assert_eq!(sets[0].id, "present");

    let err = resolve_rule_sets(&[present, missing.clone()], None).unwrap_err();
    assert_eq!(err.to_string(), format!("{} does not exist", missing));
    assert_eq!(err.error_code().code(), 3);
}

// ============================================================================
// Drivers
// ============================================================================

#[test]
fn lint_reports_findings_per_file() {
    let dir = create_tree(&[
        ("src/A.kt", "fun a() {}\n// TODO later\n"),
        ("src/B.kt", "fun b() {}\n"),
        ("build.gradle.kts", "plugins {  }\n"),
    ]);
    let engine = FakeEngine::default();
    let scanner = build_scanner(dir.path(), &[], None, ScanOptions { sorted: true }).unwrap();

    let response = run_lint(
        &engine,
        scanner.into_iter(),
        PathRendering::Relative,
        &EngineOptions::default(),
    );

    assert_eq!(response.mode, "lint");
    assert_eq!(response.files.len(), 3);
    let by_path: Vec<_> = response
        .files
        .iter()
        .map(|r| (r.path.replace('\\', "/"), r.findings.len()))
        .collect();
    assert_eq!(
        by_path,
        vec![
            ("build.gradle.kts".to_string(), 1),
            ("src/A.kt".to_string(), 1),
            ("src/B.kt".to_string(), 0),
        ]
    );
    assert_eq!(response.outstanding(), 2);
    assert_eq!(run_exit_code(&response), 1);

    let calls = engine.calls.borrow();
    assert!(calls.iter().any(|(name, script)| name.ends_with("kts") && *script));
    assert!(calls.iter().any(|(name, script)| name.ends_with("A.kt") && !*script));
}

#[test]
fn lint_engine_failure_does_not_stop_other_files() {
    let dir = create_tree(&[("A.kt", "BOOM\n"), ("B.kt", "// TODO\n")]);
    let engine = FakeEngine::default();
    let scanner = build_scanner(dir.path(), &[], None, ScanOptions { sorted: true }).unwrap();

    let response = run_lint(
        &engine,
        scanner.into_iter(),
        PathRendering::Relative,
        &EngineOptions::default(),
    );
    assert_eq!(response.files[0].error.as_deref(), Some("engine crashed"));
    assert_eq!(response.files[1].findings.len(), 1);
    assert!(response.files[1].error.is_none());
}

#[test]
fn clean_lint_exits_zero() {
    let dir = create_tree(&[("A.kt", "fun a() {}\n")]);
    let engine = FakeEngine::default();
    let scanner = build_scanner(dir.path(), &[], None, ScanOptions::default()).unwrap();
    let response = run_lint(
        &engine,
        scanner.into_iter(),
        PathRendering::Relative,
        &EngineOptions::default(),
    );
    assert_eq!(run_exit_code(&response), 0);
}

#[test]
fn format_rewrites_only_changed_files() {
    let dir = create_tree(&[
        ("A.kt", "val  x = 1\n"),
        ("B.kt", "val y = 2\n"),
        ("C.kt", "// TODO\n"),
    ]);
    let engine = FakeEngine::default();
    let scanner = build_scanner(dir.path(), &[], None, ScanOptions { sorted: true }).unwrap();

    let response = run_format(
        &engine,
        scanner.into_iter(),
        PathRendering::Relative,
        &EngineOptions::default(),
    );

    assert_eq!(response.mode, "format");
    assert_eq!(fs::read_to_string(dir.path().join("A.kt")).unwrap(), "val x = 1\n");
    assert_eq!(fs::read_to_string(dir.path().join("B.kt")).unwrap(), "val y = 2\n");

    let rewritten: Vec<_> = response.files.iter().map(|r| r.rewritten).collect();
    assert_eq!(rewritten, vec![true, false, false]);

    // The multi-space finding was corrected; the TODO remains.
    assert_eq!(response.outstanding(), 1);
    assert_eq!(run_exit_code(&response), 1);
}

#[test]
fn format_respects_exclusions() {
    let dir = create_tree(&[("src/A.kt", "val  a = 1\n"), ("gen/G.kt", "val  g = 1\n")]);
    let engine = FakeEngine::default();
    let scanner = build_scanner(
        dir.path(),
        &strings(&["**.kt", "!gen/**"]),
        None,
        ScanOptions::default(),
    )
    .unwrap();

    let response = run_format(
        &engine,
        scanner.into_iter(),
        PathRendering::Relative,
        &EngineOptions::default(),
    );
    assert_eq!(response.files.len(), 1);
    assert_eq!(
        fs::read_to_string(dir.path().join("gen/G.kt")).unwrap(),
        "val  g = 1\n"
    );
}
