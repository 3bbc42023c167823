//! Core infrastructure for ktselect.
//!
//! This crate provides the file-selection engine used by the Kotlin
//! lint/format front end:
//! - Ordered include/exclude pattern sets (glob and regex syntax)
//! - The ordered override selector that decides whether a path is chosen
//! - A lazy, top-down tree scanner that applies the selector to every file
//! - Home-directory expansion and rule-module archive resolution
//! - The engine seam that lint/format implementations plug into
//! - Error types, exit codes, and JSON output types for CLI responses

pub mod engine;
pub mod error;
pub mod filter;
pub mod output;
pub mod paths;
pub mod scan;
