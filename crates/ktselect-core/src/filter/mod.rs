//! File selection patterns.
//!
//! This module decides which files are handed to the lint/format engine.
//! It supports:
//! - Glob patterns (`*`, `**`, `?`, `[abc]`, `{a,b}`) and `regex:` patterns
//! - Inclusion and `!`-prefixed exclusion patterns, applied in order
//! - A default `**/*.kt` + `**/*.kts` set when no pattern is given
//!
//! ## Usage
//!
//! ```
//! use ktselect_core::filter::Selector;
//! use std::path::Path;
//!
//! let selector = Selector::compile(&["src/**/*.kt", "!src/test/resources/**"]).unwrap();
//!
//! assert!(selector.matches(Path::new("src/main/App.kt")));
//! assert!(!selector.matches(Path::new("src/test/resources/Fixture.kt")));
//! ```

mod glob;
mod pattern;
mod selector;

pub use glob::{glob_to_regex, GlobSyntaxError};
pub use pattern::{Pattern, PatternSet, Polarity, Syntax, DEFAULT_PATTERNS};
pub use selector::{Selector, Verdict};
