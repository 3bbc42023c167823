//! Pattern compilation.
//!
//! A raw pattern is `[syntax:][!]body`, where `syntax` is `glob` or
//! `regex` (default `glob`) and a leading `!` turns the pattern into an
//! exclusion. Patterns are kept in the order they were supplied.

use std::borrow::Cow;
use std::path::Path;

use regex::Regex;
use tracing::debug;

use super::glob::{compile_glob, LeadingGlobstar};
use crate::error::{SelectError, SelectResult};
use crate::paths::expand_tilde;

/// Patterns used when the caller supplies none.
pub const DEFAULT_PATTERNS: &[&str] = &["**/*.kt", "**/*.kts"];

const REGEX_PREFIX: &str = "regex:";
const GLOB_PREFIX: &str = "glob:";

/// Whether a pattern selects or deselects the paths it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Include,
    Exclude,
}

/// Matching syntax of a pattern body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Glob,
    Regex,
}

/// One compiled inclusion or exclusion rule.
#[derive(Debug, Clone)]
pub struct Pattern {
    polarity: Polarity,
    syntax: Syntax,
    matcher: Regex,
    raw: String,
}

impl Pattern {
    /// Compile a single raw pattern.
    pub fn compile(raw: &str) -> SelectResult<Self> {
        Self::compile_with(raw, LeadingGlobstar::Strict)
    }

    fn compile_with(raw: &str, leading: LeadingGlobstar) -> SelectResult<Self> {
        let (syntax, rest) = if let Some(rest) = raw.strip_prefix(REGEX_PREFIX) {
            (Syntax::Regex, rest)
        } else if let Some(rest) = raw.strip_prefix(GLOB_PREFIX) {
            (Syntax::Glob, rest)
        } else {
            (Syntax::Glob, raw)
        };

        let (polarity, body) = match rest.strip_prefix('!') {
            Some(body) => (Polarity::Exclude, body),
            None => (Polarity::Include, rest),
        };

        let matcher = match syntax {
            Syntax::Glob => compile_glob(body, leading),
            Syntax::Regex => Regex::new(&format!("^(?:{})$", body)).map_err(|e| e.to_string()),
        }
        .map_err(|message| SelectError::invalid_pattern(raw, message))?;

        debug!(pattern = raw, ?polarity, ?syntax, regex = matcher.as_str(), "compiled pattern");

        Ok(Pattern {
            polarity,
            syntax,
            matcher,
            raw: raw.to_string(),
        })
    }

    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    /// The pattern exactly as supplied.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Test a path against this pattern's matcher, ignoring polarity.
    ///
    /// The path must be expressed the same way the patterns are (relative
    /// patterns need relative paths).
    pub fn is_match(&self, path: &Path) -> bool {
        self.matcher.is_match(&path_text(path))
    }
}

/// The ordered, immutable list of compiled patterns for one invocation.
#[derive(Debug, Clone)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// Compile raw patterns in order.
    ///
    /// An empty list yields the default set (see [`DEFAULT_PATTERNS`]).
    /// The first pattern that fails to compile aborts the whole set.
    pub fn compile<S: AsRef<str>>(raw: &[S]) -> SelectResult<Self> {
        if raw.is_empty() {
            return Self::default_set();
        }
        let patterns = raw
            .iter()
            .map(|p| Pattern::compile(p.as_ref()))
            .collect::<SelectResult<Vec<_>>>()?;
        Ok(PatternSet { patterns })
    }

    /// Compile user-supplied pattern arguments.
    ///
    /// Each argument has a leading `~` (or `!~`) replaced with `home` before
    /// compilation. An empty list yields the default set, unexpanded.
    pub fn from_args<S: AsRef<str>>(raw: &[S], home: Option<&Path>) -> SelectResult<Self> {
        let expanded: Vec<String> = raw
            .iter()
            .map(|p| expand_tilde(p.as_ref(), home))
            .collect();
        Self::compile(&expanded)
    }

    /// The `**/*.kt` + `**/*.kts` include set.
    ///
    /// Unlike a user-supplied `**/*.kt`, the default patterns also select
    /// files directly under the root.
    pub fn default_set() -> SelectResult<Self> {
        let patterns = DEFAULT_PATTERNS
            .iter()
            .map(|p| Pattern::compile_with(p, LeadingGlobstar::Optional))
            .collect::<SelectResult<Vec<_>>>()?;
        Ok(PatternSet { patterns })
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.patterns.iter()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl<'a> IntoIterator for &'a PatternSet {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.patterns.iter()
    }
}

/// Render a path with `/` separators, the form patterns are written in.
pub(crate) fn path_text(path: &Path) -> Cow<'_, str> {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text
    } else {
        Cow::Owned(text.replace(std::path::MAIN_SEPARATOR, "/"))
    }
}

// ============================================================================
// Tests
// ============================================================================
