//! Ordered override evaluation of a pattern set.
//!
//! The verdict starts out unselected and is carried left to right through
//! the pattern list. While a path is unselected only include patterns are
//! consulted; while it is selected only exclude patterns are. A later
//! include can therefore re-select a path an earlier exclude dropped, and a
//! pattern that never matches a path has no effect on it.
//!
//! A list made only of exclusions selects nothing: there is no implicit
//! include-all.

use std::path::Path;

use tracing::trace;

use super::pattern::{Pattern, PatternSet, Polarity};
use crate::error::SelectResult;

/// Decision for a single path, with the pattern that settled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub selected: bool,
    /// Raw text of the last pattern that changed the state, if any did.
    pub decided_by: Option<String>,
}

/// Evaluates relative paths against an owned [`PatternSet`].
#[derive(Debug, Clone)]
pub struct Selector {
    patterns: PatternSet,
}

impl Selector {
    pub fn new(patterns: PatternSet) -> Self {
        Selector { patterns }
    }

    /// Compile raw patterns and wrap them.
    pub fn compile<S: AsRef<str>>(raw: &[S]) -> SelectResult<Self> {
        Ok(Selector::new(PatternSet::compile(raw)?))
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    /// Whether `path` is selected.
    ///
    /// The path must have the same cardinality as the patterns (relative
    /// patterns need a path relative to the scan root).
    pub fn matches(&self, path: &Path) -> bool {
        self.evaluate(path).0
    }

    /// Like [`Selector::matches`], also reporting which pattern decided.
    pub fn explain(&self, path: &Path) -> Verdict {
        let (selected, decided_by) = self.evaluate(path);
        Verdict {
            selected,
            decided_by: decided_by.map(|p| p.raw().to_string()),
        }
    }

    fn evaluate(&self, path: &Path) -> (bool, Option<&Pattern>) {
        let mut selected = false;
        let mut decided_by = None;

        for pattern in &self.patterns {
            match (selected, pattern.polarity()) {
                (true, Polarity::Exclude) => {
                    if pattern.is_match(path) {
                        selected = false;
                        decided_by = Some(pattern);
                    }
                }
                (false, Polarity::Include) => {
                    if pattern.is_match(path) {
                        selected = true;
                        decided_by = Some(pattern);
                    }
                }
                // Include while selected, exclude while unselected.
                (true, Polarity::Include) | (false, Polarity::Exclude) => {}
            }
        }

        trace!(path = %path.display(), selected, decided_by = decided_by.map(Pattern::raw), "evaluated path");
        (selected, decided_by)
    }
}

// ============================================================================
// Tests
// ============================================================================
