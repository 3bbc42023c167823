//! Lazy tree scanning.
//!
//! Walks a root directory top-down and yields every regular file the
//! [`Selector`] accepts. The walk is pull-based: each call to `next()` reads
//! only as many directory entries as it takes to find one more selected
//! file (or one unreadable entry). Dropping the [`Scan`] closes any
//! directory handles it still holds.
//!
//! Symbolic links to directories are never followed, so cyclic links
//! cannot make the walk loop. A link whose target is a regular file is
//! treated as a regular file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::{ScanEntryError, SelectError, SelectResult};
use crate::filter::Selector;

/// How a selected file's path is rendered for output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PathRendering {
    /// Absolute path under the canonical root.
    #[default]
    Absolute,
    /// Path relative to the root.
    Relative,
}

/// Scan configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Visit siblings in file-name order instead of directory order.
    pub sorted: bool,
}

/// A file chosen by the selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SelectedFile {
    absolute: PathBuf,
    relative: PathBuf,
}

impl SelectedFile {
    /// Absolute path (root joined with the relative path).
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Path relative to the scan root; this is what the patterns saw.
    pub fn relative(&self) -> &Path {
        &self.relative
    }

    pub fn render(&self, rendering: PathRendering) -> &Path {
        match rendering {
            PathRendering::Absolute => &self.absolute,
            PathRendering::Relative => &self.relative,
        }
    }
}

/// A selector bound to a canonical root directory.
#[derive(Debug, Clone)]
pub struct TreeScanner {
    root: PathBuf,
    selector: Selector,
    options: ScanOptions,
}

impl TreeScanner {
    /// Bind `selector` to `root`.
    ///
    /// The root is canonicalized and must be a readable directory; anything
    /// else is [`SelectError::RootUnavailable`].
    pub fn new(root: &Path, selector: Selector) -> SelectResult<Self> {
        let canonical =
            fs::canonicalize(root).map_err(|e| SelectError::root_unavailable(root, e))?;
        if !canonical.is_dir() {
            return Err(SelectError::root_unavailable(
                root,
                io::Error::other("not a directory"),
            ));
        }
        // Probe readability up front so an unreadable root is fatal rather
        // than a per-entry error.
        let _probe =
            fs::read_dir(&canonical).map_err(|e| SelectError::root_unavailable(root, e))?;

        Ok(TreeScanner {
            root: canonical,
            selector,
            options: ScanOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Compile `patterns` (default set if empty) and start scanning `root`.
    pub fn scan<S: AsRef<str>>(root: &Path, patterns: &[S]) -> SelectResult<Scan> {
        let selector = Selector::compile(patterns)?;
        Ok(TreeScanner::new(root, selector)?.into_iter())
    }

    /// The canonical root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

impl IntoIterator for TreeScanner {
    type Item = Result<SelectedFile, ScanEntryError>;
    type IntoIter = Scan;

    fn into_iter(self) -> Scan {
        let mut walk = WalkDir::new(&self.root).follow_links(false);
        if self.options.sorted {
            walk = walk.sort_by_file_name();
        }
        debug!(root = %self.root.display(), patterns = self.selector.patterns().len(), "starting scan");
        Scan {
            root: self.root,
            selector: self.selector,
            walker: walk.into_iter(),
        }
    }
}

/// Single-pass iterator over selected files.
///
/// Unreadable entries surface as `Err` items and the walk continues.
#[derive(Debug)]
pub struct Scan {
    root: PathBuf,
    selector: Selector,
    walker: walkdir::IntoIter,
}

impl Iterator for Scan {
    type Item = Result<SelectedFile, ScanEntryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walker.next()? {
                Ok(entry) => entry,
                Err(err) => {
                    let err = ScanEntryError::from(err);
                    warn!(error = %err, "skipping unreadable entry");
                    return Some(Err(err));
                }
            };

            if !is_regular_file(&entry) {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };

            if self.selector.matches(relative) {
                let relative = relative.to_path_buf();
                return Some(Ok(SelectedFile {
                    absolute: entry.into_path(),
                    relative,
                }));
            }
        }
    }
}

fn is_regular_file(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    if file_type.is_symlink() {
        return fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false);
    }
    false
}

// ============================================================================
// Tests
// ============================================================================
