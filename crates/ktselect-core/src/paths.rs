//! Path argument helpers.
//!
//! Provides home-directory expansion for pattern and archive arguments and
//! resolution of rule-module archive paths into locators the engine can load.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::error::{SelectError, SelectResult};

/// The invoking user's home directory, if one can be determined.
pub fn home_dir() -> Option<PathBuf> {
    let home = dirs::home_dir();
    if home.is_none() {
        warn!("cannot determine home directory; '~' will not be expanded");
    }
    home
}

/// Replace a leading `~` (optionally preceded by `!`) with `home`.
///
/// Only the common `~/...` form is handled; `~user` is not looked up and
/// is expanded the same way. Without a home directory the argument is
/// returned unchanged.
pub fn expand_tilde(arg: &str, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return arg.to_string();
    };
    let (bang, rest) = match arg.strip_prefix('!') {
        Some(rest) => ("!", rest),
        None => ("", arg),
    };
    match rest.strip_prefix('~') {
        Some(tail) => format!("{}{}{}", bang, home.display(), tail),
        None => arg.to_string(),
    }
}

/// A rule-module archive that exists on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArchiveLocator {
    /// The argument as the user typed it.
    pub arg: String,
    /// Absolute path to the archive.
    pub path: PathBuf,
    /// `file://` URL for the archive.
    pub url: String,
}

impl ArchiveLocator {
    fn from_existing(arg: &str, path: PathBuf) -> SelectResult<Self> {
        let path = if path.is_absolute() {
            path
        } else {
            std::env::current_dir()?.join(path)
        };
        let url = file_url(&path);
        Ok(ArchiveLocator {
            arg: arg.to_string(),
            path,
            url,
        })
    }
}

/// Resolve archive arguments into locators.
///
/// Each argument is tilde-expanded and must exist; the first missing one
/// aborts with [`SelectError::MissingArchive`] naming the original argument.
pub fn resolve_archives<S: AsRef<str>>(
    args: &[S],
    home: Option<&Path>,
) -> SelectResult<Vec<ArchiveLocator>> {
    args.iter()
        .map(|arg| {
            let arg = arg.as_ref();
            let path = PathBuf::from(expand_tilde(arg, home));
            if !path.exists() {
                return Err(SelectError::MissingArchive {
                    path: arg.to_string(),
                });
            }
            ArchiveLocator::from_existing(arg, path)
        })
        .collect()
}

/// Build a `file://` URL for an absolute path.
///
/// Directories get a trailing `/`. Bytes outside the unreserved path set
/// are percent-encoded.
pub fn file_url(path: &Path) -> String {
    let mut text = path.to_string_lossy().replace('\\', "/");
    if !text.starts_with('/') {
        // Windows drive paths: C:/x -> /C:/x
        text.insert(0, '/');
    }
    if path.is_dir() && !text.ends_with('/') {
        text.push('/');
    }

    let mut url = String::with_capacity(text.len() + 7);
    url.push_str("file://");
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'.'
            | b'_'
            | b'~'
            | b'/'
            | b':'
            | b'@'
            | b'!'
            | b'$'
            | b'&'
            | b'\''
            | b'('
            | b')'
            | b'*'
            | b'+'
            | b','
            | b';'
            | b'=' => url.push(byte as char),
            other => url.push_str(&format!("%{:02X}", other)),
        }
    }
    url
}

// ============================================================================
// Tests
// ============================================================================
