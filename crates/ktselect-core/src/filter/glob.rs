//! Glob-to-regex translation.
//!
//! Globs are translated into anchored regular expressions and matched
//! against the `/`-separated text of a relative path.
//!
//! ## Syntax
//!
//! - `*` matches zero or more characters within a single path segment
//! - `**` matches zero or more characters across segment boundaries, so
//!   `**/` always needs at least one directory in front of what follows
//! - `?` matches exactly one character other than `/`
//! - `[abc]`, `[a-z]`, `[!abc]` match one character from a class, never `/`
//! - `{a,b,c}` matches any of the comma-separated alternatives
//! - `\` escapes the next character

use regex::Regex;

const SEPARATOR: char = '/';

/// A syntax error in a glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobSyntaxError {
    /// What went wrong.
    pub message: &'static str,
    /// Character index into the glob where the problem was detected.
    pub index: usize,
}

impl std::fmt::Display for GlobSyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} near index {}", self.message, self.index)
    }
}

impl std::error::Error for GlobSyntaxError {}

fn syntax_error(message: &'static str, index: usize) -> GlobSyntaxError {
    GlobSyntaxError { message, index }
}

/// Translate a glob into the source of an anchored regular expression.
pub fn glob_to_regex(glob: &str) -> Result<String, GlobSyntaxError> {
    translate(glob, false)
}

/// How a leading `**/` is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LeadingGlobstar {
    /// Needs at least one directory, like any other `**/`.
    Strict,
    /// May also match nothing, so root files match too.
    Optional,
}

fn translate(glob: &str, optional_leading: bool) -> Result<String, GlobSyntaxError> {
    let chars: Vec<char> = glob.chars().collect();
    let mut regex = String::from("^");
    let mut in_group = false;
    let mut i = 0;

    if optional_leading && chars.starts_with(&['*', '*', SEPARATOR]) {
        regex.push_str("(?:.*/)?");
        i = 3;
    }

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        match c {
            '\\' => {
                let Some(&escaped) = chars.get(i) else {
                    return Err(syntax_error("no character to escape", i - 1));
                };
                i += 1;
                push_literal(&mut regex, escaped);
            }
            SEPARATOR => regex.push(SEPARATOR),
            '[' => i = translate_class(&chars, i, &mut regex)?,
            '{' => {
                if in_group {
                    return Err(syntax_error("cannot nest groups", i - 1));
                }
                regex.push_str("(?:(?:");
                in_group = true;
            }
            '}' if in_group => {
                regex.push_str("))");
                in_group = false;
            }
            ',' if in_group => regex.push_str(")|(?:"),
            '*' => {
                if chars.get(i) == Some(&'*') {
                    regex.push_str(".*");
                    i += 1;
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push_str("[^/]"),
            other => push_literal(&mut regex, other),
        }
    }

    if in_group {
        return Err(syntax_error("missing '}'", chars.len()));
    }

    regex.push('$');
    Ok(regex)
}

/// Translate a bracket class whose `[` has already been consumed.
///
/// Returns the index just past the closing `]`.
fn translate_class(
    chars: &[char],
    mut i: usize,
    regex: &mut String,
) -> Result<usize, GlobSyntaxError> {
    let start = i - 1;

    // The class never matches the separator; a negated class has to say
    // so explicitly.
    if chars.get(i) == Some(&'!') {
        regex.push_str("[^/");
        i += 1;
    } else {
        regex.push('[');
    }

    let mut items = 0usize;
    if chars.get(i) == Some(&'-') {
        regex.push_str("\\-");
        items += 1;
        i += 1;
    }

    let mut range_start: Option<char> = None;
    loop {
        let Some(&c) = chars.get(i) else {
            return Err(syntax_error("missing ']'", chars.len()));
        };
        i += 1;
        match c {
            ']' => break,
            SEPARATOR => {
                return Err(syntax_error("explicit name separator in class", i - 1));
            }
            '-' => {
                let Some(low) = range_start.take() else {
                    return Err(syntax_error("invalid range", i - 1));
                };
                match chars.get(i) {
                    None => return Err(syntax_error("missing ']'", chars.len())),
                    Some(']') => {
                        // Trailing '-' is literal: `[a-]`
                        regex.push_str("\\-");
                        i += 1;
                        break;
                    }
                    Some(&high) => {
                        if high == SEPARATOR {
                            return Err(syntax_error("explicit name separator in class", i));
                        }
                        if high < low {
                            return Err(syntax_error("invalid range", i - 2));
                        }
                        regex.push('-');
                        push_literal(regex, high);
                        i += 1;
                    }
                }
            }
            other => {
                push_literal(regex, other);
                range_start = Some(other);
                items += 1;
            }
        }
    }

    if items == 0 {
        return Err(syntax_error("empty character class", start));
    }

    regex.push(']');
    Ok(i)
}

fn push_literal(regex: &mut String, c: char) {
    let mut buf = [0u8; 4];
    regex.push_str(&regex::escape(c.encode_utf8(&mut buf)));
}

/// Compile a glob into a matcher.
pub(crate) fn compile_glob(glob: &str, leading: LeadingGlobstar) -> Result<Regex, String> {
    let source =
        translate(glob, leading == LeadingGlobstar::Optional).map_err(|e| e.to_string())?;
    Regex::new(&source).map_err(|e| e.to_string())
}

// ============================================================================
// Tests
// ============================================================================
