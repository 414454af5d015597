//! `FileMatcher` — Shell-glob matching over changed file paths
//!
//! Glob semantics:
//!
//! - `*` matches any run of characters, **including** `/`
//! - `?` matches exactly one character
//! - `[...]` / `[!...]` match a character class
//! - `**/` as a leading component also matches zero directories
//! - `{` and `}` are literal characters, not alternation
//!
//! Path separators are not special, so `*.py` matches `a/b/c.py`.
//! Matching is case-sensitive, as file systems on CI runners are.

use crate::{LabelError, MAX_PATTERN_LENGTH};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;
use std::fmt;

/// A compiled set of glob patterns.
///
/// An empty pattern list never matches anything.
///
/// # Example
///
/// ```
/// use labelr::FileMatcher;
///
/// let m = FileMatcher::new(["*.py", "docs/**"]).unwrap();
/// assert!(m.matches("a/b/c.py"));
/// assert!(m.matches("docs/guide/intro.md"));
/// assert!(!m.matches("src/main.rs"));
///
/// let files = ["x.py", "src/main.rs", "y.py"].map(String::from);
/// assert_eq!(m.matched_files(&files), vec!["x.py", "y.py"]);
/// ```
#[derive(Clone)]
pub struct FileMatcher {
    patterns: Vec<String>,
    set: GlobSet,
}

impl FileMatcher {
    /// Compile the given glob patterns.
    ///
    /// # Errors
    ///
    /// - [`LabelError::PatternTooLong`] if a pattern exceeds [`MAX_PATTERN_LENGTH`]
    /// - [`LabelError::InvalidGlob`] if a pattern is not a valid glob
    pub fn new<I, S>(patterns: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            if pattern.len() > MAX_PATTERN_LENGTH {
                return Err(LabelError::PatternTooLong {
                    len: pattern.len(),
                    max: MAX_PATTERN_LENGTH,
                });
            }
            let glob = GlobBuilder::new(&literal_braces(pattern))
                .literal_separator(false)
                .backslash_escape(true)
                .build()
                .map_err(|e| invalid_glob(pattern, &e))?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| invalid_glob(&patterns.join(", "), &e))?;
        Ok(Self { patterns, set })
    }

    /// Returns `true` if any pattern matches `path`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// The subset of `paths` matching at least one pattern.
    ///
    /// Preserves the order of `paths` and drops repeated entries.
    #[must_use]
    pub fn matched_files<'a>(&self, paths: &'a [String]) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        paths
            .iter()
            .map(String::as_str)
            .filter(|p| self.matches(p) && seen.insert(*p))
            .collect()
    }

    /// The patterns as written in the rule description.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns `true` if there are no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl fmt::Debug for FileMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FileMatcher").field(&self.patterns).finish()
    }
}

/// Wraps `{` and `}` outside character classes in a class of their own.
fn literal_braces(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(c);
                if let Some(&neg @ ('!' | '^')) = chars.peek() {
                    out.push(neg);
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(c);
            }
            '{' | '}' if !in_class => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    out
}

fn invalid_glob(pattern: &str, err: &globset::Error) -> LabelError {
    LabelError::InvalidGlob {
        pattern: pattern.to_owned(),
        message: err.kind().to_string(),
    }
}
