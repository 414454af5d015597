//! `TextMatcher` — Case-insensitive regex search over a single string
//!
//! Patterns are compiled once at rule construction. Matching is a *search*
//! (the pattern may match anywhere in the text), always case-insensitive.
//!
//! Rule files written for other labelers often carry an inline `(?i)` marker.
//! It is stripped before compiling: matching is case-insensitive regardless,
//! and per-pattern case sensitivity is not offered. Flag groups that turn
//! `i` off (`(?-i)`, `(?-i:...)`) are rejected.

use crate::{LabelError, MAX_PATTERN_LENGTH, REGEX_SIZE_LIMIT};
use regex::{Regex, RegexBuilder};
use std::fmt;

/// Inline case-insensitivity marker accepted (and ignored) in text patterns.
const CASE_INSENSITIVE_MARKER: &str = "(?i)";

/// A compiled list of case-insensitive regular expressions.
///
/// An empty pattern list never matches anything.
///
/// # Example
///
/// ```
/// use labelr::TextMatcher;
///
/// let m = TextMatcher::new(["(?i)^docs:", "readme"]).unwrap();
/// assert!(m.matches("DOCS: fix typo"));
/// assert!(m.matches("update the README please"));
/// assert!(!m.matches("fix: crash"));
///
/// let empty = TextMatcher::new(Vec::<String>::new()).unwrap();
/// assert!(!empty.matches("anything"));
/// ```
#[derive(Clone)]
pub struct TextMatcher {
    patterns: Vec<String>,
    compiled: Vec<Regex>,
}

impl TextMatcher {
    /// Compile the given patterns.
    ///
    /// Patterns are kept as written for re-serialization and traces.
    ///
    /// # Errors
    ///
    /// - [`LabelError::PatternTooLong`] if a pattern exceeds [`MAX_PATTERN_LENGTH`]
    /// - [`LabelError::InvalidPattern`] if a pattern is not a valid regex, or
    ///   if its inline flags disable case-insensitive matching
    pub fn new<I, S>(patterns: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let compiled = patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns, compiled })
    }

    /// Returns `true` if any pattern matches anywhere in `text`.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(text))
    }

    /// Returns the first pattern (as written) that matches `text`.
    #[must_use]
    pub fn find_pattern(&self, text: &str) -> Option<&str> {
        self.compiled
            .iter()
            .position(|re| re.is_match(text))
            .map(|i| self.patterns[i].as_str())
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

impl fmt::Debug for TextMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TextMatcher").field(&self.patterns).finish()
    }
}

fn compile(pattern: &str) -> Result<Regex, LabelError> {
    let stripped = pattern.replace(CASE_INSENSITIVE_MARKER, "");
    if stripped.len() > MAX_PATTERN_LENGTH {
        return Err(LabelError::PatternTooLong {
            len: stripped.len(),
            max: MAX_PATTERN_LENGTH,
        });
    }
    if negates_case_insensitivity(&stripped) {
        return Err(LabelError::InvalidPattern {
            pattern: stripped,
            message: "inline flags may not disable case-insensitive matching".into(),
        });
    }
    RegexBuilder::new(&stripped)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .build()
        .map_err(|e| LabelError::InvalidPattern {
            pattern: stripped,
            message: e.to_string(),
        })
}

/// Returns `true` if a flag group (`(?-i)`, `(?m-i:...)`, ...) turns `i` off.
///
/// Escapes and bracketed classes are skipped; a `(` inside them is literal.
fn negates_case_insensitivity(pattern: &str) -> bool {
    let mut chars = pattern.chars().peekable();
    let mut class_depth = 0usize;
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                chars.next();
            }
            '[' => {
                class_depth += 1;
                if chars.peek() == Some(&'^') {
                    chars.next();
                }
                if chars.peek() == Some(&']') {
                    chars.next();
                }
            }
            ']' if class_depth > 0 => class_depth -= 1,
            '(' if class_depth == 0 && chars.peek() == Some(&'?') => {
                chars.next();
                let mut negated = false;
                while let Some(&f) = chars.peek() {
                    match f {
                        '-' => negated = true,
                        'i' if negated => return true,
                        'i' | 'm' | 's' | 'R' | 'U' | 'u' | 'x' => {}
                        _ => break,
                    }
                    chars.next();
                }
            }
            _ => {}
        }
    }
    false
}
