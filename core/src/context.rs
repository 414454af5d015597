//! `PrContext` — Immutable snapshot of pull request facts
//!
//! Every condition reads from the same `PrContext` during one evaluation pass.
//! Nothing in the engine mutates it; build it once with the `with_*` methods
//! (or deserialize it) and share it by reference.

use serde::{Deserialize, Serialize};

/// Facts about a pull request consumed by all conditions.
///
/// Deserializes from the PR data document produced by the surrounding tool:
///
/// ```json
/// { "title": "...", "body": "...", "branch": "...", "changed_files": ["a.rs"] }
/// ```
///
/// Missing fields default to empty; a `null` body is treated as empty.
///
/// # Example
///
/// ```
/// use labelr::PrContext;
///
/// let ctx = PrContext::new()
///     .with_title("feat: add parser")
///     .with_branch("feature/parser")
///     .with_changed_files(["src/parser.rs", "README.md"]);
///
/// assert_eq!(ctx.branch(), "feature/parser");
/// assert_eq!(ctx.changed_files().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrContext {
    #[serde(default, deserialize_with = "null_as_default")]
    title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    body: String,
    #[serde(default, alias = "head_branch", deserialize_with = "null_as_default")]
    branch: String,
    #[serde(default, alias = "changedFiles", deserialize_with = "null_as_default")]
    changed_files: Vec<String>,
}

impl PrContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the PR title (builder pattern).
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the PR body (builder pattern).
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the head branch name (builder pattern).
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Set the changed file paths, keeping their order (builder pattern).
    #[must_use]
    pub fn with_changed_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.changed_files = files.into_iter().map(Into::into).collect();
        self
    }

    /// The PR title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The PR body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The head branch name.
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Changed file paths in the order the PR reports them.
    #[must_use]
    pub fn changed_files(&self) -> &[String] {
        &self.changed_files
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
