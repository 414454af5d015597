//! Condition — Boolean predicates over a [`PrContext`]
//!
//! Leaf conditions match one PR fact ([`TextCondition`], [`FileCondition`]).
//! Composite conditions combine others (`All`, `Any`, [`MetadataOr`]).
//! [`CustomCondition`] lets registered builders add new kinds without touching
//! the compiler or evaluator.
//!
//! Every `evaluate` is pure and total: no side effects, no errors.

use crate::{ConditionTrace, FileMatcher, LabelError, PrContext, TextMatcher};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{self, Debug};

// ═══════════════════════════════════════════════════════════════════════════════
// Text
// ═══════════════════════════════════════════════════════════════════════════════

/// The string field of a [`PrContext`] a text condition reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TextField {
    /// The head branch name (`head-branch`).
    #[serde(rename = "head-branch")]
    Branch,
    /// The PR title (`title`).
    #[serde(rename = "title")]
    Title,
    /// The PR body (`body`).
    #[serde(rename = "body")]
    Body,
}

impl TextField {
    /// All fields, in the order `or` reports them.
    pub const ALL: [TextField; 3] = [Self::Branch, Self::Title, Self::Body];

    /// The rule key naming this field.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Branch => "head-branch",
            Self::Title => "title",
            Self::Body => "body",
        }
    }

    /// Parse a rule key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "head-branch" => Some(Self::Branch),
            "title" => Some(Self::Title),
            "body" => Some(Self::Body),
            _ => None,
        }
    }

    /// Extract this field from the context.
    #[must_use]
    pub fn extract(self, ctx: &PrContext) -> &str {
        match self {
            Self::Branch => ctx.branch(),
            Self::Title => ctx.title(),
            Self::Body => ctx.body(),
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Regex search over one text field of the context.
#[derive(Debug, Clone)]
pub struct TextCondition {
    field: TextField,
    matcher: TextMatcher,
}

impl TextCondition {
    /// Create a text condition from an already compiled matcher.
    #[must_use]
    pub fn new(field: TextField, matcher: TextMatcher) -> Self {
        Self { field, matcher }
    }

    /// Compile `patterns` and bind them to `field`.
    ///
    /// # Errors
    ///
    /// See [`TextMatcher::new`].
    pub fn compile<I, S>(field: TextField, patterns: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(field, TextMatcher::new(patterns)?))
    }

    /// The field this condition reads.
    #[must_use]
    pub fn field(&self) -> TextField {
        self.field
    }

    /// The compiled patterns.
    #[must_use]
    pub fn matcher(&self) -> &TextMatcher {
        &self.matcher
    }

    /// Evaluate against the context.
    #[must_use]
    pub fn evaluate(&self, ctx: &PrContext) -> bool {
        self.matcher.matches(self.field.extract(ctx))
    }

    /// Evaluate, reporting the first pattern that matched.
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &PrContext) -> ConditionTrace {
        let pattern = self.matcher.find_pattern(self.field.extract(ctx));
        ConditionTrace::Text {
            field: self.field,
            matched: pattern.is_some(),
            pattern: pattern.map(str::to_owned),
        }
    }

    fn config_value(&self) -> Value {
        patterns_value(self.matcher.patterns())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Files
// ═══════════════════════════════════════════════════════════════════════════════

/// Glob match over the changed file list.
///
/// True iff at least one changed file matches. A PR with no changed files
/// never satisfies a `FileCondition`.
#[derive(Debug, Clone)]
pub struct FileCondition {
    matcher: FileMatcher,
}

impl FileCondition {
    /// Create a file condition from an already compiled matcher.
    #[must_use]
    pub fn new(matcher: FileMatcher) -> Self {
        Self { matcher }
    }

    /// Compile `patterns` into a file condition.
    ///
    /// # Errors
    ///
    /// See [`FileMatcher::new`].
    pub fn compile<I, S>(patterns: I) -> Result<Self, LabelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::new(FileMatcher::new(patterns)?))
    }

    /// The compiled patterns.
    #[must_use]
    pub fn matcher(&self) -> &FileMatcher {
        &self.matcher
    }

    /// Changed files matching at least one pattern (ordered, no duplicates).
    #[must_use]
    pub fn matched_files<'a>(&self, ctx: &'a PrContext) -> Vec<&'a str> {
        self.matcher.matched_files(ctx.changed_files())
    }

    /// Evaluate against the context.
    #[must_use]
    pub fn evaluate(&self, ctx: &PrContext) -> bool {
        ctx.changed_files().iter().any(|f| self.matcher.matches(f))
    }

    /// Evaluate, reporting the matched files.
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &PrContext) -> ConditionTrace {
        let matched_files: Vec<String> = self
            .matched_files(ctx)
            .into_iter()
            .map(str::to_owned)
            .collect();
        ConditionTrace::Files {
            matched: !matched_files.is_empty(),
            matched_files,
        }
    }

    fn config_value(&self) -> Value {
        patterns_value(self.matcher.patterns())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Or-of-metadata
// ═══════════════════════════════════════════════════════════════════════════════

/// Disjunction over branch, title, and body pattern sets (the `or` kind).
///
/// Each set is optional: absent when its key was not written. An absent or
/// empty set contributes `false`, never vacuous truth, so a `MetadataOr`
/// with nothing configured never matches.
#[derive(Debug, Clone, Default)]
pub struct MetadataOr {
    branch: Option<TextCondition>,
    title: Option<TextCondition>,
    body: Option<TextCondition>,
}

impl MetadataOr {
    /// Create an `or` with no pattern sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pattern set for one field (builder pattern).
    ///
    /// The condition's own field decides which slot it fills; setting the same
    /// field twice keeps the last one.
    #[must_use]
    pub fn with(mut self, condition: TextCondition) -> Self {
        let slot = match condition.field() {
            TextField::Branch => &mut self.branch,
            TextField::Title => &mut self.title,
            TextField::Body => &mut self.body,
        };
        *slot = Some(condition);
        self
    }

    /// The configured pattern sets, in `head-branch`, `title`, `body` order.
    pub fn conditions(&self) -> impl Iterator<Item = &TextCondition> {
        [&self.branch, &self.title, &self.body]
            .into_iter()
            .filter_map(Option::as_ref)
    }

    /// Evaluate against the context.
    #[must_use]
    pub fn evaluate(&self, ctx: &PrContext) -> bool {
        self.conditions()
            .any(|c| !c.matcher().is_empty() && c.evaluate(ctx))
    }

    /// Evaluate every configured field (no short-circuit).
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &PrContext) -> ConditionTrace {
        let children: Vec<ConditionTrace> = self
            .conditions()
            .map(|c| c.evaluate_with_trace(ctx))
            .collect();
        ConditionTrace::Or {
            matched: children.iter().any(ConditionTrace::matched),
            children,
        }
    }

    fn config_value(&self) -> Value {
        let map: Map<String, Value> = self
            .conditions()
            .map(|c| (c.field().key().to_owned(), c.config_value()))
            .collect();
        Value::Object(map)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Extension
// ═══════════════════════════════════════════════════════════════════════════════

/// A condition kind supplied from outside the core.
///
/// Implement this for a new kind (PR size, author, …), build it from a
/// registered [`RuleBuilder`](crate::RuleBuilder), and wrap it in
/// [`Condition::Custom`]. The compiler and evaluator handle it like any
/// built-in leaf.
///
/// # Example
///
/// ```
/// use labelr::{CustomCondition, PrContext};
///
/// #[derive(Debug)]
/// struct MinFiles(usize);
///
/// impl CustomCondition for MinFiles {
///     fn kind(&self) -> &str {
///         "min-files"
///     }
///
///     fn evaluate(&self, ctx: &PrContext) -> bool {
///         ctx.changed_files().len() >= self.0
///     }
///
///     fn config_value(&self) -> serde_json::Value {
///         self.0.into()
///     }
/// }
/// ```
pub trait CustomCondition: Send + Sync + Debug {
    /// The registry kind name this condition was built from.
    fn kind(&self) -> &str;

    /// Evaluate against the context. Must be pure and total.
    fn evaluate(&self, ctx: &PrContext) -> bool;

    /// The configuration fragment this condition re-serializes to.
    fn config_value(&self) -> Value {
        Value::Null
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Condition
// ═══════════════════════════════════════════════════════════════════════════════

/// A compiled condition tree node.
///
/// # Variants
///
/// - `Text` — regex search over title, body, or branch
/// - `Files` — glob match over changed files
/// - `All` — every child must match (short-circuit on first false; empty is `true`)
/// - `Any` — some child must match (short-circuit on first true; empty is `false`)
/// - `Or` — [`MetadataOr`] over branch/title/body
/// - `Custom` — a registered extension kind
///
/// # Example
///
/// ```
/// use labelr::{Condition, FileCondition, PrContext, TextCondition, TextField};
///
/// let cond = Condition::All(vec![
///     Condition::Text(TextCondition::compile(TextField::Branch, ["^release/"]).unwrap()),
///     Condition::Files(FileCondition::compile(["CHANGELOG.md"]).unwrap()),
/// ]);
///
/// let ctx = PrContext::new()
///     .with_branch("release/1.2")
///     .with_changed_files(["CHANGELOG.md"]);
/// assert!(cond.evaluate(&ctx));
/// assert!(!cond.evaluate(&ctx.clone().with_branch("main")));
/// ```
pub enum Condition {
    /// Regex search over one text field.
    Text(TextCondition),
    /// Glob match over changed files.
    Files(FileCondition),
    /// All children must match (logical AND).
    All(Vec<Condition>),
    /// Any child must match (logical OR).
    Any(Vec<Condition>),
    /// Or over branch/title/body pattern sets.
    Or(MetadataOr),
    /// Extension kind.
    Custom(Box<dyn CustomCondition>),
}

impl Condition {
    /// The registry kind name this node re-serializes under.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Text(t) => t.field().key(),
            Self::Files(_) => "changed-files",
            Self::All(_) => "all",
            Self::Any(_) => "any",
            Self::Or(_) => "or",
            Self::Custom(c) => c.kind(),
        }
    }

    /// Evaluate this condition against the context.
    #[must_use]
    pub fn evaluate(&self, ctx: &PrContext) -> bool {
        match self {
            Self::Text(t) => t.evaluate(ctx),
            Self::Files(f) => f.evaluate(ctx),
            Self::All(children) => children.iter().all(|c| c.evaluate(ctx)),
            Self::Any(children) => children.iter().any(|c| c.evaluate(ctx)),
            Self::Or(o) => o.evaluate(ctx),
            Self::Custom(c) => c.evaluate(ctx),
        }
    }

    /// Evaluate with full trace for debugging.
    ///
    /// Unlike [`evaluate()`](Self::evaluate), composites do NOT short-circuit:
    /// every child is traced. The `matched` result is still identical.
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &PrContext) -> ConditionTrace {
        match self {
            Self::Text(t) => t.evaluate_with_trace(ctx),
            Self::Files(f) => f.evaluate_with_trace(ctx),
            Self::All(children) => {
                let children: Vec<ConditionTrace> =
                    children.iter().map(|c| c.evaluate_with_trace(ctx)).collect();
                ConditionTrace::All {
                    matched: children.iter().all(ConditionTrace::matched),
                    children,
                }
            }
            Self::Any(children) => {
                let children: Vec<ConditionTrace> =
                    children.iter().map(|c| c.evaluate_with_trace(ctx)).collect();
                ConditionTrace::Any {
                    matched: children.iter().any(ConditionTrace::matched),
                    children,
                }
            }
            Self::Or(o) => o.evaluate_with_trace(ctx),
            Self::Custom(c) => ConditionTrace::Custom {
                name: c.kind().to_owned(),
                matched: c.evaluate(ctx),
            },
        }
    }

    /// The configuration fragment under this node's [`kind`](Self::kind).
    #[must_use]
    pub fn config_value(&self) -> Value {
        match self {
            Self::Text(t) => t.config_value(),
            Self::Files(f) => f.config_value(),
            Self::All(children) | Self::Any(children) => {
                Value::Array(children.iter().map(Condition::to_value).collect())
            }
            Self::Or(o) => o.config_value(),
            Self::Custom(c) => c.config_value(),
        }
    }

    /// Re-serialize as a single-key fragment: `{ kind: config }`.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.kind().to_owned(), self.config_value());
        Value::Object(map)
    }

    /// Returns `true` for `All` and `Any`.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self, Self::All(_) | Self::Any(_))
    }

    /// Depth of this tree (a leaf is 1).
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::All(cs) | Self::Any(cs) => 1 + cs.iter().map(Condition::depth).max().unwrap_or(0),
            Self::Or(_) => 2,
            _ => 1,
        }
    }
}

impl Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(t) => f.debug_tuple("Text").field(t).finish(),
            Self::Files(fc) => f.debug_tuple("Files").field(fc).finish(),
            Self::All(cs) => f.debug_tuple("All").field(cs).finish(),
            Self::Any(cs) => f.debug_tuple("Any").field(cs).finish(),
            Self::Or(o) => f.debug_tuple("Or").field(o).finish(),
            Self::Custom(c) => f.debug_tuple("Custom").field(c).finish(),
        }
    }
}

fn patterns_value(patterns: &[String]) -> Value {
    Value::Array(patterns.iter().cloned().map(Value::String).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PrContext {
        PrContext::new()
            .with_title("feat: add parser")
            .with_body("Implements the tokenizer")
            .with_branch("feature/parser")
            .with_changed_files(["src/parser.rs", "README.md"])
    }

    fn text(field: TextField, patterns: &[&str]) -> TextCondition {
        TextCondition::compile(field, patterns.iter().copied()).unwrap()
    }

    fn files(patterns: &[&str]) -> FileCondition {
        FileCondition::compile(patterns.iter().copied()).unwrap()
    }

    #[test]
    fn text_condition_reads_its_field() {
        assert!(text(TextField::Title, &["^feat"]).evaluate(&ctx()));
        assert!(text(TextField::Body, &["tokenizer"]).evaluate(&ctx()));
        assert!(text(TextField::Branch, &["^feature/"]).evaluate(&ctx()));
        assert!(!text(TextField::Branch, &["^feat:"]).evaluate(&ctx()));
    }

    #[test]
    fn file_condition_true_iff_files_matched() {
        let c = files(&["*.rs"]);
        assert!(c.evaluate(&ctx()));
        assert_eq!(c.matched_files(&ctx()), vec!["src/parser.rs"]);

        let c = files(&["*.go"]);
        assert!(!c.evaluate(&ctx()));
        assert!(c.matched_files(&ctx()).is_empty());
    }

    #[test]
    fn file_condition_false_without_changed_files() {
        let c = files(&["**"]);
        assert!(!c.evaluate(&PrContext::new()));
    }

    #[test]
    fn empty_all_is_true_empty_any_is_false() {
        assert!(Condition::All(vec![]).evaluate(&ctx()));
        assert!(!Condition::Any(vec![]).evaluate(&ctx()));
    }

    #[test]
    fn all_requires_every_child() {
        let c = Condition::All(vec![
            Condition::Files(files(&["*.rs"])),
            Condition::Text(text(TextField::Title, &["^fix"])),
        ]);
        assert!(!c.evaluate(&ctx()));
    }

    #[test]
    fn any_requires_one_child() {
        let c = Condition::Any(vec![
            Condition::Files(files(&["*.go"])),
            Condition::Text(text(TextField::Title, &["parser"])),
        ]);
        assert!(c.evaluate(&ctx()));
    }

    #[test]
    fn metadata_or_with_nothing_never_matches() {
        assert!(!MetadataOr::new().evaluate(&ctx()));
        assert!(!MetadataOr::new().evaluate(&PrContext::new()));
    }

    #[test]
    fn metadata_or_empty_set_contributes_false() {
        let or = MetadataOr::new()
            .with(text(TextField::Title, &[]))
            .with(text(TextField::Body, &[]));
        assert!(!or.evaluate(&ctx()));
    }

    #[test]
    fn metadata_or_any_field() {
        let or = MetadataOr::new()
            .with(text(TextField::Branch, &["^hotfix/"]))
            .with(text(TextField::Body, &["tokenizer"]));
        assert!(or.evaluate(&ctx()));
    }

    #[test]
    fn trace_does_not_short_circuit() {
        let c = Condition::Any(vec![
            Condition::Text(text(TextField::Title, &["parser"])),
            Condition::Files(files(&["*.md"])),
        ]);
        let trace = c.evaluate_with_trace(&ctx());
        assert!(trace.matched());
        match trace {
            ConditionTrace::Any { children, .. } => {
                assert_eq!(children.len(), 2);
                assert!(children.iter().all(ConditionTrace::matched));
            }
            other => panic!("expected Any, got {other:?}"),
        }
    }

    #[test]
    fn trace_agrees_with_evaluate() {
        let c = Condition::All(vec![
            Condition::Or(MetadataOr::new().with(text(TextField::Title, &["nope"]))),
            Condition::Files(files(&["*.rs"])),
        ]);
        assert_eq!(c.evaluate(&ctx()), c.evaluate_with_trace(&ctx()).matched());
    }

    #[test]
    fn to_value_reproduces_shape() {
        let c = Condition::Any(vec![
            Condition::Or(MetadataOr::new().with(text(TextField::Title, &["(?i)^docs:"]))),
            Condition::Files(files(&["**/*.md"])),
        ]);
        assert_eq!(
            c.to_value(),
            serde_json::json!({
                "any": [
                    { "or": { "title": ["(?i)^docs:"] } },
                    { "changed-files": ["**/*.md"] }
                ]
            })
        );
    }

    #[test]
    fn depth() {
        let leaf = Condition::Files(files(&["*"]));
        assert_eq!(leaf.depth(), 1);
        assert_eq!(Condition::Any(vec![leaf]).depth(), 2);
        assert_eq!(Condition::All(vec![]).depth(), 1);
    }

    #[test]
    fn condition_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Condition>();
    }
}
