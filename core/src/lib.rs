//! labelr - Rule engine that classifies pull requests into labels
//!
//! A label is described declaratively as an ordered list of rule groups. Each
//! group compiles into a tree of [`Condition`]s that is evaluated against an
//! immutable [`PrContext`] snapshot (title, body, head branch, changed files).
//!
//! # Architecture
//!
//! - [`PrContext`] — Immutable PR facts shared by every condition
//! - [`TextMatcher`] — Case-insensitive regex search over one string field
//! - [`FileMatcher`] — Shell-glob matching over changed file paths
//! - [`Condition`] — Leaf (text, files) and composite (all, any, or) predicates
//! - [`Registry`] — Kind name → [`RuleBuilder`], the only extension seam
//! - [`Compiler`] — Declarative rule groups → [`RuleGroup`]s via the registry
//! - [`evaluate`] — First-match-wins over a label's groups → [`MatchResult`]
//!
//! # Key Design Decisions
//!
//! 1. **First-match-wins**: a label's groups are tried in declaration order and
//!    evaluation stops at the first group that matches. `matched_files` and the
//!    debug trace describe that group only.
//!
//! 2. **Nothing compiled → nothing matched**: a rule group (or a nested `all`/`any`)
//!    whose fragments all fail to compile is dropped. It never becomes a
//!    vacuously-true empty conjunction.
//!
//! 3. **Configuration problems are not failures**: unknown kinds and malformed
//!    fragments contribute nothing. Evaluation itself is total.
//!
//! # Example
//!
//! ```
//! use labelr::prelude::*;
//!
//! let rules = RulesConfig::from_yaml_str(r#"
//! docs:
//!   - any:
//!       - or:
//!           title: ["(?i)^docs:"]
//!       - changed-files: ["**/*.md"]
//! "#).unwrap();
//!
//! let registry = Registry::with_core_rules();
//! let rule_set = Compiler::new(&registry).compile(&rules);
//!
//! let ctx = PrContext::new()
//!     .with_title("Docs: update readme")
//!     .with_branch("fix-1")
//!     .with_changed_files(["README.md"]);
//!
//! let classification = rule_set.classify(&ctx);
//! assert_eq!(classification.labels(), vec!["docs"]);
//! assert_eq!(classification.matches[0].matched_files, vec!["README.md".to_string()]);
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod builders;
mod compiler;
mod condition;
mod config;
mod context;
mod evaluator;
mod file_matcher;
pub mod registry;
mod text_matcher;
mod trace;

// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

pub use builders::{
    register_core_rules, AllRuleBuilder, AnyRuleBuilder, FilesRuleBuilder, OrRuleBuilder,
    TextRuleBuilder,
};
pub use compiler::{CompiledLabel, Compiler, RuleGroup, RuleSet};
pub use condition::{
    Condition, CustomCondition, FileCondition, MetadataOr, TextCondition, TextField,
};
pub use config::RulesConfig;
pub use context::PrContext;
pub use evaluator::{evaluate, Classification, MatchResult};
pub use file_matcher::FileMatcher;
pub use registry::{BuildScope, Registry, RegistryBuilder, RuleBuilder};
pub use text_matcher::TextMatcher;
pub use trace::{ConditionTrace, LabelTrace};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use labelr::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Evaluation
        evaluate,
        Classification,
        // Compilation
        CompiledLabel,
        Compiler,
        // Conditions
        Condition,
        ConditionTrace,
        CustomCondition,
        FileCondition,
        FileMatcher,
        // Errors
        LabelError,
        LabelTrace,
        MatchResult,
        MetadataOr,
        // Context
        PrContext,
        // Registry
        Registry,
        RegistryBuilder,
        RuleBuilder,
        RuleGroup,
        RuleSet,
        RulesConfig,
        TextCondition,
        TextField,
        TextMatcher,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length of a single regex or glob pattern.
pub const MAX_PATTERN_LENGTH: usize = 4096;

/// Compiled size limit handed to the regex engine for each text pattern.
///
/// Bounds memory for pathological patterns like `\w{1000}` that are short
/// in source but huge once compiled.
pub const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Maximum number of children in one `all`/`any` composite or one rule group.
pub const MAX_CONDITIONS_PER_COMPOSITE: usize = 256;

/// Maximum number of composite (`all`/`any`) levels inside a rule group.
///
/// One level is the supported depth: a group may hold an `any`, whose items
/// hold `or`/`changed-files`. An `all` nested inside an `any` is rejected.
pub const MAX_NESTING_DEPTH: usize = 1;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from rule construction and config loading.
///
/// These are raised while compiling a rule description, never while evaluating.
/// The compiler turns them into "this fragment contributes nothing"; use
/// [`Registry::try_create_rule`] to observe them directly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LabelError {
    /// A text pattern is not a valid regular expression.
    #[error("invalid pattern \"{pattern}\": {message}")]
    InvalidPattern {
        /// The pattern after `(?i)` stripping.
        pattern: String,
        /// The underlying error message.
        message: String,
    },

    /// A file pattern is not a valid glob.
    #[error("invalid glob \"{pattern}\": {message}")]
    InvalidGlob {
        /// The glob that failed to compile.
        pattern: String,
        /// The underlying error message.
        message: String,
    },

    /// A pattern exceeds [`MAX_PATTERN_LENGTH`].
    #[error("pattern length is {len}, but maximum allowed is {max}")]
    PatternTooLong {
        /// Actual length of the pattern.
        len: usize,
        /// Maximum allowed length.
        max: usize,
    },

    /// A fragment has the wrong shape for its kind.
    #[error("invalid {kind} config: {reason}")]
    InvalidConfig {
        /// The condition kind being built.
        kind: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A composite was nested deeper than [`MAX_NESTING_DEPTH`].
    #[error("composite nesting depth is {depth}, but maximum allowed is {max}")]
    NestingTooDeep {
        /// Depth the composite would have been built at.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// A composite or rule group has more than [`MAX_CONDITIONS_PER_COMPOSITE`] children.
    #[error("composite has {count} children, but maximum allowed is {max}")]
    TooManyConditions {
        /// Actual count of children.
        count: usize,
        /// Maximum allowed.
        max: usize,
    },

    /// A composite compiled to zero children.
    #[error("{kind} has no valid conditions")]
    EmptyComposite {
        /// `"all"` or `"any"`.
        kind: String,
    },

    /// No builder is registered for the kind.
    #[error("unknown condition kind \"{kind}\" (registered: {})", available.join(", "))]
    UnknownKind {
        /// The unregistered kind.
        kind: String,
        /// Kinds that ARE registered.
        available: Vec<String>,
    },

    /// The process-wide registry was already initialized.
    #[error("rule registry is already initialized")]
    RegistryInitialized,

    /// A rules document could not be parsed.
    #[error("{format} parse error: {message}")]
    Parse {
        /// `"YAML"` or `"JSON"`.
        format: &'static str,
        /// The underlying error message.
        message: String,
    },

    /// A rules file could not be read.
    #[error("failed to read \"{path}\": {message}")]
    Io {
        /// The path that failed.
        path: String,
        /// The underlying error message.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_kind_lists_registered() {
        let err = LabelError::UnknownKind {
            kind: "bogus".into(),
            available: vec!["any".into(), "title".into()],
        };
        assert_eq!(
            err.to_string(),
            "unknown condition kind \"bogus\" (registered: any, title)"
        );
    }

    #[test]
    fn pattern_too_long_message() {
        let err = LabelError::PatternTooLong { len: 5000, max: 4096 };
        assert!(err.to_string().contains("5000"));
    }
}
