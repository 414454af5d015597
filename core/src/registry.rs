//! Rule registry: condition kind name → builder.
//!
//! The registry is the **only** extension seam. Adding a condition kind (PR
//! size, author, …) means registering one more [`RuleBuilder`]; the compiler
//! and evaluator never change.
//!
//! # Lifecycle
//!
//! 1. Populate a [`RegistryBuilder`] (re-registering a kind overwrites it: last wins).
//! 2. Freeze it with [`build()`](RegistryBuilder::build). A [`Registry`] has no
//!    mutating methods, so it can be shared across threads freely.
//! 3. Optionally install it process-wide, once, with [`initialize`] and read it
//!    anywhere through [`global`].
//!
//! # Example
//!
//! ```
//! use labelr::{register_core_rules, Registry, RegistryBuilder};
//!
//! let registry = register_core_rules(RegistryBuilder::new()).build();
//! assert!(registry.contains("changed-files"));
//!
//! let rule = registry.create_rule("changed-files", &serde_json::json!(["*.md"]));
//! assert!(rule.is_some());
//!
//! // Unknown kinds and malformed fragments produce no rule, not an error.
//! assert!(registry.create_rule("bogus", &serde_json::json!({})).is_none());
//! assert!(registry.create_rule("changed-files", &serde_json::json!({ "x": 1 })).is_none());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use serde_json::Value;

use crate::{Condition, LabelError, MAX_NESTING_DEPTH};

// ═══════════════════════════════════════════════════════════════════════════════
// Builder trait
// ═══════════════════════════════════════════════════════════════════════════════

/// Factory for one condition kind.
///
/// `config` is the fragment written under the kind's key. For
/// `changed-files: ["*.md"]` the `changed-files` builder receives `["*.md"]`.
///
/// Composite builders recurse through [`BuildScope::nested`], which enforces
/// [`MAX_NESTING_DEPTH`].
pub trait RuleBuilder: Send + Sync {
    /// Returns `true` if `config` has a shape this builder understands.
    ///
    /// The registry only calls [`build`](Self::build) when this is `true`.
    fn can_build(&self, config: &Value) -> bool;

    /// Construct the condition.
    ///
    /// # Errors
    ///
    /// Any [`LabelError`] describing why the fragment cannot compile (bad
    /// pattern, too deep, empty composite, …). The compiler drops the fragment.
    fn build(&self, config: &Value, scope: &BuildScope<'_>) -> Result<Condition, LabelError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// Build scope
// ═══════════════════════════════════════════════════════════════════════════════

/// Where in a rule group a fragment is being built.
///
/// Depth 0 is the rule group itself. Each composite level adds one.
#[derive(Clone, Copy)]
pub struct BuildScope<'r> {
    registry: &'r Registry,
    depth: usize,
}

impl<'r> BuildScope<'r> {
    /// A top-level scope (directly inside a rule group).
    #[must_use]
    pub fn root(registry: &'r Registry) -> Self {
        Self { registry, depth: 0 }
    }

    /// The registry fragments are resolved against.
    #[must_use]
    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Composite levels above this scope.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The scope for the children of a composite built in this scope.
    ///
    /// # Errors
    ///
    /// [`LabelError::NestingTooDeep`] if the composite would exceed [`MAX_NESTING_DEPTH`].
    pub fn nested(&self) -> Result<Self, LabelError> {
        let depth = self.depth + 1;
        if depth > MAX_NESTING_DEPTH {
            return Err(LabelError::NestingTooDeep {
                depth,
                max: MAX_NESTING_DEPTH,
            });
        }
        Ok(Self {
            registry: self.registry,
            depth,
        })
    }

    /// Build `kind` from `config` in this scope.
    ///
    /// # Errors
    ///
    /// - [`LabelError::UnknownKind`] if no builder is registered for `kind`
    /// - [`LabelError::InvalidConfig`] if the builder rejects the shape of `config`
    /// - whatever the builder itself returns
    pub fn try_create_rule(&self, kind: &str, config: &Value) -> Result<Condition, LabelError> {
        let builder = self
            .registry
            .builders
            .get(kind)
            .ok_or_else(|| LabelError::UnknownKind {
                kind: kind.to_owned(),
                available: self.registry.kinds().into_iter().map(str::to_owned).collect(),
            })?;
        if !builder.can_build(config) {
            return Err(LabelError::InvalidConfig {
                kind: kind.to_owned(),
                reason: format!("unsupported shape: {config}"),
            });
        }
        builder.build(config, self)
    }

    /// Build `kind` from `config`, or `None` if it cannot contribute.
    ///
    /// The reason is logged at `debug` level and otherwise discarded.
    #[must_use]
    pub fn create_rule(&self, kind: &str, config: &Value) -> Option<Condition> {
        match self.try_create_rule(kind, config) {
            Ok(condition) => Some(condition),
            Err(error) => {
                tracing::debug!(kind, depth = self.depth, %error, "dropping rule fragment");
                None
            }
        }
    }
}

impl fmt::Debug for BuildScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildScope")
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
///
/// Registration only happens here; the built registry is immutable.
#[derive(Default)]
pub struct RegistryBuilder {
    builders: HashMap<String, Box<dyn RuleBuilder>>,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder for `kind`. A later registration of the same kind wins.
    #[must_use]
    pub fn register(mut self, kind: &str, builder: impl RuleBuilder + 'static) -> Self {
        if self.builders.insert(kind.to_owned(), Box::new(builder)).is_some() {
            tracing::debug!(kind, "replacing registered rule builder");
        }
        self
    }

    /// Freeze the registry. No further registration is possible.
    #[must_use]
    pub fn build(self) -> Registry {
        Registry {
            builders: self.builders,
        }
    }
}

/// Immutable mapping from condition kind to [`RuleBuilder`].
pub struct Registry {
    builders: HashMap<String, Box<dyn RuleBuilder>>,
}

impl Registry {
    /// A registry holding the built-in kinds (see [`register_core_rules`](crate::register_core_rules)).
    #[must_use]
    pub fn with_core_rules() -> Self {
        crate::register_core_rules(RegistryBuilder::new()).build()
    }

    /// Build a top-level condition of `kind`, or `None` if the kind is unknown
    /// or the fragment cannot compile.
    ///
    /// "No rule produced" means "this fragment contributes nothing"; it is
    /// never fatal.
    #[must_use]
    pub fn create_rule(&self, kind: &str, config: &Value) -> Option<Condition> {
        BuildScope::root(self).create_rule(kind, config)
    }

    /// Like [`create_rule`](Self::create_rule), but reports why nothing was built.
    ///
    /// # Errors
    ///
    /// See [`BuildScope::try_create_rule`].
    pub fn try_create_rule(&self, kind: &str, config: &Value) -> Result<Condition, LabelError> {
        BuildScope::root(self).try_create_rule(kind, config)
    }

    /// Returns `true` if `kind` is registered.
    #[must_use]
    pub fn contains(&self, kind: &str) -> bool {
        self.builders.contains_key(kind)
    }

    /// All registered kinds (sorted).
    #[must_use]
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Returns the number of registered kinds.
    #[must_use]
    pub fn len(&self) -> usize {
        self.builders.len()
    }

    /// Returns `true` if no kinds are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Process-wide registry
// ═══════════════════════════════════════════════════════════════════════════════

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install the process-wide registry. Call once, at startup, before evaluating.
///
/// # Errors
///
/// [`LabelError::RegistryInitialized`] if a registry is already installed
/// (including the default one installed by an earlier [`global`] call).
pub fn initialize(registry: Registry) -> Result<(), LabelError> {
    GLOBAL
        .set(registry)
        .map_err(|_| LabelError::RegistryInitialized)
}

/// The process-wide registry.
///
/// Falls back to [`Registry::with_core_rules`] when [`initialize`] was never called.
pub fn global() -> &'static Registry {
    GLOBAL.get_or_init(Registry::with_core_rules)
}
