//! Built-in rule builders.
//!
//! | Kind | Fragment shape | Builds |
//! |------|----------------|--------|
//! | `head-branch` / `title` / `body` | pattern list or single string | [`Condition::Text`] |
//! | `changed-files` | glob list or single string | [`Condition::Files`] |
//! | `or` | map of `head-branch` / `title` / `body` → patterns | [`Condition::Or`] |
//! | `all` / `any` | list of nested fragments | [`Condition::All`] / [`Condition::Any`] |

use crate::registry::{BuildScope, RegistryBuilder, RuleBuilder};
use crate::{
    Condition, FileCondition, LabelError, MetadataOr, TextCondition, TextField,
    MAX_CONDITIONS_PER_COMPOSITE,
};
use serde_json::Value;

/// Register every built-in kind on `builder`.
///
/// ```
/// use labelr::{register_core_rules, RegistryBuilder};
///
/// let registry = register_core_rules(RegistryBuilder::new()).build();
/// assert_eq!(registry.len(), 7);
/// ```
#[must_use]
pub fn register_core_rules(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register("all", AllRuleBuilder)
        .register("any", AnyRuleBuilder)
        .register("or", OrRuleBuilder)
        .register("changed-files", FilesRuleBuilder)
        .register("head-branch", TextRuleBuilder(TextField::Branch))
        .register("title", TextRuleBuilder(TextField::Title))
        .register("body", TextRuleBuilder(TextField::Body))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Pattern lists
// ═══════════════════════════════════════════════════════════════════════════════

/// A list of strings, or one string standing for a one-element list.
fn pattern_list(config: &Value) -> Option<Vec<&str>> {
    match config {
        Value::String(s) => Some(vec![s.as_str()]),
        Value::Array(items) => items.iter().map(Value::as_str).collect(),
        _ => None,
    }
}

fn require_patterns<'v>(kind: &str, config: &'v Value) -> Result<Vec<&'v str>, LabelError> {
    pattern_list(config).ok_or_else(|| LabelError::InvalidConfig {
        kind: kind.to_owned(),
        reason: "expected a string or a list of strings".into(),
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Leaves
// ═══════════════════════════════════════════════════════════════════════════════

/// Builds a [`TextCondition`] over one field.
#[derive(Debug, Clone, Copy)]
pub struct TextRuleBuilder(pub TextField);

impl RuleBuilder for TextRuleBuilder {
    fn can_build(&self, config: &Value) -> bool {
        pattern_list(config).is_some()
    }

    fn build(&self, config: &Value, _scope: &BuildScope<'_>) -> Result<Condition, LabelError> {
        let patterns = require_patterns(self.0.key(), config)?;
        Ok(Condition::Text(TextCondition::compile(self.0, patterns)?))
    }
}

/// Builds a [`FileCondition`].
#[derive(Debug, Clone, Copy)]
pub struct FilesRuleBuilder;

impl RuleBuilder for FilesRuleBuilder {
    fn can_build(&self, config: &Value) -> bool {
        pattern_list(config).is_some()
    }

    fn build(&self, config: &Value, _scope: &BuildScope<'_>) -> Result<Condition, LabelError> {
        let patterns = require_patterns("changed-files", config)?;
        Ok(Condition::Files(FileCondition::compile(patterns)?))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Composites
// ═══════════════════════════════════════════════════════════════════════════════

/// Builds a [`MetadataOr`] from its `head-branch` / `title` / `body` sub-keys.
///
/// Other sub-keys are skipped. A bad pattern in any field fails the whole `or`.
#[derive(Debug, Clone, Copy)]
pub struct OrRuleBuilder;

impl RuleBuilder for OrRuleBuilder {
    fn can_build(&self, config: &Value) -> bool {
        config.is_object()
    }

    fn build(&self, config: &Value, _scope: &BuildScope<'_>) -> Result<Condition, LabelError> {
        let map = config.as_object().ok_or_else(|| LabelError::InvalidConfig {
            kind: "or".into(),
            reason: "expected a map".into(),
        })?;

        let mut or = MetadataOr::new();
        for (key, value) in map {
            let Some(field) = TextField::from_key(key) else {
                tracing::debug!(key = key.as_str(), "skipping unrecognized or key");
                continue;
            };
            let patterns = require_patterns(key, value)?;
            or = or.with(TextCondition::compile(field, patterns)?);
        }
        Ok(Condition::Or(or))
    }
}

/// Builds [`Condition::All`] from a list of nested fragments.
#[derive(Debug, Clone, Copy)]
pub struct AllRuleBuilder;

impl RuleBuilder for AllRuleBuilder {
    fn can_build(&self, config: &Value) -> bool {
        config.is_array()
    }

    fn build(&self, config: &Value, scope: &BuildScope<'_>) -> Result<Condition, LabelError> {
        build_children("all", config, scope).map(Condition::All)
    }
}

/// Builds [`Condition::Any`] from a list of nested fragments.
#[derive(Debug, Clone, Copy)]
pub struct AnyRuleBuilder;

impl RuleBuilder for AnyRuleBuilder {
    fn can_build(&self, config: &Value) -> bool {
        config.is_array()
    }

    fn build(&self, config: &Value, scope: &BuildScope<'_>) -> Result<Condition, LabelError> {
        build_children("any", config, scope).map(Condition::Any)
    }
}

/// Compile every key of every item in one nested scope.
///
/// Items that are not maps and keys that do not compile are dropped. A
/// composite left with no children does not compile.
fn build_children(
    kind: &str,
    config: &Value,
    scope: &BuildScope<'_>,
) -> Result<Vec<Condition>, LabelError> {
    let items = config.as_array().ok_or_else(|| LabelError::InvalidConfig {
        kind: kind.to_owned(),
        reason: "expected a list of fragments".into(),
    })?;
    let nested = scope.nested()?;

    let mut children = Vec::new();
    for item in items {
        let Some(fragment) = item.as_object() else {
            tracing::debug!(kind, "skipping non-map item");
            continue;
        };
        children.extend(
            fragment
                .iter()
                .filter_map(|(key, value)| nested.create_rule(key, value)),
        );
    }

    if children.len() > MAX_CONDITIONS_PER_COMPOSITE {
        return Err(LabelError::TooManyConditions {
            count: children.len(),
            max: MAX_CONDITIONS_PER_COMPOSITE,
        });
    }
    if children.is_empty() {
        return Err(LabelError::EmptyComposite {
            kind: kind.to_owned(),
        });
    }
    Ok(children)
}
