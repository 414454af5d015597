//! Compiler — Declarative rule description → compiled [`RuleSet`]
//!
//! A rule description maps each label to an ordered list of rule groups:
//!
//! ```yaml
//! docs:
//!   - any:
//!       - or:
//!           title: ["(?i)^docs:"]
//!       - changed-files: ["**/*.md"]
//!   - head-branch: ["^docs/"]
//! ```
//!
//! Every key of a rule group is resolved through the [`Registry`]. A key with
//! no registered kind, or whose fragment fails to compile, is dropped.
//!
//! # INV: no vacuous groups
//!
//! A group left with zero conditions is excluded from its label entirely.
//! It never becomes an empty `all` that matches every PR. A label left
//! with zero groups is excluded from the [`RuleSet`].

use crate::registry::{self, Registry};
use crate::{
    evaluate, Classification, Condition, ConditionTrace, MatchResult, PrContext, RulesConfig,
    MAX_CONDITIONS_PER_COMPOSITE,
};
use serde_json::{Map, Value};

// ═══════════════════════════════════════════════════════════════════════════════
// Compiled types
// ═══════════════════════════════════════════════════════════════════════════════

/// One compiled rule group: a non-empty conjunction of conditions.
#[derive(Debug)]
pub struct RuleGroup {
    conditions: Vec<Condition>,
}

impl RuleGroup {
    /// Wrap compiled conditions, or `None` if there are none.
    #[must_use]
    pub fn new(conditions: Vec<Condition>) -> Option<Self> {
        if conditions.is_empty() {
            None
        } else {
            Some(Self { conditions })
        }
    }

    /// The group's conditions, in declaration order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// True iff every condition is true (short-circuits).
    #[must_use]
    pub fn evaluate(&self, ctx: &PrContext) -> bool {
        self.conditions.iter().all(|c| c.evaluate(ctx))
    }

    /// Trace every condition.
    ///
    /// A single-condition group reports that condition directly.
    #[must_use]
    pub fn evaluate_with_trace(&self, ctx: &PrContext) -> ConditionTrace {
        if let [only] = self.conditions.as_slice() {
            return only.evaluate_with_trace(ctx);
        }
        let children: Vec<ConditionTrace> = self
            .conditions
            .iter()
            .map(|c| c.evaluate_with_trace(ctx))
            .collect();
        ConditionTrace::All {
            matched: children.iter().all(ConditionTrace::matched),
            children,
        }
    }

    /// Re-serialize as the rule group map (recognized keys only).
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .conditions
            .iter()
            .map(|c| (c.kind().to_owned(), c.config_value()))
            .collect();
        Value::Object(map)
    }
}

/// A label with its compiled rule groups.
#[derive(Debug)]
pub struct CompiledLabel {
    name: String,
    groups: Vec<RuleGroup>,
}

impl CompiledLabel {
    /// Create a compiled label.
    #[must_use]
    pub fn new(name: impl Into<String>, groups: Vec<RuleGroup>) -> Self {
        Self {
            name: name.into(),
            groups,
        }
    }

    /// The label name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rule groups in declaration order.
    #[must_use]
    pub fn groups(&self) -> &[RuleGroup] {
        &self.groups
    }

    /// Evaluate this label (first-match-wins over its groups).
    #[must_use]
    pub fn evaluate(&self, ctx: &PrContext) -> MatchResult {
        evaluate(&self.name, &self.groups, ctx)
    }
}

/// Every compiled label, in declaration order.
///
/// Immutable and `Send + Sync`: compile once, classify many PRs.
#[derive(Debug, Default)]
pub struct RuleSet {
    labels: Vec<CompiledLabel>,
}

impl RuleSet {
    /// Create a rule set from compiled labels.
    #[must_use]
    pub fn new(labels: Vec<CompiledLabel>) -> Self {
        Self { labels }
    }

    /// Evaluate every label independently and keep the ones that matched.
    #[must_use]
    pub fn classify(&self, ctx: &PrContext) -> Classification {
        let matches = self
            .labels
            .iter()
            .map(|label| label.evaluate(ctx))
            .filter(|result| result.matched)
            .collect();
        Classification { matches }
    }

    /// Look up a label by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CompiledLabel> {
        self.labels.iter().find(|l| l.name == name)
    }

    /// Iterate over labels in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CompiledLabel> {
        self.labels.iter()
    }

    /// Returns the number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if no label compiled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Re-serialize the compiled structure as a rule description.
    ///
    /// Dropped keys, groups, and labels do not appear.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .labels
            .iter()
            .map(|l| {
                let groups = l.groups.iter().map(RuleGroup::to_value).collect();
                (l.name.clone(), Value::Array(groups))
            })
            .collect();
        Value::Object(map)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Compiler
// ═══════════════════════════════════════════════════════════════════════════════

/// Compiles rule descriptions against a [`Registry`].
#[derive(Debug, Clone, Copy)]
pub struct Compiler<'r> {
    registry: &'r Registry,
}

impl<'r> Compiler<'r> {
    /// A compiler resolving kinds through `registry`.
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Compile a whole rule description.
    #[must_use]
    pub fn compile(&self, rules: &RulesConfig) -> RuleSet {
        let labels = rules
            .iter()
            .filter_map(|(name, groups)| {
                let groups = self.compile_groups(name, groups);
                if groups.is_empty() {
                    tracing::debug!(label = name, "no rule group compiled, dropping label");
                    return None;
                }
                Some(CompiledLabel::new(name, groups))
            })
            .collect();
        RuleSet::new(labels)
    }

    /// Compile one label's list of rule groups.
    ///
    /// Anything other than a list compiles to no groups.
    #[must_use]
    pub fn compile_groups(&self, label: &str, groups: &Value) -> Vec<RuleGroup> {
        let Some(items) = groups.as_array() else {
            tracing::debug!(label, "rule groups are not a list, skipping");
            return Vec::new();
        };
        items
            .iter()
            .enumerate()
            .filter_map(|(index, group)| {
                let compiled = self.compile_group(group);
                if compiled.is_none() {
                    tracing::debug!(label, group = index, "rule group compiled to nothing");
                }
                compiled
            })
            .collect()
    }

    /// Compile one rule group map, or `None` if no key compiled.
    #[must_use]
    pub fn compile_group(&self, group: &Value) -> Option<RuleGroup> {
        let map = group.as_object()?;
        let conditions: Vec<Condition> = map
            .iter()
            .filter_map(|(kind, config)| self.registry.create_rule(kind, config))
            .collect();
        if conditions.len() > MAX_CONDITIONS_PER_COMPOSITE {
            tracing::debug!(
                count = conditions.len(),
                max = MAX_CONDITIONS_PER_COMPOSITE,
                "rule group has too many conditions"
            );
            return None;
        }
        RuleGroup::new(conditions)
    }
}

impl Compiler<'static> {
    /// A compiler over the process-wide [`registry::global`] registry.
    #[must_use]
    pub fn global() -> Self {
        Self::new(registry::global())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(rules: Value) -> RuleSet {
        let registry = Registry::with_core_rules();
        let rules = RulesConfig::from_value(rules).unwrap();
        Compiler::new(&registry).compile(&rules)
    }

    #[test]
    fn unknown_key_group_is_excluded() {
        let set = compile(json!({ "x": [{ "bogus": ["a"] }, { "title": ["^x"] }] }));
        let label = set.get("x").unwrap();
        assert_eq!(label.groups().len(), 1);
    }

    #[test]
    fn unknown_only_label_is_excluded() {
        let set = compile(json!({ "x": [{ "bogus": ["a"] }], "y": "not-a-list" }));
        assert!(set.is_empty());
        // Nothing can match: no vacuously-true group survived.
        assert!(set.classify(&PrContext::new()).matches.is_empty());
    }

    #[test]
    fn group_is_a_conjunction() {
        let set = compile(json!({
            "release": [{ "head-branch": ["^release/"], "changed-files": ["CHANGELOG.md"] }]
        }));
        let only_branch = PrContext::new().with_branch("release/1.0");
        let both = only_branch.clone().with_changed_files(["CHANGELOG.md"]);
        assert!(set.classify(&only_branch).matches.is_empty());
        assert_eq!(set.classify(&both).labels(), vec!["release"]);
    }

    #[test]
    fn single_condition_group_traces_directly() {
        let set = compile(json!({ "x": [{ "title": ["^x"] }] }));
        let group = &set.get("x").unwrap().groups()[0];
        let trace = group.evaluate_with_trace(&PrContext::new().with_title("x"));
        assert!(matches!(trace, ConditionTrace::Text { matched: true, .. }));
    }

    #[test]
    fn to_value_drops_unrecognized() {
        let set = compile(json!({
            "docs": [{ "changed-files": "*.md", "reviewers": ["a"] }],
            "dead": [{ "nope": 1 }]
        }));
        assert_eq!(
            set.to_value(),
            json!({ "docs": [{ "changed-files": ["*.md"] }] })
        );
    }

    #[test]
    fn labels_keep_declaration_order() {
        let set = compile(json!({ "zeta": [{ "title": ["."] }], "alpha": [{ "title": ["."] }] }));
        let names: Vec<&str> = set.iter().map(CompiledLabel::name).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);
    }

    #[test]
    fn rule_set_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleSet>();
    }
}
