//! Evaluator — First-match-wins over a label's rule groups
//!
//! # INV: first-match-wins
//!
//! Groups are tried in declaration order and evaluation stops at the first
//! group that matches. `matched_files` and `debug_info` describe that group
//! only, never a union across groups.

use crate::{LabelTrace, PrContext, RuleGroup};
use serde::Serialize;

/// The outcome of evaluating one label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// The label name.
    pub label: String,
    /// Whether some rule group matched.
    pub matched: bool,
    /// Changed files reported by the winning group (empty when unmatched).
    pub matched_files: Vec<String>,
    /// Which group won and why.
    pub debug_info: LabelTrace,
}

/// Evaluate `groups` for `label`, stopping at the first group that matches.
///
/// The winning group is traced in full (no short-circuit) so that every file
/// node it holds reports its files, even when an earlier sibling decided the
/// result.
///
/// # Example
///
/// ```
/// use labelr::{evaluate, Compiler, PrContext, Registry};
/// use serde_json::json;
///
/// let registry = Registry::with_core_rules();
/// let groups = Compiler::new(&registry).compile_groups("rust", &json!([
///     { "changed-files": ["*.rs"] },
///     { "changed-files": ["*"] },
/// ]));
///
/// let ctx = PrContext::new().with_changed_files(["src/lib.rs", "README.md"]);
/// let result = evaluate("rust", &groups, &ctx);
/// assert!(result.matched);
/// assert_eq!(result.matched_files, vec!["src/lib.rs".to_string()]);
/// assert_eq!(result.debug_info.winning_group, Some(0));
/// ```
#[must_use]
pub fn evaluate(label: &str, groups: &[RuleGroup], ctx: &PrContext) -> MatchResult {
    for (index, group) in groups.iter().enumerate() {
        let matched = group.evaluate(ctx);
        tracing::trace!(label, group = index, matched, "evaluated rule group");
        if matched {
            let trace = group.evaluate_with_trace(ctx);
            return MatchResult {
                label: label.to_owned(),
                matched: true,
                matched_files: trace.matched_files(),
                debug_info: LabelTrace {
                    groups_evaluated: index + 1,
                    winning_group: Some(index),
                    trace: Some(trace),
                },
            };
        }
    }

    MatchResult {
        label: label.to_owned(),
        matched: false,
        matched_files: Vec::new(),
        debug_info: LabelTrace {
            groups_evaluated: groups.len(),
            ..LabelTrace::default()
        },
    }
}

/// The labels a PR was classified into.
///
/// Holds matched labels only, in rule declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// One result per matched label.
    pub matches: Vec<MatchResult>,
}

impl Classification {
    /// Matched label names in declaration order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        self.matches.iter().map(|m| m.label.as_str()).collect()
    }

    /// The result for `label`, if it matched.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&MatchResult> {
        self.matches.iter().find(|m| m.label == label)
    }

    /// Returns `true` if no label matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Compiler, ConditionTrace, Registry};
    use serde_json::{json, Value};

    fn groups(rules: Value) -> Vec<RuleGroup> {
        let registry = Registry::with_core_rules();
        Compiler::new(&registry).compile_groups("test", &rules)
    }

    #[test]
    fn no_groups_never_match() {
        let result = evaluate("x", &[], &PrContext::new());
        assert!(!result.matched);
        assert!(result.matched_files.is_empty());
        assert_eq!(result.debug_info, LabelTrace::default());
    }

    #[test]
    fn first_match_wins_for_files() {
        let groups = groups(json!([
            { "changed-files": ["*.md"] },
            { "changed-files": ["*.md", "*.rs"] },
        ]));
        let ctx = PrContext::new().with_changed_files(["README.md", "src/lib.rs"]);
        let result = evaluate("x", &groups, &ctx);
        assert_eq!(result.matched_files, vec!["README.md".to_string()]);
        assert_eq!(result.debug_info.groups_evaluated, 1);
    }

    #[test]
    fn later_group_wins_when_earlier_fails() {
        let groups = groups(json!([
            { "head-branch": ["^release/"] },
            { "changed-files": ["*.rs"] },
        ]));
        let ctx = PrContext::new()
            .with_branch("main")
            .with_changed_files(["src/lib.rs"]);
        let result = evaluate("x", &groups, &ctx);
        assert!(result.matched);
        assert_eq!(result.debug_info.groups_evaluated, 2);
        assert_eq!(result.debug_info.winning_group, Some(1));
    }

    #[test]
    fn unmatched_counts_every_group() {
        let groups = groups(json!([{ "title": ["a"] }, { "title": ["b"] }]));
        let result = evaluate("x", &groups, &PrContext::new().with_title("zzz"));
        assert!(!result.matched);
        assert_eq!(result.debug_info.groups_evaluated, 2);
        assert!(result.debug_info.trace.is_none());
    }

    #[test]
    fn matched_files_ignore_short_circuit() {
        let groups = groups(json!([{
            "any": [
                { "or": { "title": ["^docs"] } },
                { "changed-files": ["**/*.md"] }
            ]
        }]));
        let ctx = PrContext::new()
            .with_title("docs: x")
            .with_changed_files(["README.md", "main.go"]);
        let result = evaluate("docs", &groups, &ctx);
        assert_eq!(result.matched_files, vec!["README.md".to_string()]);
        match result.debug_info.trace {
            Some(ConditionTrace::Any { children, .. }) => assert_eq!(children.len(), 2),
            other => panic!("expected Any trace, got {other:?}"),
        }
    }

    #[test]
    fn serializes_for_output() {
        let groups = groups(json!([{ "title": ["^wip"] }]));
        let result = evaluate("wip", &groups, &PrContext::new().with_title("WIP"));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "label": "wip",
                "matched": true,
                "matched_files": [],
                "debug_info": {
                    "groups_evaluated": 1,
                    "winning_group": 0,
                    "trace": { "kind": "text", "field": "title", "matched": true, "pattern": "^wip" }
                }
            })
        );
    }
}
