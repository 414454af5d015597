//! Evaluation trace types for debugging label decisions.
//!
//! Trace types mirror [`Condition`](crate::Condition) but capture results
//! instead of patterns. They are what `debug_info` in a
//! [`MatchResult`](crate::MatchResult) is made of.
//!
//! # Two Levels of Trace
//!
//! - [`ConditionTrace`] — Per-condition: which sub-conditions fired, which files matched?
//! - [`LabelTrace`] — Per-label: how many groups were tried, which one won?

use crate::TextField;
use serde::Serialize;
use std::collections::HashSet;

/// Trace of a condition evaluation.
///
/// In `All`/`Any`/`Or`, every child is evaluated (no short-circuit) for
/// maximum debugging value. The `matched` result is still correct.
///
/// Serializes with a `kind` tag carrying the rule key:
///
/// ```json
/// { "kind": "changed-files", "matched": true, "matched_files": ["README.md"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum ConditionTrace {
    /// A text field search.
    #[serde(rename = "text")]
    Text {
        /// The field that was searched.
        field: TextField,
        /// Whether any pattern matched.
        matched: bool,
        /// The first pattern (as written) that matched.
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
    },
    /// A changed-files glob match.
    #[serde(rename = "changed-files")]
    Files {
        /// Whether any file matched.
        matched: bool,
        /// Files that matched, in PR order.
        matched_files: Vec<String>,
    },
    /// AND: all children must match.
    #[serde(rename = "all")]
    All {
        /// Whether all children matched.
        matched: bool,
        /// Trace of each child.
        children: Vec<ConditionTrace>,
    },
    /// OR: any child must match.
    #[serde(rename = "any")]
    Any {
        /// Whether any child matched.
        matched: bool,
        /// Trace of each child.
        children: Vec<ConditionTrace>,
    },
    /// Or over branch/title/body.
    #[serde(rename = "or")]
    Or {
        /// Whether any field matched.
        matched: bool,
        /// Trace of each configured field.
        children: Vec<ConditionTrace>,
    },
    /// An extension kind.
    #[serde(rename = "custom")]
    Custom {
        /// The registered kind name.
        name: String,
        /// Whether it matched.
        matched: bool,
    },
}

impl ConditionTrace {
    /// Get the overall match result of this node.
    #[must_use]
    pub fn matched(&self) -> bool {
        match self {
            Self::Text { matched, .. }
            | Self::Files { matched, .. }
            | Self::All { matched, .. }
            | Self::Any { matched, .. }
            | Self::Or { matched, .. }
            | Self::Custom { matched, .. } => *matched,
        }
    }

    /// Every file reported by a `changed-files` node in this tree.
    ///
    /// Depth-first, in declaration order, without duplicates.
    #[must_use]
    pub fn matched_files(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        self.collect_files(&mut seen, &mut out);
        out
    }

    fn collect_files<'a>(&'a self, seen: &mut HashSet<&'a str>, out: &mut Vec<String>) {
        match self {
            Self::Files { matched_files, .. } => {
                for file in matched_files {
                    if seen.insert(file.as_str()) {
                        out.push(file.clone());
                    }
                }
            }
            Self::All { children, .. } | Self::Any { children, .. } | Self::Or { children, .. } => {
                for child in children {
                    child.collect_files(seen, out);
                }
            }
            Self::Text { .. } | Self::Custom { .. } => {}
        }
    }
}

/// Trace of one label's evaluation.
///
/// # INV: first-match-wins
///
/// `trace` describes the winning group only. Groups after it were never
/// evaluated, and groups before it are counted in `groups_evaluated`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelTrace {
    /// How many groups were evaluated (stops after the winner).
    pub groups_evaluated: usize,
    /// Index of the winning group in declaration order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_group: Option<usize>,
    /// Full trace of the winning group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<ConditionTrace>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(matched: &[&str]) -> ConditionTrace {
        ConditionTrace::Files {
            matched: !matched.is_empty(),
            matched_files: matched.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn matched_reflects_node() {
        assert!(files(&["a"]).matched());
        assert!(!ConditionTrace::All {
            matched: false,
            children: vec![]
        }
        .matched());
        assert!(ConditionTrace::Custom {
            name: "min-files".into(),
            matched: true
        }
        .matched());
    }

    #[test]
    fn matched_files_unions_in_order() {
        let trace = ConditionTrace::Any {
            matched: true,
            children: vec![
                ConditionTrace::Text {
                    field: TextField::Title,
                    matched: true,
                    pattern: Some("^docs".into()),
                },
                files(&["b.md", "a.md"]),
                files(&["a.md", "c.md"]),
            ],
        };
        assert_eq!(trace.matched_files(), vec!["b.md", "a.md", "c.md"]);
    }

    #[test]
    fn matched_files_dedups_large_overlapping_nodes() {
        let paths: Vec<String> = (0..2_000).map(|i| format!("src/f{i}.rs")).collect();
        let node = || ConditionTrace::Files {
            matched: true,
            matched_files: paths.clone(),
        };
        let trace = ConditionTrace::All {
            matched: true,
            children: vec![
                node(),
                ConditionTrace::Any {
                    matched: true,
                    children: vec![node(), files(&["README.md", "src/f0.rs"])],
                },
                node(),
            ],
        };
        let collected = trace.matched_files();
        assert_eq!(collected.len(), 2_001);
        assert_eq!(collected[..2_000], paths[..]);
        assert_eq!(collected[2_000], "README.md");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let trace = ConditionTrace::Text {
            field: TextField::Branch,
            matched: false,
            pattern: None,
        };
        assert_eq!(
            serde_json::to_value(&trace).unwrap(),
            serde_json::json!({ "kind": "text", "field": "head-branch", "matched": false })
        );
    }

    #[test]
    fn empty_label_trace_serializes_compactly() {
        let trace = LabelTrace {
            groups_evaluated: 2,
            ..LabelTrace::default()
        };
        assert_eq!(
            serde_json::to_value(&trace).unwrap(),
            serde_json::json!({ "groups_evaluated": 2 })
        );
    }
}
