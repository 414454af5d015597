//! The registry is the only extension seam.
//!
//! These tests add condition kinds from outside the crate and check that the
//! compiler, evaluator and re-serialization pick them up unchanged.

use labelr::prelude::*;
use labelr::{register_core_rules, BuildScope};
use serde_json::{json, Value};

/// Matches PRs touching at least N files.
#[derive(Debug)]
struct MinFiles(u64);

impl CustomCondition for MinFiles {
    fn kind(&self) -> &str {
        "min-files"
    }

    fn evaluate(&self, ctx: &PrContext) -> bool {
        ctx.changed_files().len() as u64 >= self.0
    }

    fn config_value(&self) -> Value {
        self.0.into()
    }
}

struct MinFilesBuilder;

impl RuleBuilder for MinFilesBuilder {
    fn can_build(&self, config: &Value) -> bool {
        config.is_u64()
    }

    fn build(&self, config: &Value, _scope: &BuildScope<'_>) -> Result<Condition, LabelError> {
        let n = config.as_u64().ok_or_else(|| LabelError::InvalidConfig {
            kind: "min-files".into(),
            reason: "expected a non-negative integer".into(),
        })?;
        Ok(Condition::Custom(Box::new(MinFiles(n))))
    }
}

fn registry() -> Registry {
    register_core_rules(RegistryBuilder::new())
        .register("min-files", MinFilesBuilder)
        .build()
}

fn compile(registry: &Registry, yaml: &str) -> RuleSet {
    Compiler::new(registry).compile(&RulesConfig::from_yaml_str(yaml).unwrap())
}

#[test]
fn custom_kind_at_top_level() {
    let registry = registry();
    let set = compile(&registry, "large:\n  - min-files: 3\n");

    let small = PrContext::new().with_changed_files(["a", "b"]);
    let large = PrContext::new().with_changed_files(["a", "b", "c"]);
    assert!(set.classify(&small).is_empty());
    assert_eq!(set.classify(&large).labels(), vec!["large"]);
}

#[test]
fn custom_kind_nested_in_composite() {
    let registry = registry();
    let set = compile(
        &registry,
        r#"
risky:
  - all:
      - changed-files: ["migrations/**"]
      - min-files: 2
"#,
    );
    let ctx = PrContext::new().with_changed_files(["migrations/001.sql", "src/db.rs"]);
    let result = set.classify(&ctx);
    let risky = result.get("risky").unwrap();
    assert_eq!(risky.matched_files, vec!["migrations/001.sql".to_string()]);

    match &risky.debug_info.trace {
        Some(ConditionTrace::All { children, .. }) => {
            assert_eq!(
                children[1],
                ConditionTrace::Custom {
                    name: "min-files".into(),
                    matched: true
                }
            );
        }
        other => panic!("expected All trace, got {other:?}"),
    }
}

#[test]
fn custom_kind_round_trips() {
    let registry = registry();
    let set = compile(&registry, "large:\n  - min-files: 10\n    title: ['^big']\n");
    assert_eq!(
        set.to_value(),
        json!({ "large": [{ "min-files": 10, "title": ["^big"] }] })
    );
}

#[test]
fn custom_kind_wrong_shape_is_dropped() {
    let registry = registry();
    assert!(registry.create_rule("min-files", &json!("three")).is_none());
    assert!(matches!(
        registry.try_create_rule("min-files", &json!(-1)),
        Err(LabelError::InvalidConfig { .. })
    ));
}

#[test]
fn core_registry_does_not_know_custom_kind() {
    let set = compile(&Registry::with_core_rules(), "large:\n  - min-files: 1\n");
    assert!(set.is_empty());
}

#[test]
fn overriding_a_core_kind() {
    struct NeverFiles;

    impl RuleBuilder for NeverFiles {
        fn can_build(&self, _config: &Value) -> bool {
            true
        }

        fn build(&self, _config: &Value, _scope: &BuildScope<'_>) -> Result<Condition, LabelError> {
            Ok(Condition::Any(Vec::new()))
        }
    }

    let registry = register_core_rules(RegistryBuilder::new())
        .register("changed-files", NeverFiles)
        .build();
    let set = compile(&registry, "docs:\n  - changed-files: ['**']\n");
    assert!(set
        .classify(&PrContext::new().with_changed_files(["README.md"]))
        .is_empty());
}
