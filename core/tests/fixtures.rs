//! Fixture tests: YAML rule descriptions run against PR snapshots.
//!
//! Each file under `tests/fixtures/` holds one or more fixtures separated by
//! `---`. A case lists the labels it expects, each with its matched files;
//! any label not listed must not match.

use labelr::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct Fixture {
    name: String,
    #[allow(dead_code)]
    description: String,
    rules: serde_json::Value,
    cases: Vec<Case>,
}

#[derive(Debug, Deserialize)]
struct Case {
    name: String,
    context: PrContext,
    #[serde(default)]
    expect: BTreeMap<String, Vec<String>>,
}

impl Fixture {
    fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        serde_yaml::Deserializer::from_str(yaml)
            .map(Self::deserialize)
            .collect()
    }

    fn run_and_assert(&self, registry: &Registry) {
        let rules = RulesConfig::from_value(self.rules.clone())
            .unwrap_or_else(|e| panic!("fixture '{}': {e}", self.name));
        let set = Compiler::new(registry).compile(&rules);

        for case in &self.cases {
            let actual: BTreeMap<String, Vec<String>> = set
                .classify(&case.context)
                .matches
                .into_iter()
                .map(|m| (m.label, m.matched_files))
                .collect();
            assert_eq!(
                actual, case.expect,
                "Fixture '{}' case '{}' failed",
                self.name, case.name
            );
        }
    }
}

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn run_fixture_file(name: &str) {
    let path = fixtures_dir().join(name);
    let yaml = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {e}", path.display()));
    let fixtures = Fixture::from_yaml_multi(&yaml)
        .unwrap_or_else(|e| panic!("Failed to parse {}: {e}", path.display()));
    assert!(!fixtures.is_empty(), "{} holds no fixtures", path.display());

    let registry = Registry::with_core_rules();
    for fixture in fixtures {
        fixture.run_and_assert(&registry);
    }
}

#[test]
fn test_text_matching() {
    run_fixture_file("text_matching.yaml");
}

#[test]
fn test_file_matching() {
    run_fixture_file("file_matching.yaml");
}

#[test]
fn test_composites() {
    run_fixture_file("composites.yaml");
}

#[test]
fn test_first_match_wins() {
    run_fixture_file("first_match_wins.yaml");
}
