//! Rule description loading.
//!
//! A rule description is an ordered map of label → list of rule groups.
//! Fragments stay as [`serde_json::Value`] until compiled, so kinds added
//! through the registry need no change here.
//!
//! Both YAML and JSON are accepted; [`RulesConfig::from_path`] picks the format
//! from the file extension (`.json` is JSON, anything else is YAML).

use crate::LabelError;
use serde_json::{Map, Value};
use std::path::Path;

/// A parsed, not yet compiled, rule description.
///
/// Label order is the order of the source document.
///
/// ```
/// use labelr::RulesConfig;
///
/// let rules = RulesConfig::from_yaml_str("
/// bug:
///   - head-branch: ['^fix/']
/// docs:
///   - changed-files: ['docs/**']
/// ").unwrap();
///
/// let labels: Vec<&str> = rules.iter().map(|(name, _)| name).collect();
/// assert_eq!(labels, vec!["bug", "docs"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RulesConfig {
    labels: Map<String, Value>,
}

impl RulesConfig {
    /// Wrap an already decoded document.
    ///
    /// `null` (an empty document) is an empty description.
    ///
    /// # Errors
    ///
    /// [`LabelError::InvalidConfig`] if the document is not a map.
    pub fn from_value(value: Value) -> Result<Self, LabelError> {
        match value {
            Value::Object(labels) => Ok(Self { labels }),
            Value::Null => Ok(Self::default()),
            other => Err(LabelError::InvalidConfig {
                kind: "rules".into(),
                reason: format!("expected a map of label to rule groups, got {}", type_name(&other)),
            }),
        }
    }

    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// [`LabelError::Parse`] on malformed YAML, otherwise as [`from_value`](Self::from_value).
    pub fn from_yaml_str(input: &str) -> Result<Self, LabelError> {
        let value: Value = serde_yaml::from_str(input).map_err(|e| LabelError::Parse {
            format: "YAML",
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Parse a JSON document.
    ///
    /// # Errors
    ///
    /// [`LabelError::Parse`] on malformed JSON, otherwise as [`from_value`](Self::from_value).
    pub fn from_json_str(input: &str) -> Result<Self, LabelError> {
        let value: Value = serde_json::from_str(input).map_err(|e| LabelError::Parse {
            format: "JSON",
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    /// Read and parse a rules file.
    ///
    /// # Errors
    ///
    /// [`LabelError::Io`] if the file cannot be read, otherwise as the
    /// format-specific parser.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LabelError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| LabelError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&input)
        } else {
            Self::from_yaml_str(&input)
        }
    }

    /// Iterate over `(label, rule groups)` in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// The raw rule groups of one label.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.labels.get(label)
    }

    /// Returns the number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if the description has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a map",
    }
}
