//! Content bank loading — format parsing, exhaustive validation, serialization.

use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use thiserror::Error;

use crate::schema::bank::{ActionCategory, ContentBank};

#[derive(Debug, Error)]
pub enum BankError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("unsupported content bank format '{0}': expected .json, .yaml, .yml or .ron")]
    UnsupportedFormat(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// One problem found while validating a content bank document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Dotted path to the offending node, e.g. `responses.outcomes.leaky_pipe.left`.
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Every issue found in a content bank document. Never partially accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// Whether some issue is reported at exactly this path.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "content bank is invalid ({} issue{})",
            self.issues.len(),
            if self.issues.len() == 1 { "" } else { "s" }
        )?;
        for issue in &self.issues {
            write!(f, "\n  - {}", issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl ContentBank {
    /// Load a content bank from a file, picking the parser by extension.
    pub fn load_from_path(path: &Path) -> Result<ContentBank, BankError> {
        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase();
        tracing::debug!(path = %path.display(), format = %extension, "loading content bank");

        let parse: fn(&str) -> Result<ContentBank, BankError> = match extension.as_str() {
            "json" => Self::from_json_str,
            "yaml" | "yml" => Self::from_yaml_str,
            "ron" => Self::from_ron_str,
            other => return Err(BankError::UnsupportedFormat(other.to_string())),
        };
        let contents = std::fs::read_to_string(path)?;
        let bank = parse(&contents)?;

        tracing::info!(
            path = %path.display(),
            objects = bank.objects.len(),
            items = bank.actions.iter().map(|(_, items)| items.len()).sum::<usize>(),
            "content bank loaded"
        );
        Ok(bank)
    }

    pub fn from_json_str(input: &str) -> Result<ContentBank, BankError> {
        let value: Value = serde_json::from_str(input)?;
        Ok(Self::from_value(value)?)
    }

    pub fn from_yaml_str(input: &str) -> Result<ContentBank, BankError> {
        let value: Value = serde_yaml::from_str(input)?;
        Ok(Self::from_value(value)?)
    }

    /// Parse RON map syntax: `{"objects": {...}, "question_structure": "...", ...}`.
    pub fn from_ron_str(input: &str) -> Result<ContentBank, BankError> {
        let value: Value = ron::from_str(input)?;
        Ok(Self::from_value(value)?)
    }

    /// Validate a document tree and convert it into a bank.
    ///
    /// The whole tree is walked and every issue collected before anything
    /// is deserialized, so an author sees all problems in one pass.
    pub fn from_value(value: Value) -> Result<ContentBank, ValidationError> {
        let mut validator = Validator::default();
        validator.check_bank(&value);
        validator.finish()?;

        serde_json::from_value(value).map_err(|e| ValidationError {
            issues: vec![ValidationIssue {
                path: String::new(),
                message: e.to_string(),
            }],
        })
    }

    /// Re-run validation on a bank built in code.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let value = serde_json::to_value(self).map_err(|e| ValidationError {
            issues: vec![ValidationIssue {
                path: String::new(),
                message: e.to_string(),
            }],
        })?;
        let mut validator = Validator::default();
        validator.check_bank(&value);
        validator.finish()
    }

    pub fn to_json_string(&self) -> Result<String, BankError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_yaml_string(&self) -> Result<String, BankError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn child(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

#[derive(Default)]
struct Validator {
    issues: Vec<ValidationIssue>,
}

impl Validator {
    fn report(&mut self, path: &str, message: impl Into<String>) {
        self.issues.push(ValidationIssue {
            path: path.to_string(),
            message: message.into(),
        });
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                issues: self.issues,
            })
        }
    }

    fn mapping<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value.as_object() {
            Some(map) => Some(map),
            None => {
                self.report(path, "expected a mapping");
                None
            }
        }
    }

    fn required<'v>(
        &mut self,
        map: &'v Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'v Value> {
        let value = map.get(key);
        if value.is_none() {
            self.report(&child(path, key), "missing required key");
        }
        value
    }

    fn string(&mut self, value: &Value, path: &str) {
        if !value.is_string() {
            self.report(path, "expected a string");
        }
    }

    fn string_list(&mut self, value: &Value, path: &str, non_empty: bool) {
        let Some(entries) = value.as_array() else {
            self.report(path, "expected a list of strings");
            return;
        };
        if non_empty && entries.is_empty() {
            self.report(path, "must contain at least one entry");
        }
        for (i, entry) in entries.iter().enumerate() {
            if !entry.is_string() {
                self.report(&format!("{}[{}]", path, i), "expected a string");
            }
        }
    }

    fn required_list(&mut self, map: &Map<String, Value>, key: &str, path: &str) {
        if let Some(value) = self.required(map, key, path) {
            self.string_list(value, &child(path, key), true);
        }
    }

    fn check_bank(&mut self, root: &Value) {
        let Some(root) = self.mapping(root, "") else {
            return;
        };

        let objects = self.required(root, "objects", "");
        if let Some(objects) = objects {
            self.check_objects(objects);
        }
        if let Some(structure) = self.required(root, "question_structure", "") {
            self.string(structure, "question_structure");
        }
        if let Some(responses) = self.required(root, "responses", "") {
            self.check_responses(responses, objects.and_then(Value::as_object));
        }
        if let Some(actions) = self.required(root, "actions", "") {
            self.check_actions(actions);
        }
    }

    fn check_objects(&mut self, objects: &Value) {
        let Some(objects) = self.mapping(objects, "objects") else {
            return;
        };
        if objects.is_empty() {
            self.report("objects", "must contain at least one object");
        }
        for (key, entry) in objects {
            let path = child("objects", key);
            if let Some(entry) = self.mapping(entry, &path) {
                self.required_list(entry, "observations", &path);
                self.required_list(entry, "causes", &path);
                self.required_list(entry, "mystical_questions", &path);
            }
        }
    }

    fn check_responses(&mut self, responses: &Value, objects: Option<&Map<String, Value>>) {
        let Some(responses) = self.mapping(responses, "responses") else {
            return;
        };
        self.required_list(responses, "acknowledgements", "responses");
        self.required_list(responses, "speculations", "responses");

        let Some(outcomes) = self.required(responses, "outcomes", "responses") else {
            return;
        };
        let Some(outcomes) = self.mapping(outcomes, "responses.outcomes") else {
            return;
        };

        for (key, entry) in outcomes {
            let path = child("responses.outcomes", key);
            let Some(entry) = self.mapping(entry, &path) else {
                continue;
            };
            self.required_list(entry, "left", &path);
            self.required_list(entry, "right", &path);
            for items_key in ["left_items", "right_items"] {
                if let Some(items) = entry.get(items_key) {
                    self.string_list(items, &child(&path, items_key), false);
                }
            }
        }

        // Every object needs somewhere to go in the first response.
        if let Some(objects) = objects {
            for key in objects.keys() {
                if !outcomes.contains_key(key) {
                    self.report(
                        &child("responses.outcomes", key),
                        format!("missing outcome entry for object '{}'", key),
                    );
                }
            }
        }
    }

    fn check_actions(&mut self, actions: &Value) {
        let Some(actions) = self.mapping(actions, "actions") else {
            return;
        };
        for category in ActionCategory::ALL {
            let path = child("actions", category.key());
            let Some(items) = self.required(actions, category.key(), "actions") else {
                continue;
            };
            let Some(items) = self.mapping(items, &path) else {
                continue;
            };
            for (key, item) in items {
                let item_path = child(&path, key);
                let Some(item) = self.mapping(item, &item_path) else {
                    continue;
                };
                if let Some(name) = self.required(item, "name", &item_path) {
                    self.string(name, &child(&item_path, "name"));
                }
                self.required_list(item, "actions", &item_path);
                self.required_list(item, "valid_results", &item_path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "objects": {
            "leaky_pipe": {
                "observations": ["the water pressure lower than usual?"],
                "causes": ["those old pipes finally giving up?"],
                "mystical_questions": ["Should we call maintenance right away?"]
            }
        },
        "question_structure": "Have you noticed [observation]? I wonder if it's because [cause]. [mystical_question]",
        "responses": {
            "acknowledgements": ["I see."],
            "speculations": ["Let's investigate."],
            "outcomes": {
                "leaky_pipe": {
                    "left": ["it was indeed the pipes"],
                    "left_items": ["wrench"],
                    "right": ["it was something else entirely"],
                    "right_items": []
                }
            }
        },
        "actions": {
            "objects": {
                "wrench": {
                    "name": "the wrench",
                    "actions": ["tighten"],
                    "valid_results": ["and see if that helps"]
                }
            },
            "npcs": {},
            "locations": {}
        }
    }"#;

    fn minimal_value() -> Value {
        serde_json::from_str(MINIMAL).unwrap()
    }

    fn validation_error(value: Value) -> ValidationError {
        ContentBank::from_value(value).unwrap_err()
    }

    #[test]
    fn load_minimal_bank() {
        let bank = ContentBank::from_json_str(MINIMAL).unwrap();
        assert_eq!(bank.objects.len(), 1);
        assert_eq!(bank.actions.objects["wrench"].name, "the wrench");
        assert!(bank.responses.outcomes["leaky_pipe"].right_items.is_empty());
    }

    #[test]
    fn missing_top_level_keys_are_all_reported() {
        let err = validation_error(serde_json::json!({ "question_structure": "[cause]" }));
        assert!(err.has_issue_at("objects"));
        assert!(err.has_issue_at("responses"));
        assert!(err.has_issue_at("actions"));
        assert!(!err.has_issue_at("question_structure"));
        assert_eq!(err.issues.len(), 3);
    }

    #[test]
    fn missing_nested_keys_are_reported() {
        let mut value = minimal_value();
        value["responses"].as_object_mut().unwrap().remove("speculations");
        value["actions"].as_object_mut().unwrap().remove("npcs");
        value["actions"].as_object_mut().unwrap().remove("locations");
        let err = validation_error(value);
        assert!(err.has_issue_at("responses.speculations"));
        assert!(err.has_issue_at("actions.npcs"));
        assert!(err.has_issue_at("actions.locations"));
    }

    #[test]
    fn object_without_outcome_fails_referential_integrity() {
        let mut value = minimal_value();
        value["objects"]["flickering_light"] = serde_json::json!({
            "observations": ["the lights flickering?"],
            "causes": ["a loose wire?"],
            "mystical_questions": ["Is it a sign?"]
        });
        let err = validation_error(value);
        assert_eq!(err.issues.len(), 1);
        assert!(err.has_issue_at("responses.outcomes.flickering_light"));
    }

    #[test]
    fn empty_pools_are_rejected() {
        let mut value = minimal_value();
        value["objects"]["leaky_pipe"]["causes"] = serde_json::json!([]);
        value["responses"]["acknowledgements"] = serde_json::json!([]);
        value["actions"]["objects"]["wrench"]["valid_results"] = serde_json::json!([]);
        value["responses"]["outcomes"]["leaky_pipe"]["left"] = serde_json::json!([]);
        let err = validation_error(value);
        assert!(err.has_issue_at("objects.leaky_pipe.causes"));
        assert!(err.has_issue_at("responses.acknowledgements"));
        assert!(err.has_issue_at("actions.objects.wrench.valid_results"));
        assert!(err.has_issue_at("responses.outcomes.leaky_pipe.left"));
        assert_eq!(err.issues.len(), 4);
    }

    #[test]
    fn empty_item_lists_are_allowed() {
        let mut value = minimal_value();
        value["responses"]["outcomes"]["leaky_pipe"]
            .as_object_mut()
            .unwrap()
            .remove("right_items");
        assert!(ContentBank::from_value(value).is_ok());
    }

    #[test]
    fn wrong_types_are_reported_with_paths() {
        let mut value = minimal_value();
        value["question_structure"] = serde_json::json!(42);
        value["actions"]["objects"]["wrench"]["actions"] = serde_json::json!(["tighten", 7]);
        let err = validation_error(value);
        assert!(err.has_issue_at("question_structure"));
        assert!(err.has_issue_at("actions.objects.wrench.actions[1]"));
    }

    #[test]
    fn empty_objects_are_rejected() {
        let mut value = minimal_value();
        value["objects"] = serde_json::json!({});
        value["responses"]["outcomes"] = serde_json::json!({});
        let err = validation_error(value);
        assert!(err.has_issue_at("objects"));
    }

    #[test]
    fn validation_error_lists_every_issue() {
        let err = validation_error(serde_json::json!({}));
        let text = err.to_string();
        assert!(text.starts_with("content bank is invalid (4 issues)"));
        assert!(text.contains("question_structure: missing required key"));
    }

    #[test]
    fn yaml_and_ron_load_the_same_bank() {
        let from_json = ContentBank::from_json_str(MINIMAL).unwrap();
        let yaml = from_json.to_yaml_string().unwrap();
        assert_eq!(ContentBank::from_yaml_str(&yaml).unwrap(), from_json);
        // JSON maps are valid RON maps.
        assert_eq!(ContentBank::from_ron_str(MINIMAL).unwrap(), from_json);
    }

    #[test]
    fn json_round_trip() {
        let bank = ContentBank::from_json_str(MINIMAL).unwrap();
        let serialized = bank.to_json_string().unwrap();
        let reloaded = ContentBank::from_json_str(&serialized).unwrap();
        assert_eq!(reloaded, bank);
    }

    #[test]
    fn validate_catches_banks_built_in_code() {
        let mut bank = ContentBank::from_json_str(MINIMAL).unwrap();
        assert!(bank.validate().is_ok());
        bank.responses.outcomes.clear();
        let err = bank.validate().unwrap_err();
        assert!(err.has_issue_at("responses.outcomes.leaky_pipe"));
    }

    #[test]
    fn unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bank.toml");
        std::fs::write(&path, "").unwrap();
        let err = ContentBank::load_from_path(&path).unwrap_err();
        assert!(matches!(err, BankError::UnsupportedFormat(ext) if ext == "toml"));
    }

    #[test]
    fn extension_is_checked_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContentBank::load_from_path(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, BankError::UnsupportedFormat(ext) if ext == "toml"));

        let err = ContentBank::load_from_path(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(err, BankError::Io(_)));
    }
}
