//! Scenario compiler — renders a Jinja page template with a YAML content
//! config into a validated JSON content bank.

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use crate::core::bank::ValidationError;
use crate::schema::bank::{ActionCategory, ContentBank};

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("generated invalid JSON: {0}")]
    Render(#[source] serde_json::Error),
    #[error("JSON error: {0}")]
    Json(#[source] serde_json::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A top-level section of the content config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Objects,
    QuestionStructure,
    Responses,
    Actions,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Self::Objects,
        Self::QuestionStructure,
        Self::Responses,
        Self::Actions,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Objects => "objects",
            Self::QuestionStructure => "question_structure",
            Self::Responses => "responses",
            Self::Actions => "actions",
        }
    }
}

/// Render a page template against a config tree.
///
/// The config's top-level sections are the template variables. Referencing
/// an undefined variable is an error. The output is not checked here.
pub fn render_page(template: &str, config: &Value) -> Result<String, CompileError> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_template("page", template)?;
    let page = env.get_template("page")?;
    Ok(page.render(config)?)
}

/// Check the required top-level and nested keys of a content config.
pub fn validate_config(config: &Value) -> Result<(), CompileError> {
    let root = config
        .as_object()
        .ok_or_else(|| CompileError::Config("config must be a mapping".to_string()))?;
    for section in Section::ALL {
        if !root.contains_key(section.key()) {
            return Err(CompileError::Config(format!(
                "missing required key: {}",
                section.key()
            )));
        }
    }

    if !section_has_all(root, "responses", &["acknowledgements", "outcomes", "speculations"]) {
        return Err(CompileError::Config(
            "responses must contain acknowledgements, outcomes, and speculations".to_string(),
        ));
    }
    let categories = ActionCategory::ALL.map(|c| c.key());
    if !section_has_all(root, "actions", &categories) {
        return Err(CompileError::Config(
            "actions must contain objects, npcs, and locations sections".to_string(),
        ));
    }
    Ok(())
}

fn section_has_all(root: &serde_json::Map<String, Value>, section: &str, keys: &[&str]) -> bool {
    root.get(section)
        .and_then(Value::as_object)
        .is_some_and(|map| keys.iter().all(|k| map.contains_key(*k)))
}

/// Compile template and YAML config text into a validated bank.
pub fn compile_str(template: &str, config_yaml: &str) -> Result<ContentBank, CompileError> {
    let config: Value = serde_yaml::from_str(config_yaml)?;
    validate_config(&config)?;
    ContentBank::from_value(config.clone())?;

    let rendered = render_page(template, &config)?;
    let value: Value = serde_json::from_str(&rendered).map_err(CompileError::Render)?;
    Ok(ContentBank::from_value(value)?)
}

/// Compile a scenario and write it as 4-space indented JSON. Nothing is
/// written unless the rendered page is a valid content bank.
pub fn compile_scenario(
    template_path: &Path,
    config_path: &Path,
    output_path: &Path,
) -> Result<ContentBank, CompileError> {
    tracing::debug!(
        template = %template_path.display(),
        config = %config_path.display(),
        "compiling scenario"
    );
    let template = std::fs::read_to_string(template_path)?;
    let config = std::fs::read_to_string(config_path)?;
    let bank = compile_str(&template, &config)?;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    bank.serialize(&mut serializer).map_err(CompileError::Json)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(output_path, buf)?;

    tracing::info!(
        output = %output_path.display(),
        objects = bank.objects.len(),
        "scenario written"
    );
    Ok(bank)
}
