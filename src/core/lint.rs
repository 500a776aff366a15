//! Soft content-bank checks. Nothing here blocks loading; these are the
//! things an author usually wants to hear about anyway.

use std::fmt;

use crate::core::template::{Placeholder, QuestionTemplate};
use crate::schema::bank::{ContentBank, Direction};

/// Pools smaller than this get a low-variety warning.
pub const MIN_ALTERNATIVES: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintWarning {
    pub path: String,
    pub message: String,
}

impl fmt::Display for LintWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

pub fn lint_bank(bank: &ContentBank) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    let mut warn = |path: String, message: String| warnings.push(LintWarning { path, message });

    let template = QuestionTemplate::parse(&bank.question_structure);
    for placeholder in Placeholder::ALL {
        match template.occurrences(placeholder) {
            1 => {}
            0 => warn(
                "question_structure".to_string(),
                format!("placeholder {} never appears", placeholder.token()),
            ),
            n => warn(
                "question_structure".to_string(),
                format!("placeholder {} appears {} times", placeholder.token(), n),
            ),
        }
    }

    let mut pools: Vec<(String, usize)> = vec![
        (
            "responses.acknowledgements".to_string(),
            bank.responses.acknowledgements.len(),
        ),
        (
            "responses.speculations".to_string(),
            bank.responses.speculations.len(),
        ),
    ];
    for (key, entry) in &bank.objects {
        pools.push((format!("objects.{}.observations", key), entry.observations.len()));
        pools.push((format!("objects.{}.causes", key), entry.causes.len()));
        pools.push((
            format!("objects.{}.mystical_questions", key),
            entry.mystical_questions.len(),
        ));
    }
    for (category, items) in bank.actions.iter() {
        for (key, item) in items {
            pools.push((format!("actions.{}.{}.actions", category, key), item.actions.len()));
            pools.push((
                format!("actions.{}.{}.valid_results", category, key),
                item.valid_results.len(),
            ));
        }
    }
    for (path, len) in pools {
        if len < MIN_ALTERNATIVES {
            warn(
                path,
                format!(
                    "only {} alternative(s) (minimum {} recommended)",
                    len, MIN_ALTERNATIVES
                ),
            );
        }
    }

    for (key, outcome) in &bank.responses.outcomes {
        let path = format!("responses.outcomes.{}", key);
        if !bank.objects.contains_key(key) {
            warn(path.clone(), format!("outcome entry for unknown object '{}'", key));
        }
        for direction in Direction::ALL {
            let items = outcome.items(direction);
            let mut any_known = false;
            for item in items {
                if bank.actions.contains_item(item) {
                    any_known = true;
                } else {
                    warn(
                        format!("{}.{}", path, direction.items_key()),
                        format!("item '{}' is not defined in any action category", item),
                    );
                }
            }
            if !any_known {
                warn(
                    format!("{}.{}", path, direction.items_key()),
                    "no eligible action items; the second response will always fall back"
                        .to_string(),
                );
            }
        }
    }

    warnings
}
