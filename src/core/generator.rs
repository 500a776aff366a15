//! One-shot conversation generation: Question → Response1 → Response2.
//!
//! The stage composers are public so the interactive session can re-run a
//! single stage. Randomness is consumed in a fixed order per stage:
//!
//! - question: object key, observation, cause, mystical question
//! - response 1: acknowledgement, outcome, speculation
//! - response 2: category, item, action, result (pinned picks are skipped)
//!
//! `generate` draws the direction between the question and response 1.

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::core::sampler::{EmptyPoolError, FragmentSampler};
use crate::core::template::{QuestionFill, QuestionTemplate};
use crate::schema::bank::{ActionCategory, ActionItem, ContentBank, Direction};
use crate::schema::conversation::{Conversation, Suggestion};

/// Second response used when no action item is eligible.
pub const NO_SUGGESTION: &str = "I'm not sure what else to suggest for this situation.";

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    EmptyPool(#[from] EmptyPoolError),
    #[error("object '{0}' not found in content bank")]
    UnknownObject(String),
    #[error("object '{0}' has no outcome entry")]
    MissingOutcome(String),
}

/// Eligible items of one action category.
#[derive(Debug, Clone)]
pub struct EligibleGroup<'a> {
    pub category: ActionCategory,
    /// Items in key order.
    pub items: Vec<(&'a str, &'a ActionItem)>,
}

/// The action items a second response may suggest, grouped by category.
/// Categories without eligible items are dropped.
#[derive(Debug, Clone, Default)]
pub struct EligibleActions<'a> {
    groups: Vec<EligibleGroup<'a>>,
}

impl<'a> EligibleActions<'a> {
    /// Keep only items whose key is in `valid_items`.
    pub fn compute(bank: &'a ContentBank, valid_items: &FxHashSet<String>) -> Self {
        Self::collect(bank, |key| valid_items.contains(key))
    }

    /// Every item of every category, ignoring the first response.
    pub fn unfiltered(bank: &'a ContentBank) -> Self {
        Self::collect(bank, |_| true)
    }

    fn collect(bank: &'a ContentBank, keep: impl Fn(&str) -> bool) -> Self {
        let groups = bank
            .actions
            .iter()
            .map(|(category, items)| EligibleGroup {
                category,
                items: items
                    .iter()
                    .filter(|(key, _)| keep(key))
                    .map(|(key, item)| (key.as_str(), item))
                    .collect(),
            })
            .filter(|group| !group.items.is_empty())
            .collect();
        Self { groups }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[EligibleGroup<'a>] {
        &self.groups
    }

    /// Eligible categories in cycling order.
    pub fn categories(&self) -> Vec<ActionCategory> {
        self.groups.iter().map(|g| g.category).collect()
    }

    pub fn group(&self, category: ActionCategory) -> Option<&EligibleGroup<'a>> {
        self.groups.iter().find(|g| g.category == category)
    }

    /// Eligible item keys of a category in cycling order.
    pub fn item_keys(&self, category: ActionCategory) -> Vec<&'a str> {
        self.group(category)
            .map(|g| g.items.iter().map(|(key, _)| *key).collect())
            .unwrap_or_default()
    }

    pub fn contains(&self, category: ActionCategory, item_key: &str) -> bool {
        self.group(category)
            .is_some_and(|g| g.items.iter().any(|(key, _)| *key == item_key))
    }
}

/// Output of the first response stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstResponse {
    pub text: String,
    pub valid_items: FxHashSet<String>,
}

/// Output of the second response stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecondResponse {
    pub text: String,
    pub suggestion: Option<Suggestion>,
}

/// Composes conversations from a content bank.
#[derive(Debug, Clone)]
pub struct ConversationGenerator<'a> {
    bank: &'a ContentBank,
    template: QuestionTemplate,
}

impl<'a> ConversationGenerator<'a> {
    pub fn new(bank: &'a ContentBank) -> Self {
        Self {
            bank,
            template: QuestionTemplate::parse(&bank.question_structure),
        }
    }

    pub fn bank(&self) -> &'a ContentBank {
        self.bank
    }

    /// Generate a full conversation with a random outcome direction. The
    /// second response only suggests items the first response made eligible.
    pub fn generate(&self, sampler: &mut FragmentSampler) -> Result<Conversation, GenerateError> {
        let (question, object_key) = self.compose_question(sampler)?;
        let direction = sampler.pick_direction();
        self.finish(question, object_key, direction, false, sampler)
    }

    /// Like [`generate`](Self::generate) with a fixed outcome direction.
    pub fn generate_with_direction(
        &self,
        direction: Direction,
        sampler: &mut FragmentSampler,
    ) -> Result<Conversation, GenerateError> {
        let (question, object_key) = self.compose_question(sampler)?;
        self.finish(question, object_key, direction, false, sampler)
    }

    /// Generate a conversation whose second response ignores the first
    /// response's items and may suggest anything in the bank.
    pub fn generate_unfiltered(
        &self,
        sampler: &mut FragmentSampler,
    ) -> Result<Conversation, GenerateError> {
        let (question, object_key) = self.compose_question(sampler)?;
        let direction = sampler.pick_direction();
        self.finish(question, object_key, direction, true, sampler)
    }

    fn finish(
        &self,
        question: String,
        object_key: String,
        direction: Direction,
        unfiltered: bool,
        sampler: &mut FragmentSampler,
    ) -> Result<Conversation, GenerateError> {
        let first = self.compose_response1(&object_key, direction, sampler)?;
        let eligible = if unfiltered {
            EligibleActions::unfiltered(self.bank)
        } else {
            EligibleActions::compute(self.bank, &first.valid_items)
        };
        let second = self.compose_response2(&eligible, None, None, sampler)?;

        Ok(Conversation {
            question,
            object_key,
            direction,
            response1: first.text,
            valid_items: first.valid_items,
            response2: second.text,
            suggestion: second.suggestion,
        })
    }

    /// Pick an object and fill the question structure from its pools.
    /// Returns the question text and the chosen object key.
    pub fn compose_question(
        &self,
        sampler: &mut FragmentSampler,
    ) -> Result<(String, String), GenerateError> {
        let (key, entry) = sampler.pick_from(self.bank.objects.iter(), "objects")?;
        let observation = sampler.pick_one(&entry.observations, "observations")?;
        let cause = sampler.pick_one(&entry.causes, "causes")?;
        let mystical_question = sampler.pick_one(&entry.mystical_questions, "mystical_questions")?;

        let text = self.template.render(&QuestionFill {
            observation,
            cause,
            mystical_question,
        });
        Ok((text, key.clone()))
    }

    /// Compose `"Ah, {acknowledgement} {outcome} {speculation}"` for an
    /// object and direction, and record the items it makes eligible.
    pub fn compose_response1(
        &self,
        object_key: &str,
        direction: Direction,
        sampler: &mut FragmentSampler,
    ) -> Result<FirstResponse, GenerateError> {
        if !self.bank.objects.contains_key(object_key) {
            return Err(GenerateError::UnknownObject(object_key.to_string()));
        }
        let outcomes = self
            .bank
            .responses
            .outcomes
            .get(object_key)
            .ok_or_else(|| GenerateError::MissingOutcome(object_key.to_string()))?;

        let responses = &self.bank.responses;
        let acknowledgement = sampler.pick_one(&responses.acknowledgements, "acknowledgements")?;
        let outcome = sampler.pick_one(outcomes.outcomes(direction), direction.key())?;
        let speculation = sampler.pick_one(&responses.speculations, "speculations")?;

        Ok(FirstResponse {
            text: format!("Ah, {} {} {}", acknowledgement, outcome, speculation),
            valid_items: outcomes.items(direction).iter().cloned().collect(),
        })
    }

    /// Compose `"Maybe you should {action} {item name}, {result}"`.
    ///
    /// A pinned category or item is used when it is eligible and picked at
    /// random otherwise. With nothing eligible the result is [`NO_SUGGESTION`].
    pub fn compose_response2(
        &self,
        eligible: &EligibleActions<'_>,
        pinned_category: Option<ActionCategory>,
        pinned_item: Option<&str>,
        sampler: &mut FragmentSampler,
    ) -> Result<SecondResponse, GenerateError> {
        if eligible.is_empty() {
            return Ok(SecondResponse {
                text: NO_SUGGESTION.to_string(),
                suggestion: None,
            });
        }

        let group = match pinned_category.and_then(|c| eligible.group(c)) {
            Some(group) => group,
            None => sampler.pick_one(eligible.groups(), "eligible categories")?,
        };
        let pinned = pinned_item.and_then(|k| group.items.iter().find(|(key, _)| *key == k));
        let (item_key, item) = match pinned {
            Some(entry) => *entry,
            None => *sampler.pick_one(&group.items, group.category.key())?,
        };

        let action = sampler.pick_one(&item.actions, "actions")?;
        let result = sampler.pick_one(&item.valid_results, "valid_results")?;

        Ok(SecondResponse {
            text: format!("Maybe you should {} {}, {}", action, item.name, result),
            suggestion: Some(Suggestion {
                category: group.category,
                item_key: item_key.to_string(),
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::bank::{Actions, ObjectEntry, OutcomeEntry, Responses};
    use std::collections::BTreeMap;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn item(name: &str, action: &str, result: &str) -> ActionItem {
        ActionItem {
            name: name.to_string(),
            actions: strings(&[action]),
            valid_results: strings(&[result]),
        }
    }

    fn leaky_pipe_bank() -> ContentBank {
        ContentBank {
            objects: BTreeMap::from([(
                "leaky_pipe".to_string(),
                ObjectEntry {
                    observations: strings(&["the water pressure lower than usual?"]),
                    causes: strings(&["those old pipes finally giving up?"]),
                    mystical_questions: strings(&["Should we call maintenance right away?"]),
                },
            )]),
            question_structure:
                "Have you noticed [observation]? I wonder if it's because [cause]. [mystical_question]"
                    .to_string(),
            responses: Responses {
                acknowledgements: strings(&["I see."]),
                speculations: strings(&["Let's investigate."]),
                outcomes: BTreeMap::from([(
                    "leaky_pipe".to_string(),
                    OutcomeEntry {
                        left: strings(&["it was indeed the pipes"]),
                        left_items: strings(&["wrench"]),
                        right: strings(&["it was something else entirely"]),
                        right_items: vec![],
                    },
                )]),
            },
            actions: Actions {
                objects: BTreeMap::from([(
                    "wrench".to_string(),
                    item("the wrench", "tighten", "and see if that helps"),
                )]),
                npcs: BTreeMap::from([(
                    "janitor".to_string(),
                    item("the janitor", "ask", "they know the building"),
                )]),
                locations: BTreeMap::new(),
            },
        }
    }

    #[test]
    fn left_direction_end_to_end() {
        let bank = leaky_pipe_bank();
        let generator = ConversationGenerator::new(&bank);
        let mut sampler = FragmentSampler::seeded(1);
        let c = generator
            .generate_with_direction(Direction::Left, &mut sampler)
            .unwrap();
        assert_eq!(
            c.question,
            "Have you noticed the water pressure lower than usual?? I wonder if it's because those old pipes finally giving up?. Should we call maintenance right away?"
        );
        assert_eq!(c.response1, "Ah, I see. it was indeed the pipes Let's investigate.");
        assert_eq!(c.response2, "Maybe you should tighten the wrench, and see if that helps");
        assert_eq!(
            c.suggestion,
            Some(Suggestion {
                category: ActionCategory::Objects,
                item_key: "wrench".to_string(),
            })
        );
    }

    #[test]
    fn right_direction_falls_back() {
        let bank = leaky_pipe_bank();
        let generator = ConversationGenerator::new(&bank);
        let mut sampler = FragmentSampler::seeded(1);
        let c = generator
            .generate_with_direction(Direction::Right, &mut sampler)
            .unwrap();
        assert_eq!(c.response1, "Ah, I see. it was something else entirely Let's investigate.");
        assert_eq!(c.response2, NO_SUGGESTION);
        assert!(c.valid_items.is_empty());
        assert!(c.suggestion.is_none());
    }

    #[test]
    fn filtered_generation_only_suggests_valid_items() {
        let bank = leaky_pipe_bank();
        let generator = ConversationGenerator::new(&bank);
        for seed in 0..50 {
            let mut sampler = FragmentSampler::seeded(seed);
            let c = generator.generate(&mut sampler).unwrap();
            match c.direction {
                Direction::Left => assert!(c.response2.contains("the wrench")),
                Direction::Right => assert_eq!(c.response2, NO_SUGGESTION),
            }
            if let Some(suggestion) = &c.suggestion {
                assert!(c.valid_items.contains(&suggestion.item_key));
            }
        }
    }

    #[test]
    fn unfiltered_generation_ignores_valid_items() {
        let bank = leaky_pipe_bank();
        let generator = ConversationGenerator::new(&bank);
        let mut saw_janitor = false;
        for seed in 0..50 {
            let mut sampler = FragmentSampler::seeded(seed);
            let c = generator.generate_unfiltered(&mut sampler).unwrap();
            assert_ne!(c.response2, NO_SUGGESTION);
            saw_janitor |= c.response2.contains("the janitor");
        }
        assert!(saw_janitor);
    }

    #[test]
    fn generation_is_deterministic_under_seed() {
        let bank = leaky_pipe_bank();
        let generator = ConversationGenerator::new(&bank);
        let a = generator.generate(&mut FragmentSampler::seeded(99)).unwrap();
        let b = generator.generate(&mut FragmentSampler::seeded(99)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn eligible_actions_drop_empty_categories() {
        let bank = leaky_pipe_bank();
        let valid: FxHashSet<String> = ["wrench".to_string(), "ghost".to_string()]
            .into_iter()
            .collect();
        let eligible = EligibleActions::compute(&bank, &valid);
        assert_eq!(eligible.categories(), vec![ActionCategory::Objects]);
        assert_eq!(eligible.item_keys(ActionCategory::Objects), vec!["wrench"]);
        assert!(eligible.item_keys(ActionCategory::Npcs).is_empty());
        assert!(eligible.contains(ActionCategory::Objects, "wrench"));
        assert!(!eligible.contains(ActionCategory::Npcs, "janitor"));

        let everything = EligibleActions::unfiltered(&bank);
        assert_eq!(
            everything.categories(),
            vec![ActionCategory::Objects, ActionCategory::Npcs]
        );
    }

    #[test]
    fn pinned_selection_is_honoured() {
        let bank = leaky_pipe_bank();
        let generator = ConversationGenerator::new(&bank);
        let eligible = EligibleActions::unfiltered(&bank);
        let mut sampler = FragmentSampler::seeded(5);
        let r = generator
            .compose_response2(&eligible, Some(ActionCategory::Npcs), Some("janitor"), &mut sampler)
            .unwrap();
        assert_eq!(r.text, "Maybe you should ask the janitor, they know the building");
    }

    #[test]
    fn ineligible_pin_falls_back_to_random() {
        let bank = leaky_pipe_bank();
        let generator = ConversationGenerator::new(&bank);
        let valid: FxHashSet<String> = ["wrench".to_string()].into_iter().collect();
        let eligible = EligibleActions::compute(&bank, &valid);
        let mut sampler = FragmentSampler::seeded(5);
        let r = generator
            .compose_response2(&eligible, Some(ActionCategory::Npcs), Some("janitor"), &mut sampler)
            .unwrap();
        assert_eq!(r.text, "Maybe you should tighten the wrench, and see if that helps");
    }

    #[test]
    fn unknown_object_is_reported() {
        let bank = leaky_pipe_bank();
        let generator = ConversationGenerator::new(&bank);
        let err = generator
            .compose_response1("boiler", Direction::Left, &mut FragmentSampler::seeded(1))
            .unwrap_err();
        assert!(matches!(err, GenerateError::UnknownObject(key) if key == "boiler"));
    }

    #[test]
    fn empty_pool_in_unvalidated_bank_fails_fast() {
        let mut bank = leaky_pipe_bank();
        bank.responses.acknowledgements.clear();
        let generator = ConversationGenerator::new(&bank);
        let err = generator.generate(&mut FragmentSampler::seeded(1)).unwrap_err();
        assert!(matches!(err, GenerateError::EmptyPool(e) if e.pool == "acknowledgements"));
    }
}
