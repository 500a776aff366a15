//! Content bank data model — fragment pools, outcomes, and actionable items.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The full declarative content bank a conversation is assembled from.
///
/// Loaded once and treated as immutable. Use the constructors in
/// [`crate::core::bank`] to obtain a validated instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentBank {
    pub objects: BTreeMap<String, ObjectEntry>,
    pub question_structure: String,
    pub responses: Responses,
    pub actions: Actions,
}

/// Candidate question fragments for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub observations: Vec<String>,
    pub causes: Vec<String>,
    pub mystical_questions: Vec<String>,
}

/// Phrases used by the first response stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Responses {
    pub acknowledgements: Vec<String>,
    pub speculations: Vec<String>,
    /// Outcome sets keyed by object key.
    pub outcomes: BTreeMap<String, OutcomeEntry>,
}

/// Left/right outcome phrases for one object, plus the item keys each
/// direction makes eligible for the second response stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeEntry {
    pub left: Vec<String>,
    #[serde(default)]
    pub left_items: Vec<String>,
    pub right: Vec<String>,
    #[serde(default)]
    pub right_items: Vec<String>,
}

impl OutcomeEntry {
    /// Outcome phrases for a direction.
    pub fn outcomes(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Left => &self.left,
            Direction::Right => &self.right,
        }
    }

    /// Item keys a direction makes eligible.
    pub fn items(&self, direction: Direction) -> &[String] {
        match direction {
            Direction::Left => &self.left_items,
            Direction::Right => &self.right_items,
        }
    }
}

/// Actionable items grouped by category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actions {
    pub objects: BTreeMap<String, ActionItem>,
    pub npcs: BTreeMap<String, ActionItem>,
    pub locations: BTreeMap<String, ActionItem>,
}

impl Actions {
    /// Items of a single category.
    pub fn category(&self, category: ActionCategory) -> &BTreeMap<String, ActionItem> {
        match category {
            ActionCategory::Objects => &self.objects,
            ActionCategory::Npcs => &self.npcs,
            ActionCategory::Locations => &self.locations,
        }
    }

    /// All categories in their fixed enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (ActionCategory, &BTreeMap<String, ActionItem>)> {
        ActionCategory::ALL
            .into_iter()
            .map(move |category| (category, self.category(category)))
    }

    /// Whether any category defines an item with this key.
    pub fn contains_item(&self, key: &str) -> bool {
        self.iter().any(|(_, items)| items.contains_key(key))
    }
}

/// Something the player can be told to act on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    /// Human-facing label, e.g. "the wrench".
    pub name: String,
    pub actions: Vec<String>,
    pub valid_results: Vec<String>,
}

/// Category of an actionable item. Declaration order is the cycling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionCategory {
    Objects,
    Npcs,
    Locations,
}

impl ActionCategory {
    pub const ALL: [ActionCategory; 3] = [Self::Objects, Self::Npcs, Self::Locations];

    /// The key used for this category in a content bank document.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Objects => "objects",
            Self::Npcs => "npcs",
            Self::Locations => "locations",
        }
    }
}

impl fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Outcome direction chosen for the first response.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Self::Left, Self::Right];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Key of the matching item list in an outcome entry: `left_items` / `right_items`.
    pub fn items_key(&self) -> &'static str {
        match self {
            Self::Left => "left_items",
            Self::Right => "right_items",
        }
    }

    pub fn flipped(&self) -> Direction {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "left" | "l" => Ok(Self::Left),
            "right" | "r" => Ok(Self::Right),
            other => Err(format!("unknown direction '{}': expected left or right", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> ActionItem {
        ActionItem {
            name: name.to_string(),
            actions: vec!["check".to_string()],
            valid_results: vec!["just in case".to_string()],
        }
    }

    #[test]
    fn outcome_entry_selects_by_direction() {
        let entry = OutcomeEntry {
            left: vec!["it was the pipes".to_string()],
            left_items: vec!["wrench".to_string()],
            right: vec!["it was the boiler".to_string()],
            right_items: vec![],
        };
        assert_eq!(entry.outcomes(Direction::Left), ["it was the pipes"]);
        assert_eq!(entry.items(Direction::Left), ["wrench"]);
        assert_eq!(entry.outcomes(Direction::Right), ["it was the boiler"]);
        assert!(entry.items(Direction::Right).is_empty());
    }

    #[test]
    fn actions_iterate_in_fixed_order() {
        let actions = Actions {
            objects: BTreeMap::new(),
            npcs: BTreeMap::from([("janitor".to_string(), item("the janitor"))]),
            locations: BTreeMap::from([("basement".to_string(), item("the basement"))]),
        };
        let order: Vec<ActionCategory> = actions.iter().map(|(c, _)| c).collect();
        assert_eq!(order, ActionCategory::ALL);
        assert!(actions.contains_item("janitor"));
        assert!(!actions.contains_item("wrench"));
    }

    #[test]
    fn direction_parsing_and_keys() {
        assert_eq!("Left".parse::<Direction>().unwrap(), Direction::Left);
        assert_eq!("r".parse::<Direction>().unwrap(), Direction::Right);
        assert!("up".parse::<Direction>().is_err());
        assert_eq!(Direction::Right.items_key(), "right_items");
        assert_eq!(Direction::Left.flipped(), Direction::Right);
        assert_eq!(Direction::default(), Direction::Left);
    }

    #[test]
    fn outcome_items_default_to_empty() {
        let entry: OutcomeEntry =
            serde_json::from_str(r#"{"left": ["a"], "right": ["b"]}"#).unwrap();
        assert!(entry.left_items.is_empty());
        assert!(entry.right_items.is_empty());
    }

    #[test]
    fn category_serializes_lowercase() {
        let json = serde_json::to_string(&ActionCategory::Npcs).unwrap();
        assert_eq!(json, "\"npcs\"");
    }
}
