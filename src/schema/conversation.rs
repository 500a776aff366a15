//! Conversation stages and generated output.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::bank::{ActionCategory, Direction};

/// Stage of a three-line conversation. Ordering follows the conversation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Stage {
    #[default]
    Question,
    Response1,
    Response2,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Self::Question, Self::Response1, Self::Response2];

    /// The stage after this one, wrapping back to `Question`.
    pub fn next(&self) -> Stage {
        match self {
            Self::Question => Self::Response1,
            Self::Response1 => Self::Response2,
            Self::Response2 => Self::Question,
        }
    }

    /// Short prefix used when printing a transcript line.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Question => "Q",
            Self::Response1 => "R1",
            Self::Response2 => "R2",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Question => "question",
            Self::Response1 => "response 1",
            Self::Response2 => "response 2",
        };
        f.write_str(name)
    }
}

/// The item the second response ended up suggesting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub category: ActionCategory,
    pub item_key: String,
}

/// A fully generated conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub question: String,
    pub object_key: String,
    pub direction: Direction,
    pub response1: String,
    /// Item keys the first response made eligible for the second.
    pub valid_items: FxHashSet<String>,
    pub response2: String,
    /// `None` when no item was eligible and the fallback line was used.
    pub suggestion: Option<Suggestion>,
}

impl fmt::Display for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", Stage::Question.label(), self.question)?;
        writeln!(f, "{}: {}", Stage::Response1.label(), self.response1)?;
        write!(f, "{}: {}", Stage::Response2.label(), self.response2)
    }
}
