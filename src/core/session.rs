//! Interactive, stage-by-stage conversation building.
//!
//! An `InteractiveSession` owns its `SessionState` and sampler. The host
//! feeds it one `Command` at a time and renders the returned `Transcript`;
//! input polling and debounce live entirely on the host side.

use rustc_hash::FxHashSet;
use std::fmt;
use thiserror::Error;

use crate::core::generator::{ConversationGenerator, EligibleActions, GenerateError};
use crate::core::sampler::FragmentSampler;
use crate::schema::bank::{ActionCategory, ContentBank, Direction};
use crate::schema::conversation::{Conversation, Stage, Suggestion};

#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not legal in the current state. State is unchanged.
    #[error("cannot {operation} during the {stage} stage: requires {requirement}")]
    InvalidOperation {
        operation: &'static str,
        stage: Stage,
        requirement: &'static str,
    },
    #[error("no question has been generated")]
    NoQuestion,
    #[error(transparent)]
    Generate(#[from] GenerateError),
}

/// A discrete input event from the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Regenerate,
    Advance,
    SetDirection(Direction),
    CycleActionType,
    CycleItem,
}

/// Selections driving the stage currently on screen.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SessionState {
    pub stage: Stage,
    pub object_key: Option<String>,
    pub direction: Direction,
    pub valid_items: Option<FxHashSet<String>>,
    pub action_type: Option<ActionCategory>,
    pub item_key: Option<String>,
}

impl SessionState {
    fn clear_pins(&mut self) {
        self.action_type = None;
        self.item_key = None;
    }
}

/// One rendered line of a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub stage: Stage,
    pub text: String,
}

/// What a front-end shows after each command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transcript {
    /// Visible stages, up to and including the current one.
    pub lines: Vec<TranscriptLine>,
    pub stage: Stage,
    pub direction: Direction,
    pub action_type: Option<ActionCategory>,
    pub item_key: Option<String>,
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}: {}", line.stage.label(), line.text)?;
        }
        match self.stage {
            Stage::Question => {}
            Stage::Response1 => writeln!(f, "Direction: {}", self.direction)?,
            Stage::Response2 => {
                if let Some(category) = self.action_type {
                    writeln!(f, "Action Type: {}", category)?;
                }
                if let Some(item) = &self.item_key {
                    writeln!(f, "Item: {}", item)?;
                }
            }
        }
        Ok(())
    }
}

/// Builder for an [`InteractiveSession`].
pub struct SessionBuilder<'a> {
    bank: &'a ContentBank,
    seed: Option<u64>,
}

impl<'a> SessionBuilder<'a> {
    /// Seed the sampler for reproducible sessions. Unseeded sessions use entropy.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<InteractiveSession<'a>, SessionError> {
        let sampler = match self.seed {
            Some(seed) => FragmentSampler::seeded(seed),
            None => FragmentSampler::from_entropy(),
        };
        InteractiveSession::with_sampler(self.bank, sampler)
    }
}

/// Stateful controller for building a conversation one stage at a time.
#[derive(Debug, Clone)]
pub struct InteractiveSession<'a> {
    generator: ConversationGenerator<'a>,
    sampler: FragmentSampler,
    state: SessionState,
    question: Option<String>,
    response1: Option<String>,
    response2: Option<String>,
    suggestion: Option<Suggestion>,
}

impl<'a> InteractiveSession<'a> {
    pub fn builder(bank: &'a ContentBank) -> SessionBuilder<'a> {
        SessionBuilder { bank, seed: None }
    }

    /// Start a session at the question stage with a freshly generated question.
    pub fn with_sampler(
        bank: &'a ContentBank,
        sampler: FragmentSampler,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            generator: ConversationGenerator::new(bank),
            sampler,
            state: SessionState::default(),
            question: None,
            response1: None,
            response2: None,
            suggestion: None,
        };
        session.render_question()?;
        Ok(session)
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    /// Replace the sampler with a seeded one.
    pub fn reseed(&mut self, seed: u64) {
        self.sampler = FragmentSampler::seeded(seed);
    }

    /// Run one command and return what should now be on screen.
    pub fn apply(&mut self, command: Command) -> Result<Transcript, SessionError> {
        match command {
            Command::Regenerate => self.regenerate()?,
            Command::Advance => self.advance()?,
            Command::SetDirection(direction) => self.set_direction(direction)?,
            Command::CycleActionType => self.cycle_action_type()?,
            Command::CycleItem => self.cycle_item()?,
        }
        Ok(self.transcript())
    }

    /// Move to the next stage. Advancing past the second response starts a
    /// new conversation with direction and pins reset.
    pub fn advance(&mut self) -> Result<(), SessionError> {
        match self.state.stage {
            Stage::Question => {
                self.render_response1()?;
                self.state.stage = Stage::Response1;
            }
            Stage::Response1 => {
                self.render_response2()?;
                self.state.stage = Stage::Response2;
            }
            Stage::Response2 => {
                self.state = SessionState::default();
                self.render_question()?;
            }
        }
        Ok(())
    }

    /// Re-sample the current stage in place. Everything downstream of it is
    /// invalidated; at the second response any pinned selection is dropped.
    pub fn regenerate(&mut self) -> Result<(), SessionError> {
        match self.state.stage {
            Stage::Question => self.render_question(),
            Stage::Response1 => self.render_response1(),
            Stage::Response2 => {
                self.state.clear_pins();
                self.render_response2()
            }
        }
    }

    /// Re-render the first response for the same object in a new direction.
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), SessionError> {
        self.require(Stage::Response1, "set the outcome direction", "the response 1 stage")?;
        let previous = self.state.direction;
        self.state.direction = direction;
        if let Err(e) = self.render_response1() {
            self.state.direction = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Pin the next eligible action category and re-render the second
    /// response. A no-op when nothing is eligible.
    pub fn cycle_action_type(&mut self) -> Result<(), SessionError> {
        self.require(Stage::Response2, "cycle the action type", "the response 2 stage")?;
        let categories = self.eligible().categories();
        let Some(next) = next_in_cycle(&categories, self.state.action_type.as_ref()) else {
            return Ok(());
        };
        self.state.action_type = Some(next);
        self.state.item_key = None;
        self.render_response2()
    }

    /// Pin the next eligible item within the pinned category and re-render
    /// the second response. A no-op when the category has no eligible items.
    pub fn cycle_item(&mut self) -> Result<(), SessionError> {
        self.require(Stage::Response2, "cycle the item", "the response 2 stage")?;
        let Some(category) = self.state.action_type else {
            return Err(self.invalid("cycle the item", "a pinned action type"));
        };
        let items = self.eligible().item_keys(category);
        let current = self.state.item_key.as_deref();
        let Some(next) = next_in_cycle(&items, current.as_ref()) else {
            return Ok(());
        };
        self.state.item_key = Some(next.to_string());
        self.render_response2()
    }

    /// Text of a stage, if that stage has been reached.
    pub fn text(&self, stage: Stage) -> Option<&str> {
        if stage > self.state.stage {
            return None;
        }
        match stage {
            Stage::Question => self.question.as_deref(),
            Stage::Response1 => self.response1.as_deref(),
            Stage::Response2 => self.response2.as_deref(),
        }
    }

    pub fn transcript(&self) -> Transcript {
        let lines = Stage::ALL
            .into_iter()
            .filter_map(|stage| {
                self.text(stage).map(|text| TranscriptLine {
                    stage,
                    text: text.to_string(),
                })
            })
            .collect();
        Transcript {
            lines,
            stage: self.state.stage,
            direction: self.state.direction,
            action_type: self.state.action_type,
            item_key: self.state.item_key.clone(),
        }
    }

    /// The finished conversation, once the second response is on screen.
    pub fn completed_conversation(&self) -> Option<Conversation> {
        if self.state.stage != Stage::Response2 {
            return None;
        }
        Some(Conversation {
            question: self.question.clone()?,
            object_key: self.state.object_key.clone()?,
            direction: self.state.direction,
            response1: self.response1.clone()?,
            valid_items: self.state.valid_items.clone()?,
            response2: self.response2.clone()?,
            suggestion: self.suggestion.clone(),
        })
    }

    fn require(
        &self,
        stage: Stage,
        operation: &'static str,
        requirement: &'static str,
    ) -> Result<(), SessionError> {
        if self.state.stage == stage {
            Ok(())
        } else {
            Err(self.invalid(operation, requirement))
        }
    }

    fn invalid(&self, operation: &'static str, requirement: &'static str) -> SessionError {
        SessionError::InvalidOperation {
            operation,
            stage: self.state.stage,
            requirement,
        }
    }

    fn eligible(&self) -> EligibleActions<'a> {
        match &self.state.valid_items {
            Some(valid) => EligibleActions::compute(self.generator.bank(), valid),
            None => EligibleActions::default(),
        }
    }

    fn render_question(&mut self) -> Result<(), SessionError> {
        let (text, object_key) = self.generator.compose_question(&mut self.sampler)?;
        self.question = Some(text);
        self.state.object_key = Some(object_key);
        self.response1 = None;
        self.state.valid_items = None;
        self.invalidate_response2();
        Ok(())
    }

    fn render_response1(&mut self) -> Result<(), SessionError> {
        let object_key = self.state.object_key.as_deref().ok_or(SessionError::NoQuestion)?;
        let first =
            self.generator
                .compose_response1(object_key, self.state.direction, &mut self.sampler)?;
        self.response1 = Some(first.text);
        self.state.valid_items = Some(first.valid_items);
        self.invalidate_response2();
        Ok(())
    }

    fn render_response2(&mut self) -> Result<(), SessionError> {
        let eligible = self.eligible();
        let second = self.generator.compose_response2(
            &eligible,
            self.state.action_type,
            self.state.item_key.as_deref(),
            &mut self.sampler,
        )?;
        self.response2 = Some(second.text);
        self.suggestion = second.suggestion;
        Ok(())
    }

    fn invalidate_response2(&mut self) {
        self.state.clear_pins();
        self.response2 = None;
        self.suggestion = None;
    }
}

/// The element after `current`, wrapping; the first one when `current` is
/// unset or no longer present. `None` for an empty list.
fn next_in_cycle<T: Copy + PartialEq>(items: &[T], current: Option<&T>) -> Option<T> {
    let first = *items.first()?;
    let next = current
        .and_then(|c| items.iter().position(|item| item == c))
        .map(|i| items[(i + 1) % items.len()])
        .unwrap_or(first);
    Some(next)
}
