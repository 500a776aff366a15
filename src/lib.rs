//! Chat Engine — scripted three-stage dialogue from a declarative content bank.
//!
//! Composes "Question → Response1 → Response2" exchanges from independently
//! authored fragment pools, keeping every stage consistent with the choices
//! made before it, and lets a front-end re-roll and navigate each stage.

pub mod core;
pub mod logging;
pub mod schema;

pub use crate::core::bank::{BankError, ValidationError, ValidationIssue};
pub use crate::core::generator::{ConversationGenerator, GenerateError, NO_SUGGESTION};
pub use crate::core::sampler::{EmptyPoolError, FragmentSampler};
pub use crate::core::session::{Command, InteractiveSession, SessionError, SessionState, Transcript};
pub use crate::schema::bank::{ActionCategory, ContentBank, Direction};
pub use crate::schema::conversation::{Conversation, Stage};
