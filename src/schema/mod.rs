//! Data types shared by the generation engines.

pub mod bank;
pub mod conversation;
