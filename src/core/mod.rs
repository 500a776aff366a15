//! Loading, sampling, generation, and interactive navigation.

pub mod bank;
pub mod compiler;
pub mod generator;
pub mod lint;
pub mod sampler;
pub mod session;
pub mod template;
