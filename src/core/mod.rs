//! Core pipeline logic.
//!
//! This module contains:
//! - Validate: script check and the sentence length gate
//! - Orchestrator: the per-message state machine

pub mod orchestrator;
pub mod validate;

// Re-export commonly used types
pub use orchestrator::Orchestrator;
pub use validate::{validate, within_word_limit, MAX_SENTENCE_WORDS};
