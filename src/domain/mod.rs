//! Domain types for the visualization pipeline.
//!
//! This module contains the core data structures:
//! - IncomingMessage: One transport event from the chat
//! - Sentence/Word: A parsed sentence with its dependency structure
//! - PipelineOutcome: Per-sentence (or per-message) result classification

pub mod message;
pub mod outcome;
pub mod sentence;

// Re-export commonly used types
pub use message::{ChatId, IncomingMessage};
pub use outcome::{PipelineOutcome, Rejection};
pub use sentence::{Sentence, Word};
