//! Sentence segmentation and dependency parsing.
//!
//! The linguistic engine is an opaque collaborator behind the
//! [`Segmenter`] trait: any backend that splits text into sentences and
//! yields per-word head/deprel/upos attachments can be substituted
//! without touching the orchestrator.

pub mod udpipe;

use anyhow::Result;
use async_trait::async_trait;

use crate::domain::Sentence;

pub use udpipe::UdpipeSegmenter;

/// Capability interface for the linguistic engine.
///
/// `segment` returns sentences in document order; calling it twice with
/// the same text yields an equivalent sequence. Engine failure is fatal
/// for the whole message (a configuration or model problem, not a
/// per-sentence condition) and propagates as an error.
#[async_trait]
pub trait Segmenter: Send + Sync {
    /// Split text into parsed sentences, in source order
    async fn segment(&self, text: &str) -> Result<Vec<Sentence>>;

    /// Verify the engine is available and its model loads
    async fn health_check(&self) -> Result<()>;
}
