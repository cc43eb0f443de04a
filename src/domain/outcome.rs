//! Pipeline outcome classification.
//!
//! Expected per-sentence conditions (too-long, conversion failure) are
//! tagged variants rather than errors; only truly unexpected failures
//! travel the propagating-error path.

use thiserror::Error;

use crate::convert::RasterImage;

/// Why a whole message was rejected before segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// The text contains Latin-alphabet characters
    #[error("К сожалению, я обрабатываю текст только на русском языке 😢")]
    ForeignScript,

    /// Trimmed text is a single character or empty
    #[error("Предложение слишком короткое 😢")]
    TooShort,
}

impl Rejection {
    /// Stable reason code for logs and tests
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::ForeignScript => "foreign-script",
            Rejection::TooShort => "too-short",
        }
    }
}

/// Result of processing one sentence (or of rejecting a whole message).
///
/// Outcomes are aggregated in source order; the transport layer renders
/// them as replies and photos in that same order.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The sentence was rendered and converted successfully
    Rendered {
        image: RasterImage,
        caption: String,
    },

    /// The sentence exceeded the word ceiling; renderer and converter
    /// were never invoked
    SkippedTooLong { sentence: String },

    /// The external converter returned a non-zero status for this sentence
    ConversionFailed { sentence: String, reason: String },

    /// The whole message failed validation; terminal, no segmentation ran
    ValidationRejected(Rejection),
}

impl PipelineOutcome {
    /// Short stage label for logging
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineOutcome::Rendered { .. } => "rendered",
            PipelineOutcome::SkippedTooLong { .. } => "skipped_too_long",
            PipelineOutcome::ConversionFailed { .. } => "conversion_failed",
            PipelineOutcome::ValidationRejected(_) => "validation_rejected",
        }
    }
}
