//! depviz - syntactic dependency visualization bot
//!
//! A Telegram bot that draws dependency diagrams for Russian sentences.
//! Each message runs through a small pipeline: validation, sentence
//! segmentation (UDPipe subprocess), SVG rendering of the dependency
//! arcs, and PNG conversion (`rsvg-convert` subprocess). Failures are
//! isolated per sentence, so one bad sentence never loses the rest of
//! the message.
//!
//! # Modules
//!
//! - `adapters`: Telegram transport
//! - `core`: validation and orchestration
//! - `nlp`: the segmenter capability and its UDPipe backend
//! - `render`: pure SVG rendering
//! - `convert`: the converter capability and its rsvg-convert backend
//! - `domain`: data structures (messages, sentences, outcomes)
//! - `bot`: long-polling update loop
//! - `cli`: command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Run the bot
//! DEPVIZ_TOKEN=... DEPVIZ_UDPIPE_MODEL=russian.udpipe depviz serve
//!
//! # Render locally for debugging
//! echo "Мама мыла раму." | depviz render --out /tmp/viz
//!
//! # Verify external tools
//! depviz check
//! ```

pub mod adapters;
pub mod bot;
pub mod cli;
pub mod config;
pub mod convert;
pub mod core;
pub mod domain;
pub mod nlp;
pub mod render;

// Re-export main types at crate root for convenience
pub use bot::Bot;
pub use config::Config;
pub use convert::{ConvertError, Converter, RasterImage, RsvgConverter};
pub use core::{Orchestrator, MAX_SENTENCE_WORDS};
pub use domain::{ChatId, IncomingMessage, PipelineOutcome, Rejection, Sentence, Word};
pub use nlp::{Segmenter, UdpipeSegmenter};
pub use render::{render_dependencies, VectorDocument};
