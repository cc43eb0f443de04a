//! Command-line interface for depviz.
//!
//! `serve` runs the bot; `render` is a one-shot local run of the same
//! pipeline for debugging; `check` verifies the external collaborators;
//! `config` prints the resolved configuration.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::TelegramClient;
use crate::bot::Bot;
use crate::config::Config;
use crate::convert::{Converter, RsvgConverter};
use crate::core::Orchestrator;
use crate::domain::{ChatId, IncomingMessage, PipelineOutcome};
use crate::nlp::{Segmenter, UdpipeSegmenter};

/// depviz - dependency visualization bot for Russian text
#[derive(Parser, Debug)]
#[command(name = "depviz")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the Telegram bot
    Serve,

    /// Run the pipeline once over local text and write PNGs
    Render {
        /// Text to visualize (reads from stdin if not provided)
        text: Option<String>,

        /// Directory to write sentence PNGs into
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Check that the converter and the linguistic engine are usable
    Check,

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the selected command
    pub async fn execute(self, config: Config) -> Result<()> {
        match self.command {
            Commands::Serve => serve(config).await,
            Commands::Render { text, out } => render(config, text, out).await,
            Commands::Check => check(config).await,
            Commands::Config => {
                println!("{config:#?}");
                Ok(())
            }
        }
    }
}

fn build_converter(config: &Config) -> RsvgConverter {
    RsvgConverter::with_binary(&config.converter_binary).with_timeout(config.converter_timeout)
}

fn build_segmenter(config: &Config) -> Result<UdpipeSegmenter> {
    let model = config.require_model()?;
    Ok(UdpipeSegmenter::with_binary(&config.engine_binary, model))
}

async fn serve(config: Config) -> Result<()> {
    let token = config.require_token()?;
    let client = TelegramClient::new(token);
    let orchestrator = Orchestrator::new(build_segmenter(&config)?, build_converter(&config));

    Bot::new(client, orchestrator).run().await
}

async fn render(config: Config, text: Option<String>, out: PathBuf) -> Result<()> {
    let text = match text {
        Some(text) => text,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read text from stdin")?;
            buffer
        }
    };

    let orchestrator = Orchestrator::new(build_segmenter(&config)?, build_converter(&config));
    let message = IncomingMessage::new(ChatId(0), 0, text.trim());
    let outcomes = orchestrator.process(&message).await?;

    std::fs::create_dir_all(&out)
        .with_context(|| format!("failed to create output directory: {}", out.display()))?;

    for (index, outcome) in outcomes.into_iter().enumerate() {
        match outcome {
            PipelineOutcome::Rendered { image, caption } => {
                let path = out.join(format!("sentence_{index:02}.png"));
                std::fs::write(&path, image.into_bytes())
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("{} <- {}", path.display(), caption);
            }
            PipelineOutcome::SkippedTooLong { sentence } => {
                println!("skipped (too long): {sentence}");
            }
            PipelineOutcome::ConversionFailed { sentence, reason } => {
                println!("conversion failed for '{sentence}': {reason}");
            }
            PipelineOutcome::ValidationRejected(rejection) => {
                println!("rejected ({}): {rejection}", rejection.code());
            }
        }
    }

    Ok(())
}

async fn check(config: Config) -> Result<()> {
    build_converter(&config)
        .health_check()
        .await
        .context("raster converter check failed")?;
    println!("converter: ok ({})", config.converter_binary);

    build_segmenter(&config)?
        .health_check()
        .await
        .context("linguistic engine check failed")?;
    println!("engine: ok ({})", config.engine_binary);

    if config.token.is_some() {
        println!("telegram token: present");
    } else {
        println!("telegram token: missing (required for serve)");
    }

    Ok(())
}
