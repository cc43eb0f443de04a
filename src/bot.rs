//! Long-polling bot loop and update dispatch.
//!
//! Updates are handled one at a time, in arrival order. Each text
//! message runs through the orchestrator; outcomes are translated into
//! replies and photos in the same order. Failures are contained at the
//! per-update boundary so one bad message never takes the loop down.

use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::adapters::telegram::{CallbackQuery, Message};
use crate::adapters::{InlineKeyboard, TelegramClient};
use crate::convert::Converter;
use crate::core::Orchestrator;
use crate::domain::{ChatId, IncomingMessage, PipelineOutcome};
use crate::nlp::Segmenter;

/// Long-poll wait per getUpdates call, seconds
const POLL_TIMEOUT_SECONDS: u64 = 30;

/// Back-off after a failed poll
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

const GENERATION_PROMPT: &str = "Напишите текст на русском языке для визуализации.";

const PROCESSING_ERROR: &str =
    "Произошла ошибка при обработке текста 😢 Пожалуйста, попробуйте снова!";

const CONVERSION_ERROR: &str =
    "Не удалось построить картинку для этого предложения 😢";

const TOO_LONG: &str = "Предложение слишком длинное 😢";

const INFO_TEXT: &str = "Этот бот предназначен для визуализации синтаксических \
зависимостей в предложениях на русском языке. Он разбивает текст на предложения, \
определяет части речи и грамматические связи между словами и рисует их в виде \
диаграммы со стрелками.\n\n\
Как пользоваться ботом:\n\
1. Напишите текст на русском языке.\n\
2. Бот разделит текст на предложения и обработает каждое из них.\n\
3. Для каждого предложения бот пришлёт картинку с синтаксическими зависимостями.\n\n\
Попробуйте отправить текст, чтобы увидеть, как это работает!";

/// The bot: a Telegram client plus the visualization pipeline
pub struct Bot<S, C> {
    client: TelegramClient,
    orchestrator: Orchestrator<S, C>,
}

impl<S: Segmenter, C: Converter> Bot<S, C> {
    /// Assemble the bot from its collaborators
    pub fn new(client: TelegramClient, orchestrator: Orchestrator<S, C>) -> Self {
        Self {
            client,
            orchestrator,
        }
    }

    /// Poll for updates forever, dispatching them one at a time
    pub async fn run(&self) -> Result<()> {
        info!("bot started, polling for updates");
        let mut offset = 0i64;

        loop {
            let updates = match self.client.get_updates(offset, POLL_TIMEOUT_SECONDS).await {
                Ok(updates) => updates,
                Err(err) => {
                    warn!(error = %err, "polling failed, backing off");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = offset.max(update.update_id + 1);

                // Per-update error boundary: log, keep serving
                if let Some(message) = update.message {
                    if let Err(err) = self.handle_message(&message).await {
                        error!(
                            chat_id = message.chat.id,
                            error = ?err,
                            "failed to handle message"
                        );
                        let _ = self
                            .client
                            .send_message(
                                ChatId(message.chat.id),
                                PROCESSING_ERROR,
                                Some(message.message_id),
                                None,
                            )
                            .await;
                    }
                } else if let Some(callback) = update.callback_query {
                    if let Err(err) = self.handle_callback(&callback).await {
                        error!(error = ?err, "failed to handle callback");
                    }
                }
            }
        }
    }

    async fn handle_message(&self, message: &Message) -> Result<()> {
        let Some(text) = message.text.as_deref() else {
            // Stickers, photos and the like are ignored
            return Ok(());
        };

        let chat_id = ChatId(message.chat.id);

        if text.starts_with("/start") {
            return self.send_welcome(chat_id, message).await;
        }

        let incoming = IncomingMessage::new(chat_id, message.message_id, text);
        let outcomes = self.orchestrator.process(&incoming).await?;

        for outcome in outcomes {
            self.deliver(&incoming, outcome).await?;
        }

        Ok(())
    }

    /// Translate one outcome into a reply or a photo send.
    ///
    /// Takes the outcome by value: a rendered image is released as soon
    /// as the send completes.
    async fn deliver(&self, message: &IncomingMessage, outcome: PipelineOutcome) -> Result<()> {
        match outcome {
            PipelineOutcome::Rendered { image, caption } => {
                self.client
                    .send_photo(message.chat_id, image.into_bytes(), &caption)
                    .await?;
            }
            PipelineOutcome::SkippedTooLong { .. } => {
                self.client
                    .send_message(message.chat_id, TOO_LONG, Some(message.message_id), None)
                    .await?;
            }
            PipelineOutcome::ConversionFailed { .. } => {
                self.client
                    .send_message(
                        message.chat_id,
                        CONVERSION_ERROR,
                        Some(message.message_id),
                        None,
                    )
                    .await?;
            }
            PipelineOutcome::ValidationRejected(rejection) => {
                self.client
                    .send_message(
                        message.chat_id,
                        &rejection.to_string(),
                        Some(message.message_id),
                        None,
                    )
                    .await?;
            }
        }
        Ok(())
    }

    async fn send_welcome(&self, chat_id: ChatId, message: &Message) -> Result<()> {
        let first_name = message
            .from
            .as_ref()
            .map(|u| u.first_name.as_str())
            .unwrap_or("друг");

        let keyboard =
            InlineKeyboard::single_row(&[("Подробнее", "details"), ("Генерация", "generate")]);

        let welcome = format!(
            "Привет, {first_name}!\nЭтот бот позволяет визуализировать синтаксические \
             зависимости слов в предложениях на русском языке. Выберите действие:"
        );

        self.client
            .send_message(chat_id, &welcome, None, Some(&keyboard))
            .await?;
        Ok(())
    }

    async fn handle_callback(&self, callback: &CallbackQuery) -> Result<()> {
        self.client.answer_callback_query(&callback.id).await?;

        let Some(chat_id) = callback.message.as_ref().map(|m| ChatId(m.chat.id)) else {
            return Ok(());
        };

        match callback.data.as_deref() {
            Some("generate") => {
                self.client
                    .send_message(chat_id, GENERATION_PROMPT, None, None)
                    .await?;
            }
            Some("details") => {
                self.client
                    .send_message(chat_id, INFO_TEXT, None, None)
                    .await?;
            }
            other => {
                warn!(data = ?other, "unknown callback data");
            }
        }

        Ok(())
    }
}
