//! Telegram Bot API client.
//!
//! Thin typed wrapper over the HTTP API: long polling via `getUpdates`,
//! text replies, multipart photo uploads, callback-button plumbing.

use anyhow::{Context, Result};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::domain::ChatId;

/// Telegram Bot API client
pub struct TelegramClient {
    /// Bot token
    bot_token: String,
    /// HTTP client
    client: reqwest::Client,
}

/// Response envelope from the Telegram API
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

/// Message result from sendMessage/sendPhoto
#[derive(Debug, Deserialize)]
struct MessageResult {
    message_id: i64,
}

/// One update from getUpdates
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

/// An incoming chat message
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    #[serde(default)]
    pub first_name: String,
}

/// A pressed inline button
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message: Option<Message>,
}

/// Inline keyboard attached to a message
#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboard {
    inline_keyboard: Vec<Vec<InlineButton>>,
}

#[derive(Debug, Clone, Serialize)]
struct InlineButton {
    text: String,
    callback_data: String,
}

impl InlineKeyboard {
    /// Build a single-row keyboard from (label, callback_data) pairs
    pub fn single_row(buttons: &[(&str, &str)]) -> Self {
        Self {
            inline_keyboard: vec![buttons
                .iter()
                .map(|(text, data)| InlineButton {
                    text: text.to_string(),
                    callback_data: data.to_string(),
                })
                .collect()],
        }
    }
}

impl TelegramClient {
    /// Create a new client from a bot token
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Build API URL
    fn api_url(&self, method: &str) -> String {
        format!("https://api.telegram.org/bot{}/{}", self.bot_token, method)
    }

    fn check<T>(result: TelegramResponse<T>) -> Result<T> {
        if !result.ok {
            anyhow::bail!(
                "Telegram API error: {}",
                result.description.unwrap_or_default()
            );
        }
        result
            .result
            .context("Telegram API returned ok without a result")
    }

    /// Long-poll for updates past `offset`, waiting up to `timeout_seconds`
    pub async fn get_updates(&self, offset: i64, timeout_seconds: u64) -> Result<Vec<Update>> {
        let url = self.api_url("getUpdates");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({
                "offset": offset,
                "timeout": timeout_seconds,
                "allowed_updates": ["message", "callback_query"],
            }))
            .send()
            .await
            .context("failed to poll Telegram updates")?;

        let result: TelegramResponse<Vec<Update>> = response
            .json()
            .await
            .context("failed to parse Telegram updates")?;

        Self::check(result)
    }

    /// Send a text message, optionally as a reply, optionally with a keyboard
    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_to: Option<i64>,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<i64> {
        let url = self.api_url("sendMessage");

        let mut body = serde_json::json!({
            "chat_id": chat_id.0,
            "text": text,
        });
        if let Some(message_id) = reply_to {
            body["reply_to_message_id"] = serde_json::json!(message_id);
        }
        if let Some(keyboard) = keyboard {
            body["reply_markup"] = serde_json::to_value(keyboard)?;
        }

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("failed to send Telegram message")?;

        let result: TelegramResponse<MessageResult> = response
            .json()
            .await
            .context("failed to parse Telegram response")?;

        Ok(Self::check(result)?.message_id)
    }

    /// Upload a PNG from memory with a caption
    pub async fn send_photo(&self, chat_id: ChatId, png: Vec<u8>, caption: &str) -> Result<i64> {
        let url = self.api_url("sendPhoto");

        let photo_part = Part::bytes(png)
            .file_name("dependencies.png")
            .mime_str("image/png")?;

        let form = Form::new()
            .text("chat_id", chat_id.0.to_string())
            .text("caption", caption.to_string())
            .part("photo", photo_part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("failed to send Telegram photo")?;

        let result: TelegramResponse<MessageResult> = response
            .json()
            .await
            .context("failed to parse Telegram response")?;

        Ok(Self::check(result)?.message_id)
    }

    /// Acknowledge an inline button press
    pub async fn answer_callback_query(&self, callback_id: &str) -> Result<()> {
        let url = self.api_url("answerCallbackQuery");

        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "callback_query_id": callback_id }))
            .send()
            .await
            .context("failed to answer callback query")?;

        let result: TelegramResponse<bool> = response
            .json()
            .await
            .context("failed to parse Telegram response")?;

        Self::check(result)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        let client = TelegramClient::new("TOKEN");
        assert_eq!(
            client.api_url("sendMessage"),
            "https://api.telegram.org/botTOKEN/sendMessage"
        );
    }

    #[test]
    fn test_keyboard_serialization() {
        let keyboard = InlineKeyboard::single_row(&[("Подробнее", "details"), ("Генерация", "generate")]);
        let json = serde_json::to_value(&keyboard).unwrap();
        assert_eq!(json["inline_keyboard"][0][0]["text"], "Подробнее");
        assert_eq!(json["inline_keyboard"][0][1]["callback_data"], "generate");
    }

    #[test]
    fn test_update_parsing() {
        let json = r#"{
            "update_id": 10,
            "message": {
                "message_id": 5,
                "chat": { "id": 42 },
                "from": { "first_name": "Анна" },
                "text": "Привет"
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        assert_eq!(update.update_id, 10);
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("Привет"));
        assert!(update.callback_query.is_none());
    }
}
