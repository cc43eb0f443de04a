//! Adapters for external systems.
//!
//! Currently only the Telegram transport; the linguistic engine and the
//! raster converter live behind their own capability traits in `nlp`
//! and `convert`.

pub mod telegram;

pub use telegram::{CallbackQuery, InlineKeyboard, Message, TelegramClient, Update};
