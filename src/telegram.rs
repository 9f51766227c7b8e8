//! Telegram client using teloxide.

use teloxide::prelude::*;
use teloxide::types::{KeyboardButton, KeyboardMarkup, KeyboardRemove};
use teloxide::utils::command::BotCommands;
use tracing::warn;

use crate::commands::Command;
use crate::dialogue::reply::MENU_PLACEHOLDER;
use crate::dialogue::{Inbound, Menu, Reply, ReplySink};

/// Telegram API client.
pub struct TelegramClient {
    bot: Bot,
}

impl TelegramClient {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub async fn send_message(&self, chat_id: i64, reply: &Reply) -> Result<i64, String> {
        let request = self.bot.send_message(ChatId(chat_id), &reply.text);
        let request = match &reply.menu {
            Menu::Unchanged => request,
            Menu::Show(rows) => request.reply_markup(keyboard(rows)),
            Menu::Remove => request.reply_markup(KeyboardRemove::new()),
        };

        request.await.map(|msg| msg.id.0 as i64).map_err(|e| {
            let msg = format!("Failed to send: {e}");
            warn!("{}", msg);
            msg
        })
    }
}

impl ReplySink for TelegramClient {
    async fn send_reply(&self, chat_id: i64, reply: &Reply) -> Result<(), String> {
        self.send_message(chat_id, reply).await.map(|_| ())
    }
}

/// One-time reply keyboard with the menu placeholder.
fn keyboard(rows: &[Vec<String>]) -> KeyboardMarkup {
    KeyboardMarkup::new(
        rows.iter()
            .map(|row| row.iter().map(|label| KeyboardButton::new(label.as_str())).collect::<Vec<_>>()),
    )
    .one_time_keyboard()
    .resize_keyboard()
    .input_field_placeholder(MENU_PLACEHOLDER)
}

/// Turn a Telegram message into a dialogue event. Non-text messages yield `None`.
pub fn inbound_from_message(msg: &Message, bot_username: &str) -> Option<Inbound> {
    let text = msg.text()?;
    let event = match Command::parse(text, bot_username) {
        Ok(Command::Start) => Inbound::Start { display_name: display_name(msg) },
        Ok(Command::ShowData) => Inbound::ShowData,
        Ok(Command::Help) => Inbound::Help,
        Err(_) => Inbound::Text(text.to_string()),
    };
    Some(event)
}

fn display_name(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map(|u| u.first_name.clone())
        .unwrap_or_else(|| "there".to_string())
}
