use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::{ParseMode, Recipient};
use tracing::{info, instrument};

use crate::errors::NotifyError;
use crate::sink::NotificationSink;

/// Sends HTML-formatted messages to one chat through the Bot API.
pub struct TelegramSink {
    bot: Bot,
    recipient: Recipient,
}

impl TelegramSink {
    pub fn new(token: impl Into<String>, chat_id: &str) -> Self {
        Self {
            bot: Bot::new(token),
            recipient: parse_recipient(chat_id),
        }
    }

    pub fn recipient(&self) -> &Recipient {
        &self.recipient
    }
}

/// Numeric ids (including negative group ids) address a chat directly;
/// anything else is taken as a public `@channel` username.
pub fn parse_recipient(chat_id: &str) -> Recipient {
    let chat_id = chat_id.trim();
    match chat_id.parse::<i64>() {
        Ok(id) => Recipient::Id(ChatId(id)),
        Err(_) if chat_id.starts_with('@') => Recipient::ChannelUsername(chat_id.to_string()),
        Err(_) => Recipient::ChannelUsername(format!("@{chat_id}")),
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    fn name(&self) -> &'static str {
        "telegram"
    }

    #[instrument(skip(self, text), target = "notifier", fields(chars = text.chars().count()))]
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let sent = self
            .bot
            .send_message(self.recipient.clone(), text)
            .parse_mode(ParseMode::Html)
            .await?;

        info!(message_id = sent.id.0, "alert delivered");
        Ok(())
    }
}
