//! Telegram channel.

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, ParseMode},
};

use crate::{AlertMessage, ChannelKind, Notifier, NotifyError, Recipient};

#[derive(Clone, Debug)]
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    pub fn new(token: &str) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Telegram
    }

    async fn notify(
        &self,
        recipient: &Recipient,
        message: &AlertMessage,
    ) -> Result<(), NotifyError> {
        let Recipient::Telegram(chat_id) = recipient else {
            return Err(NotifyError::WrongRecipient(recipient.clone()));
        };
        self.bot
            .send_message(ChatId(*chat_id), message.telegram_html())
            .parse_mode(ParseMode::Html)
            .await?;
        Ok(())
    }
}
