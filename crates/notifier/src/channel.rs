use std::fmt;

use async_trait::async_trait;
use engine::NotificationPreferences;

use crate::AlertMessage;

/// Delivery channels an alert can go out on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Email,
    Telegram,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email => f.write_str("email"),
            Self::Telegram => f.write_str("telegram"),
        }
    }
}

/// Address on one channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recipient {
    Email(String),
    Telegram(i64),
}

impl Recipient {
    pub fn kind(&self) -> ChannelKind {
        match self {
            Self::Email(_) => ChannelKind::Email,
            Self::Telegram(_) => ChannelKind::Telegram,
        }
    }

    /// Every channel the user switched on and gave an address for.
    pub fn enabled_for(preferences: &NotificationPreferences) -> Vec<Recipient> {
        let mut recipients = Vec::with_capacity(2);
        if let Some(chat_id) = preferences.telegram_target() {
            recipients.push(Recipient::Telegram(chat_id));
        }
        if let Some(email) = preferences.email_target() {
            recipients.push(Recipient::Email(email.to_string()));
        }
        recipients
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
    #[error("{status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("recipient {0:?} does not belong to this channel")]
    WrongRecipient(Recipient),
    #[error("delivery timed out")]
    Timeout,
}

/// One way of delivering an alert.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn kind(&self) -> ChannelKind;

    async fn notify(&self, recipient: &Recipient, message: &AlertMessage)
    -> Result<(), NotifyError>;
}
