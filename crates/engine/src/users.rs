//! Users table.
//!
//! Besides the credentials used by the HTTP layer, a user row carries the
//! notification preferences and the region label used for window math.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub country: Option<String>,
    pub telegram_chat_id: Option<i64>,
    pub email_alerts_enabled: bool,
    pub telegram_alerts_enabled: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Where and how a user wants to be told about threshold crossings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPreferences {
    pub username: String,
    pub email: Option<String>,
    /// Free-text region label, resolved by [`crate::timezone::offset_minutes`].
    pub country: Option<String>,
    pub telegram_chat_id: Option<i64>,
    pub email_alerts_enabled: bool,
    pub telegram_alerts_enabled: bool,
}

impl NotificationPreferences {
    /// Email address, only when email alerts are switched on.
    pub fn email_target(&self) -> Option<&str> {
        self.email
            .as_deref()
            .filter(|_| self.email_alerts_enabled)
    }

    /// Telegram chat, only when Telegram alerts are switched on.
    pub fn telegram_target(&self) -> Option<i64> {
        self.telegram_chat_id
            .filter(|_| self.telegram_alerts_enabled)
    }
}

impl From<Model> for NotificationPreferences {
    fn from(model: Model) -> Self {
        Self {
            username: model.username,
            email: model.email,
            country: model.country,
            telegram_chat_id: model.telegram_chat_id,
            email_alerts_enabled: model.email_alerts_enabled,
            telegram_alerts_enabled: model.telegram_alerts_enabled,
        }
    }
}

/// Partial update of [`NotificationPreferences`].
///
/// `None` leaves a field untouched. For the text fields, `Some("")` clears
/// the stored value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PreferencesUpdate {
    pub email: Option<String>,
    pub country: Option<String>,
    pub telegram_chat_id: Option<Option<i64>>,
    pub email_alerts_enabled: Option<bool>,
    pub telegram_alerts_enabled: Option<bool>,
}
