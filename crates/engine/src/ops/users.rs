use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    EngineError, NotificationPreferences, PreferencesUpdate, ResultEngine, timezone, users,
    util::normalize_optional_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Register a user. Alerts start disabled on both channels.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> ResultEngine<()> {
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidUsername(
                "username must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_some()
            {
                return Err(EngineError::ExistingKey(username.to_string()));
            }
            users::ActiveModel {
                username: ActiveValue::Set(username.to_string()),
                password: ActiveValue::Set(password.to_string()),
                email: ActiveValue::Set(normalize_optional_text(email)),
                country: ActiveValue::Set(None),
                telegram_chat_id: ActiveValue::Set(None),
                email_alerts_enabled: ActiveValue::Set(false),
                telegram_alerts_enabled: ActiveValue::Set(false),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(username, "user created");
            Ok(())
        })
    }

    pub async fn notification_preferences(
        &self,
        username: &str,
    ) -> ResultEngine<NotificationPreferences> {
        users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .map(NotificationPreferences::from)
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }

    pub async fn update_preferences(
        &self,
        username: &str,
        update: PreferencesUpdate,
    ) -> ResultEngine<NotificationPreferences> {
        with_tx!(self, |db_tx| {
            let model = users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))?;

            let mut active: users::ActiveModel = model.clone().into();
            if let Some(email) = update.email {
                active.email = ActiveValue::Set(normalize_optional_text(Some(&email)));
            }
            if let Some(country) = update.country {
                active.country = ActiveValue::Set(normalize_optional_text(Some(&country)));
            }
            if let Some(chat_id) = update.telegram_chat_id {
                active.telegram_chat_id = ActiveValue::Set(chat_id);
            }
            if let Some(enabled) = update.email_alerts_enabled {
                active.email_alerts_enabled = ActiveValue::Set(enabled);
            }
            if let Some(enabled) = update.telegram_alerts_enabled {
                active.telegram_alerts_enabled = ActiveValue::Set(enabled);
            }
            let model = if active.is_changed() {
                active.update(&db_tx).await?
            } else {
                model
            };
            Ok(NotificationPreferences::from(model))
        })
    }

    /// Offset used for the user's windows; UTC when the user or region is
    /// unknown.
    pub async fn utc_offset_minutes(&self, username: &str) -> ResultEngine<i32> {
        let country = users::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .and_then(|user| user.country);
        Ok(timezone::offset_minutes(country.as_deref()))
    }
}
