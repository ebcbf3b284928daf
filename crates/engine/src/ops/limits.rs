use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};

use crate::{
    Category, EngineError, LimitProfile, LimitUpdate, MoneyCents, ResultEngine, limits, users,
};

use super::{Engine, with_tx};

impl Engine {
    /// Stored profile, `None` when the user never wrote limits.
    pub async fn limits(&self, username: &str) -> ResultEngine<Option<LimitProfile>> {
        Ok(limits::Entity::find_by_id(username.to_string())
            .one(&self.database)
            .await?
            .map(LimitProfile::from))
    }

    /// Stored profile, or an empty one.
    pub async fn limits_or_default(&self, username: &str) -> ResultEngine<LimitProfile> {
        Ok(self
            .limits(username)
            .await?
            .unwrap_or_else(|| LimitProfile::empty(username, Utc::now())))
    }

    /// Create the profile if absent, otherwise merge `update` into it.
    pub async fn update_limits(
        &self,
        username: &str,
        update: LimitUpdate,
    ) -> ResultEngine<LimitProfile> {
        self.upsert_limits(username, |profile| update.apply(profile))
            .await
    }

    /// Set one category cap, keeping the other categories.
    pub async fn set_category_limit(
        &self,
        username: &str,
        category: Category,
        amount: MoneyCents,
    ) -> ResultEngine<LimitProfile> {
        self.upsert_limits(username, |profile| {
            profile
                .category_limits
                .insert(category, amount.clamp_non_negative());
        })
        .await
    }

    /// Every cap to zero. The row is kept.
    pub async fn reset_limits(&self, username: &str) -> ResultEngine<LimitProfile> {
        self.update_limits(username, LimitUpdate::reset()).await
    }

    async fn upsert_limits<F>(&self, username: &str, change: F) -> ResultEngine<LimitProfile>
    where
        F: FnOnce(&mut LimitProfile),
    {
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }

            let existing = limits::Entity::find_by_id(username.to_string())
                .one(&db_tx)
                .await?;
            let is_new = existing.is_none();
            let mut profile = existing
                .map(LimitProfile::from)
                .unwrap_or_else(|| LimitProfile::empty(username, Utc::now()));

            change(&mut profile);
            profile.updated_at = Utc::now();

            let mut active = limits::ActiveModel::from(&profile);
            if is_new {
                active.insert(&db_tx).await?;
            } else {
                active.username = ActiveValue::Unchanged(profile.username.clone());
                active.update(&db_tx).await?;
            }
            tracing::debug!(username, created = is_new, "limits stored");
            Ok(profile)
        })
    }
}
