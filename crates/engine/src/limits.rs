//! Per-user spending limit profile.
//!
//! One row per user, created lazily on the first write. A cap that is unset
//! (`None`) or zero means "no limit configured" for that scope.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    Category, MoneyCents,
    util::{cap_from_column, cap_to_column},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitProfile {
    pub username: String,
    /// Only categories with a stored cap are present.
    pub category_limits: BTreeMap<Category, MoneyCents>,
    pub monthly_budget: Option<MoneyCents>,
    pub daily_limit: Option<MoneyCents>,
    pub weekly_limit: Option<MoneyCents>,
    pub savings_goal: Option<MoneyCents>,
    pub updated_at: DateTime<Utc>,
}

impl LimitProfile {
    /// Profile with nothing configured.
    pub fn empty(username: &str, updated_at: DateTime<Utc>) -> Self {
        Self {
            username: username.to_string(),
            category_limits: BTreeMap::new(),
            monthly_budget: None,
            daily_limit: None,
            weekly_limit: None,
            savings_goal: None,
            updated_at,
        }
    }

    pub fn category_limit(&self, category: Category) -> MoneyCents {
        self.category_limits
            .get(&category)
            .copied()
            .unwrap_or(MoneyCents::ZERO)
    }

    pub fn monthly_budget(&self) -> MoneyCents {
        self.monthly_budget.unwrap_or(MoneyCents::ZERO)
    }

    pub fn daily_limit(&self) -> MoneyCents {
        self.daily_limit.unwrap_or(MoneyCents::ZERO)
    }

    pub fn weekly_limit(&self) -> MoneyCents {
        self.weekly_limit.unwrap_or(MoneyCents::ZERO)
    }

    pub fn savings_goal(&self) -> MoneyCents {
        self.savings_goal.unwrap_or(MoneyCents::ZERO)
    }
}

/// Partial update merged into a [`LimitProfile`].
///
/// Fields left as `None` are untouched. `category_limits`, when present,
/// replaces the whole category map. Negative amounts are stored as zero.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LimitUpdate {
    pub category_limits: Option<BTreeMap<Category, MoneyCents>>,
    pub monthly_budget: Option<MoneyCents>,
    pub daily_limit: Option<MoneyCents>,
    pub weekly_limit: Option<MoneyCents>,
    pub savings_goal: Option<MoneyCents>,
}

impl LimitUpdate {
    /// Update that sets every cap to zero.
    pub fn reset() -> Self {
        Self {
            category_limits: Some(
                Category::ALL
                    .into_iter()
                    .map(|category| (category, MoneyCents::ZERO))
                    .collect(),
            ),
            monthly_budget: Some(MoneyCents::ZERO),
            daily_limit: Some(MoneyCents::ZERO),
            weekly_limit: Some(MoneyCents::ZERO),
            savings_goal: Some(MoneyCents::ZERO),
        }
    }

    pub(crate) fn apply(self, profile: &mut LimitProfile) {
        if let Some(limits) = self.category_limits {
            profile.category_limits = limits
                .into_iter()
                .map(|(category, amount)| (category, amount.clamp_non_negative()))
                .collect();
        }
        if let Some(amount) = self.monthly_budget {
            profile.monthly_budget = Some(amount.clamp_non_negative());
        }
        if let Some(amount) = self.daily_limit {
            profile.daily_limit = Some(amount.clamp_non_negative());
        }
        if let Some(amount) = self.weekly_limit {
            profile.weekly_limit = Some(amount.clamp_non_negative());
        }
        if let Some(amount) = self.savings_goal {
            profile.savings_goal = Some(amount.clamp_non_negative());
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "limits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub food: Option<i64>,
    pub transport: Option<i64>,
    pub shopping: Option<i64>,
    pub entertainment: Option<i64>,
    pub bills: Option<i64>,
    pub healthcare: Option<i64>,
    pub education: Option<i64>,
    pub other: Option<i64>,
    pub monthly_budget: Option<i64>,
    pub daily_limit: Option<i64>,
    pub weekly_limit: Option<i64>,
    pub savings_goal: Option<i64>,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    fn category_column(&self, category: Category) -> Option<i64> {
        match category {
            Category::Food => self.food,
            Category::Transport => self.transport,
            Category::Shopping => self.shopping,
            Category::Entertainment => self.entertainment,
            Category::Bills => self.bills,
            Category::Healthcare => self.healthcare,
            Category::Education => self.education,
            Category::Other => self.other,
        }
    }
}

impl From<Model> for LimitProfile {
    fn from(model: Model) -> Self {
        let category_limits = Category::ALL
            .into_iter()
            .filter_map(|category| {
                cap_from_column(model.category_column(category)).map(|cap| (category, cap))
            })
            .collect();
        Self {
            username: model.username,
            category_limits,
            monthly_budget: cap_from_column(model.monthly_budget),
            daily_limit: cap_from_column(model.daily_limit),
            weekly_limit: cap_from_column(model.weekly_limit),
            savings_goal: cap_from_column(model.savings_goal),
            updated_at: model.updated_at,
        }
    }
}

impl From<&LimitProfile> for ActiveModel {
    fn from(profile: &LimitProfile) -> Self {
        let cap = |category| {
            ActiveValue::Set(cap_to_column(profile.category_limits.get(&category).copied()))
        };
        Self {
            username: ActiveValue::Set(profile.username.clone()),
            food: cap(Category::Food),
            transport: cap(Category::Transport),
            shopping: cap(Category::Shopping),
            entertainment: cap(Category::Entertainment),
            bills: cap(Category::Bills),
            healthcare: cap(Category::Healthcare),
            education: cap(Category::Education),
            other: cap(Category::Other),
            monthly_budget: ActiveValue::Set(cap_to_column(profile.monthly_budget)),
            daily_limit: ActiveValue::Set(cap_to_column(profile.daily_limit)),
            weekly_limit: ActiveValue::Set(cap_to_column(profile.weekly_limit)),
            savings_goal: ActiveValue::Set(cap_to_column(profile.savings_goal)),
            updated_at: ActiveValue::Set(profile.updated_at),
        }
    }
}
