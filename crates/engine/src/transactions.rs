//! Transaction primitives.
//!
//! A `Transaction` is one raw debit (expense) or credit (income) row. The
//! aggregates are always recomputed from these rows.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Category, EngineError, MoneyCents, ResultEngine, util::normalize_optional_text};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Debit,
    Credit,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debit => "debit",
            Self::Credit => "credit",
        }
    }
}

impl TryFrom<&str> for Direction {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "debit" => Ok(Self::Debit),
            "credit" => Ok(Self::Credit),
            other => Err(EngineError::InvalidDirection(format!(
                "invalid transaction direction: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub username: String,
    pub amount: MoneyCents,
    pub category: Category,
    pub direction: Direction,
    pub occurred_at: DateTime<Utc>,
    pub description: Option<String>,
}

impl Transaction {
    /// Largest accepted amount: one billion major units.
    pub const MAX_AMOUNT: MoneyCents = MoneyCents::new(1_000_000_000_00);

    pub fn new(
        username: &str,
        amount: MoneyCents,
        category: Category,
        direction: Direction,
        occurred_at: DateTime<Utc>,
        description: Option<&str>,
    ) -> ResultEngine<Self> {
        if !amount.is_positive() {
            return Err(EngineError::InvalidAmount("amount must be > 0".to_string()));
        }
        if amount > Self::MAX_AMOUNT {
            return Err(EngineError::InvalidAmount(format!(
                "amount must be <= {}",
                Self::MAX_AMOUNT
            )));
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(EngineError::InvalidUsername(
                "username must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            amount,
            category,
            direction,
            occurred_at,
            description: normalize_optional_text(description),
        })
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    pub amount_minor: i64,
    pub category: String,
    pub direction: String,
    /// Unix epoch milliseconds (UTC); window filters compare integers.
    pub occurred_at_ms: i64,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            username: ActiveValue::Set(tx.username.clone()),
            amount_minor: ActiveValue::Set(tx.amount.cents()),
            category: ActiveValue::Set(tx.category.as_str().to_string()),
            direction: ActiveValue::Set(tx.direction.as_str().to_string()),
            occurred_at_ms: ActiveValue::Set(tx.occurred_at.timestamp_millis()),
            description: ActiveValue::Set(tx.description.clone()),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let occurred_at = DateTime::<Utc>::from_timestamp_millis(model.occurred_at_ms)
            .ok_or_else(|| {
                EngineError::InvalidRecord(format!(
                    "invalid timestamp for transaction {}",
                    model.id
                ))
            })?;
        Ok(Self {
            id: Uuid::parse_str(&model.id).map_err(|err| {
                EngineError::InvalidRecord(format!("invalid id {:?}: {err}", model.id))
            })?,
            username: model.username,
            amount: MoneyCents::new(model.amount_minor),
            category: Category::try_from(model.category.as_str())?,
            direction: Direction::try_from(model.direction.as_str())?,
            occurred_at,
            description: model.description,
        })
    }
}
