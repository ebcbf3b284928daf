use sea_orm::{QueryFilter, QueryOrder, QuerySelect, TransactionTrait, prelude::*};

use crate::{EngineError, ResultEngine, Transaction, transactions, users};

use super::{Engine, with_tx};

impl Engine {
    /// Persist a validated transaction for an existing user.
    pub async fn add_transaction(&self, transaction: &Transaction) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            if users::Entity::find_by_id(transaction.username.clone())
                .one(&db_tx)
                .await?
                .is_none()
            {
                return Err(EngineError::KeyNotFound("user not exists".to_string()));
            }
            transactions::ActiveModel::from(transaction)
                .insert(&db_tx)
                .await?;
            tracing::debug!(
                username = %transaction.username,
                direction = transaction.direction.as_str(),
                amount = transaction.amount.cents(),
                "transaction recorded"
            );
            Ok(())
        })
    }

    /// The user's transactions, newest first.
    pub async fn list_transactions(
        &self,
        username: &str,
        limit: Option<u64>,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .filter(transactions::Column::Username.eq(username))
            .order_by_desc(transactions::Column::OccurredAtMs)
            .order_by_desc(transactions::Column::Id);
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        query
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }
}
