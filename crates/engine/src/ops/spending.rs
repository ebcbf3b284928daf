//! Window totals over raw transaction rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};

use crate::{
    Category, Direction, MoneyCents, MonthlySpending, ResultEngine, SpendingTotals, Window,
    Windows, transactions,
};

use super::Engine;

/// Rows of one user and direction inside `window` (both ends inclusive).
async fn rows_in_window<C: ConnectionTrait>(
    db: &C,
    username: &str,
    direction: Direction,
    window: Window,
) -> ResultEngine<Vec<transactions::Model>> {
    Ok(transactions::Entity::find()
        .filter(transactions::Column::Username.eq(username))
        .filter(transactions::Column::Direction.eq(direction.as_str()))
        .filter(transactions::Column::OccurredAtMs.between(window.start_ms(), window.end_ms()))
        .all(db)
        .await?)
}

async fn total_in_window<C: ConnectionTrait>(
    db: &C,
    username: &str,
    direction: Direction,
    window: Window,
) -> ResultEngine<MoneyCents> {
    Ok(rows_in_window(db, username, direction, window)
        .await?
        .into_iter()
        .map(|row| MoneyCents::new(row.amount_minor))
        .sum())
}

impl Engine {
    /// The user's local day, week and month around `now`.
    pub async fn windows_for(&self, username: &str, now: DateTime<Utc>) -> ResultEngine<Windows> {
        let offset = self.utc_offset_minutes(username).await?;
        Ok(Windows::at(now, offset))
    }

    /// Debits in the user's local month, overall and per category.
    pub async fn monthly_spending(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<MonthlySpending> {
        let windows = self.windows_for(username, now).await?;
        self.monthly_spending_in(username, windows.month).await
    }

    pub async fn weekly_spending(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let windows = self.windows_for(username, now).await?;
        total_in_window(&self.database, username, Direction::Debit, windows.week).await
    }

    pub async fn daily_spending(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let windows = self.windows_for(username, now).await?;
        total_in_window(&self.database, username, Direction::Debit, windows.day).await
    }

    /// Credits in the user's local month.
    pub async fn monthly_income(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<MoneyCents> {
        let windows = self.windows_for(username, now).await?;
        total_in_window(&self.database, username, Direction::Credit, windows.month).await
    }

    /// All four totals, resolving the user's offset once.
    pub(crate) async fn spending_totals(
        &self,
        username: &str,
        now: DateTime<Utc>,
    ) -> ResultEngine<SpendingTotals> {
        let windows = self.windows_for(username, now).await?;
        let db = &self.database;
        Ok(SpendingTotals {
            monthly: self.monthly_spending_in(username, windows.month).await?,
            weekly_spent: total_in_window(db, username, Direction::Debit, windows.week).await?,
            daily_spent: total_in_window(db, username, Direction::Debit, windows.day).await?,
            monthly_income: total_in_window(db, username, Direction::Credit, windows.month)
                .await?,
        })
    }

    async fn monthly_spending_in(
        &self,
        username: &str,
        month: Window,
    ) -> ResultEngine<MonthlySpending> {
        let rows = rows_in_window(&self.database, username, Direction::Debit, month).await?;

        let mut spending = MonthlySpending::default();
        let mut per_category: BTreeMap<Category, MoneyCents> = BTreeMap::new();
        for row in rows {
            let amount = MoneyCents::new(row.amount_minor);
            let category = Category::try_from(row.category.as_str())?;
            spending.total_spent += amount;
            *per_category.entry(category).or_default() += amount;
        }
        spending.category_spending = per_category;
        Ok(spending)
    }
}
