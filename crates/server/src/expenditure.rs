//! Expenditure API endpoints

use std::sync::Arc;

use api_types::expenditure::{
    Direction as ApiDirection, ExpenditureList, ExpenditureNew, ExpenditureView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Category, Direction, MoneyCents, Transaction, users};

use crate::{ServerError, server::ServerState};

const DEFAULT_LIST_LIMIT: u64 = 50;

fn map_direction(direction: ApiDirection) -> Direction {
    match direction {
        ApiDirection::Debit => Direction::Debit,
        ApiDirection::Credit => Direction::Credit,
    }
}

fn expenditure_view(tx: &Transaction) -> ExpenditureView {
    ExpenditureView {
        id: tx.id,
        amount_minor: tx.amount.cents(),
        category: tx.category.as_str().to_string(),
        occurred_at: tx.occurred_at,
        direction: match tx.direction {
            Direction::Debit => ApiDirection::Debit,
            Direction::Credit => ApiDirection::Credit,
        },
        description: tx.description.clone(),
    }
}

/// Records a transaction. Debits are evaluated against the user's limits in
/// the background; the response does not wait for alert delivery.
pub async fn create(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenditureNew>,
) -> Result<(StatusCode, Json<ExpenditureView>), ServerError> {
    let category = Category::try_from(payload.category.as_str())?;
    let direction = map_direction(payload.direction);
    let tx = Transaction::new(
        &user.username,
        MoneyCents::new(payload.amount_minor),
        category,
        direction,
        payload.occurred_at.with_timezone(&Utc),
        payload.description.as_deref(),
    )?;

    if direction == Direction::Credit {
        state.engine.add_transaction(&tx).await?;
        return Ok((StatusCode::CREATED, Json(expenditure_view(&tx))));
    }

    // Held from the insert until the alert evaluation has read the totals.
    let guard = state.dispatcher.gate().acquire(&tx.username).await;
    state.engine.add_transaction(&tx).await?;

    let dispatcher = Arc::clone(&state.dispatcher);
    let debit = tx.clone();
    tokio::spawn(async move {
        dispatcher.dispatch_at(guard, &debit, Utc::now()).await;
    });

    Ok((StatusCode::CREATED, Json(expenditure_view(&tx))))
}

pub async fn list(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ExpenditureList>,
) -> Result<Json<Vec<ExpenditureView>>, ServerError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    let txs = state
        .engine
        .list_transactions(&user.username, Some(limit))
        .await?;

    Ok(Json(txs.iter().map(expenditure_view).collect()))
}
