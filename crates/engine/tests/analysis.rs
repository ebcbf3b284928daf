use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue, Database, DatabaseConnection};

use engine::{
    AlertScope, Category, Direction, Engine, EngineError, LimitUpdate, MoneyCents,
    PreferencesUpdate, Transaction, UsageStatus, evaluate_alerts, transactions,
};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    engine.create_user("alice", "password", None).await.unwrap();
    (engine, db)
}

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

fn money(units: i64) -> MoneyCents {
    MoneyCents::new(units * 100)
}

async fn record(
    engine: &Engine,
    units: i64,
    category: Category,
    direction: Direction,
    occurred_at: DateTime<Utc>,
) {
    let tx = Transaction::new("alice", money(units), category, direction, occurred_at, None)
        .unwrap();
    engine.add_transaction(&tx).await.unwrap();
}

#[tokio::test]
async fn monthly_window_includes_last_millisecond_only() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2024-03-15T12:00:00Z");
    let last = at("2024-03-31T23:59:59.999Z");

    record(&engine, 10, Category::Food, Direction::Debit, at("2024-03-01T00:00:00Z")).await;
    record(&engine, 20, Category::Bills, Direction::Debit, last).await;
    record(&engine, 40, Category::Food, Direction::Debit, last + Duration::milliseconds(1)).await;
    record(&engine, 80, Category::Food, Direction::Debit, at("2024-02-29T23:59:59.999Z")).await;
    record(&engine, 500, Category::Other, Direction::Credit, now).await;

    let spending = engine.monthly_spending("alice", now).await.unwrap();
    assert_eq!(spending.total_spent, money(30));
    assert_eq!(
        spending.category_spending,
        BTreeMap::from([(Category::Food, money(10)), (Category::Bills, money(20))])
    );
    assert_eq!(engine.monthly_income("alice", now).await.unwrap(), money(500));
}

#[tokio::test]
async fn week_and_day_totals() {
    let (engine, _db) = engine_with_db().await;
    // Wednesday.
    let now = at("2024-05-15T10:00:00Z");

    record(&engine, 5, Category::Food, Direction::Debit, at("2024-05-15T00:00:00Z")).await;
    record(&engine, 7, Category::Food, Direction::Debit, at("2024-05-12T00:00:00Z")).await;
    record(&engine, 11, Category::Food, Direction::Debit, at("2024-05-11T23:59:59.999Z")).await;
    record(&engine, 13, Category::Food, Direction::Credit, at("2024-05-15T09:00:00Z")).await;

    assert_eq!(engine.daily_spending("alice", now).await.unwrap(), money(5));
    assert_eq!(engine.weekly_spending("alice", now).await.unwrap(), money(12));
}

#[tokio::test]
async fn no_rows_means_zero() {
    let (engine, _db) = engine_with_db().await;
    let now = Utc::now();
    assert_eq!(
        engine.monthly_spending("alice", now).await.unwrap().total_spent,
        MoneyCents::ZERO
    );
    assert_eq!(engine.weekly_spending("alice", now).await.unwrap(), MoneyCents::ZERO);
    assert_eq!(engine.daily_spending("alice", now).await.unwrap(), MoneyCents::ZERO);
    assert_eq!(engine.monthly_income("alice", now).await.unwrap(), MoneyCents::ZERO);
}

#[tokio::test]
async fn region_offset_moves_transaction_into_next_local_month() {
    let (engine, _db) = engine_with_db().await;
    engine
        .update_preferences(
            "alice",
            PreferencesUpdate {
                country: Some("India".to_string()),
                ..PreferencesUpdate::default()
            },
        )
        .await
        .unwrap();

    // 2024-02-01T00:30 local.
    let instant = at("2024-01-31T19:00:00Z");
    record(&engine, 25, Category::Food, Direction::Debit, instant).await;

    let february = engine
        .monthly_spending("alice", at("2024-02-10T00:00:00Z"))
        .await
        .unwrap();
    assert_eq!(february.total_spent, money(25));

    let january = engine
        .monthly_spending("alice", at("2024-01-20T00:00:00Z"))
        .await
        .unwrap();
    assert_eq!(january.total_spent, MoneyCents::ZERO);
}

#[tokio::test]
async fn limits_are_created_lazily_and_merged() {
    let (engine, _db) = engine_with_db().await;
    assert_eq!(engine.limits("alice").await.unwrap(), None);
    let default = engine.limits_or_default("alice").await.unwrap();
    assert_eq!(default.monthly_budget(), MoneyCents::ZERO);

    engine
        .update_limits(
            "alice",
            LimitUpdate {
                monthly_budget: Some(money(1000)),
                ..LimitUpdate::default()
            },
        )
        .await
        .unwrap();
    engine
        .set_category_limit("alice", Category::Food, money(200))
        .await
        .unwrap();
    engine
        .set_category_limit("alice", Category::Bills, money(-5))
        .await
        .unwrap();
    let profile = engine
        .update_limits(
            "alice",
            LimitUpdate {
                daily_limit: Some(money(50)),
                ..LimitUpdate::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(profile.monthly_budget(), money(1000));
    assert_eq!(profile.daily_limit(), money(50));
    assert_eq!(profile.category_limit(Category::Food), money(200));
    assert_eq!(profile.category_limit(Category::Bills), MoneyCents::ZERO);
    let stored = engine.limits("alice").await.unwrap().unwrap();
    assert_eq!(stored.category_limits, profile.category_limits);
    assert_eq!(stored.daily_limit, profile.daily_limit);
}

#[tokio::test]
async fn limits_for_unknown_user_are_rejected() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.reset_limits("bob").await.unwrap_err();
    assert_eq!(err, EngineError::KeyNotFound("user not exists".to_string()));
}

#[tokio::test]
async fn analyze_is_idempotent_and_reflects_writes() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2024-06-10T12:00:00Z");
    engine
        .update_limits(
            "alice",
            LimitUpdate {
                monthly_budget: Some(money(1000)),
                category_limits: Some(BTreeMap::from([(Category::Food, money(100))])),
                ..LimitUpdate::default()
            },
        )
        .await
        .unwrap();
    record(&engine, 90, Category::Food, Direction::Debit, now).await;

    let first = engine.analyze("alice", now).await.unwrap();
    let second = engine.analyze("alice", now).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.category_alerts[&Category::Food].status, UsageStatus::Critical);

    record(&engine, 20, Category::Food, Direction::Debit, now).await;
    let third = engine.analyze("alice", now).await.unwrap();
    assert_eq!(third.monthly.total_spent, money(110));
    assert_eq!(third.category_alerts[&Category::Food].percentage, 100.0);
}

#[tokio::test]
async fn reset_reports_no_limit_everywhere() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2024-06-10T12:00:00Z");
    engine
        .update_limits(
            "alice",
            LimitUpdate {
                monthly_budget: Some(money(100)),
                weekly_limit: Some(money(100)),
                daily_limit: Some(money(100)),
                savings_goal: Some(money(100)),
                category_limits: Some(BTreeMap::from([(Category::Food, money(100))])),
            },
        )
        .await
        .unwrap();
    record(&engine, 300, Category::Food, Direction::Debit, now).await;

    engine.reset_limits("alice").await.unwrap();
    let snapshot = engine.analyze("alice", now).await.unwrap();

    assert!(snapshot.limits.is_some());
    assert_eq!(snapshot.monthly.percentage, 0.0);
    assert_eq!(snapshot.monthly.remaining, MoneyCents::ZERO);
    assert_eq!(snapshot.weekly.percentage, 0.0);
    assert_eq!(snapshot.daily.percentage, 0.0);
    assert_eq!(snapshot.savings.percentage, 0.0);
    assert!(snapshot.category_alerts.is_empty());
    let windows = engine.windows_for("alice", now).await.unwrap();
    let events = evaluate_alerts(&snapshot, &windows, "alice", money(300), Category::Food, now);
    assert!(events.is_empty());
}

#[tokio::test]
async fn crossing_eighty_percent_of_monthly_budget() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2024-06-10T12:00:00Z");
    engine
        .update_limits(
            "alice",
            LimitUpdate {
                monthly_budget: Some(money(1000)),
                ..LimitUpdate::default()
            },
        )
        .await
        .unwrap();
    record(&engine, 750, Category::Bills, Direction::Debit, at("2024-06-02T08:00:00Z")).await;
    record(&engine, 100, Category::Food, Direction::Debit, now).await;

    let snapshot = engine.analyze("alice", now).await.unwrap();
    let windows = engine.windows_for("alice", now).await.unwrap();
    let events = evaluate_alerts(&snapshot, &windows, "alice", money(100), Category::Food, now);

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].scope, AlertScope::Monthly);
    assert!((events[0].percentage - 85.0).abs() < 1e-9);
    assert!(!events[0].is_overspent);
}

#[tokio::test]
async fn repeat_overspend_on_monthly_budget() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2024-06-10T12:00:00Z");
    engine
        .update_limits(
            "alice",
            LimitUpdate {
                monthly_budget: Some(money(1000)),
                ..LimitUpdate::default()
            },
        )
        .await
        .unwrap();
    record(&engine, 1050, Category::Bills, Direction::Debit, at("2024-06-02T08:00:00Z")).await;
    record(&engine, 50, Category::Food, Direction::Debit, now).await;

    let snapshot = engine.analyze("alice", now).await.unwrap();
    assert_eq!(snapshot.monthly.percentage, 100.0);

    let windows = engine.windows_for("alice", now).await.unwrap();
    let events = evaluate_alerts(&snapshot, &windows, "alice", money(50), Category::Food, now);
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert!(event.is_overspent);
    assert!((event.percentage - 110.0).abs() < 1e-9);
    assert_eq!(event.overspent_amount(), Some(money(100)));
}

#[tokio::test]
async fn backdated_debit_does_not_alert_on_current_month() {
    let (engine, _db) = engine_with_db().await;
    let now = at("2024-06-10T12:00:00Z");
    engine
        .update_limits(
            "alice",
            LimitUpdate {
                monthly_budget: Some(money(1000)),
                ..LimitUpdate::default()
            },
        )
        .await
        .unwrap();
    record(&engine, 850, Category::Bills, Direction::Debit, at("2024-06-02T08:00:00Z")).await;
    let may = at("2024-05-02T08:00:00Z");
    record(&engine, 900, Category::Food, Direction::Debit, may).await;

    let snapshot = engine.analyze("alice", now).await.unwrap();
    assert_eq!(snapshot.monthly.total_spent, money(850));

    let windows = engine.windows_for("alice", now).await.unwrap();
    let events = evaluate_alerts(&snapshot, &windows, "alice", money(900), Category::Food, may);
    assert!(events.is_empty());
}

#[tokio::test]
async fn huge_stored_totals_saturate_instead_of_overflowing() {
    let (engine, db) = engine_with_db().await;
    let now = at("2024-06-10T12:00:00Z");
    engine
        .update_limits(
            "alice",
            LimitUpdate {
                monthly_budget: Some(money(1000)),
                ..LimitUpdate::default()
            },
        )
        .await
        .unwrap();
    for _ in 0..2 {
        transactions::ActiveModel {
            id: ActiveValue::Set(uuid::Uuid::new_v4().to_string()),
            username: ActiveValue::Set("alice".to_string()),
            amount_minor: ActiveValue::Set(i64::MAX / 2 + 1),
            category: ActiveValue::Set("food".to_string()),
            direction: ActiveValue::Set("debit".to_string()),
            occurred_at_ms: ActiveValue::Set(now.timestamp_millis()),
            description: ActiveValue::Set(None),
        }
        .insert(&db)
        .await
        .unwrap();
    }

    let snapshot = engine.analyze("alice", now).await.unwrap();
    assert_eq!(snapshot.monthly.total_spent, MoneyCents::new(i64::MAX));
    assert_eq!(snapshot.monthly.percentage, 100.0);
    assert_eq!(snapshot.monthly.remaining, MoneyCents::ZERO);
}
