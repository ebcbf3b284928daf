//! Alert evaluation for a freshly recorded debit.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    AnalysisSnapshot, Category, MoneyCents, UsageStatus, Window, Windows, threshold::crossed,
};

/// Scope an alert refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "category", rename_all = "snake_case")]
pub enum AlertScope {
    Category(Category),
    Monthly,
    Weekly,
    Daily,
}

impl AlertScope {
    pub fn display_name(&self) -> String {
        match self {
            Self::Category(category) => format!("{category} (Category)"),
            Self::Monthly => "Monthly Budget".to_string(),
            Self::Weekly => "Weekly Budget".to_string(),
            Self::Daily => "Daily Budget".to_string(),
        }
    }

    /// The window whose totals this scope measures.
    pub fn window(&self, windows: &Windows) -> Window {
        match self {
            Self::Category(_) | Self::Monthly => windows.month,
            Self::Weekly => windows.week,
            Self::Daily => windows.day,
        }
    }
}

impl fmt::Display for AlertScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// A threshold crossing caused by one transaction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub username: String,
    pub scope: AlertScope,
    pub spent: MoneyCents,
    pub limit: MoneyCents,
    /// Unclamped; above 100 while overspent.
    pub percentage: f64,
    /// Already at or above the limit before this transaction.
    pub is_overspent: bool,
}

impl AlertEvent {
    pub fn level(&self) -> UsageStatus {
        UsageStatus::from_percentage(self.percentage)
    }

    /// `spent - limit` once the limit is reached.
    pub fn overspent_amount(&self) -> Option<MoneyCents> {
        (self.level() == UsageStatus::Exceeded).then(|| self.spent - self.limit)
    }
}

/// Alert events raised by a debit of `amount` in `category` dated
/// `occurred_at`, given the snapshot taken after it was recorded and the
/// windows that snapshot was computed over.
///
/// Scopes are checked in order: the transaction's own category, monthly,
/// weekly, daily. Scopes without a limit never fire, and neither do scopes
/// whose window does not contain `occurred_at`: their totals did not move.
pub fn evaluate_alerts(
    snapshot: &AnalysisSnapshot,
    windows: &Windows,
    username: &str,
    amount: MoneyCents,
    category: Category,
    occurred_at: DateTime<Utc>,
) -> Vec<AlertEvent> {
    let category_usage = snapshot
        .category_alerts
        .get(&category)
        .map(|usage| (usage.spent, usage.limit));
    let candidates = [
        (AlertScope::Category(category), category_usage),
        (
            AlertScope::Monthly,
            Some((snapshot.monthly.total_spent, snapshot.monthly.budget)),
        ),
        (
            AlertScope::Weekly,
            Some((snapshot.weekly.spent, snapshot.weekly.limit)),
        ),
        (
            AlertScope::Daily,
            Some((snapshot.daily.spent, snapshot.daily.limit)),
        ),
    ];

    candidates
        .into_iter()
        .filter(|(scope, _)| scope.window(windows).contains(occurred_at))
        .filter_map(|(scope, usage)| {
            let (spent, limit) = usage?;
            let current = spent.percentage_of(limit)?;
            let previous = (spent - amount).percentage_of(limit)?;
            crossed(previous, current).then(|| AlertEvent {
                username: username.to_string(),
                scope,
                spent,
                limit,
                percentage: current,
                is_overspent: previous >= 100.0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::{LimitProfile, LimitUpdate, MonthlySpending, SpendingTotals};

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn now() -> DateTime<Utc> {
        at("2024-06-12T12:00:00Z")
    }

    /// Evaluates a debit made at [`now`] in UTC.
    fn evaluate(
        snap: &AnalysisSnapshot,
        amount: MoneyCents,
        category: Category,
    ) -> Vec<AlertEvent> {
        evaluate_alerts(snap, &Windows::at(now(), 0), "alice", amount, category, now())
    }

    fn money(units: i64) -> MoneyCents {
        MoneyCents::new(units * 100)
    }

    fn snapshot(update: LimitUpdate, food: i64, monthly: i64, weekly: i64, daily: i64) -> AnalysisSnapshot {
        let mut profile = LimitProfile::empty("alice", now());
        update.apply(&mut profile);
        AnalysisSnapshot::compute(
            Some(profile),
            SpendingTotals {
                monthly: MonthlySpending {
                    total_spent: money(monthly),
                    category_spending: BTreeMap::from([(Category::Food, money(food))]),
                },
                weekly_spent: money(weekly),
                daily_spent: money(daily),
                monthly_income: MoneyCents::ZERO,
            },
        )
    }

    fn monthly_budget(units: i64) -> LimitUpdate {
        LimitUpdate {
            monthly_budget: Some(money(units)),
            ..LimitUpdate::default()
        }
    }

    #[test]
    fn crossing_eighty_on_monthly_budget_only() {
        let snap = snapshot(monthly_budget(1000), 100, 850, 100, 100);
        let events = evaluate(&snap, money(100), Category::Food);

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.scope, AlertScope::Monthly);
        assert!((event.percentage - 85.0).abs() < 1e-9);
        assert!(!event.is_overspent);
        assert_eq!(event.level(), UsageStatus::Warning);
        assert_eq!(event.overspent_amount(), None);
    }

    #[test]
    fn repeat_overspend_keeps_unclamped_percentage() {
        let snap = snapshot(monthly_budget(1000), 50, 1100, 50, 50);
        let events = evaluate(&snap, money(50), Category::Food);

        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert!(event.is_overspent);
        assert!((event.percentage - 110.0).abs() < 1e-9);
        assert_eq!(event.level(), UsageStatus::Exceeded);
        assert_eq!(event.overspent_amount(), Some(money(100)));
    }

    #[test]
    fn only_the_transaction_category_is_checked() {
        let update = LimitUpdate {
            category_limits: Some(BTreeMap::from([
                (Category::Food, money(100)),
                (Category::Bills, money(10)),
            ])),
            ..LimitUpdate::default()
        };
        let snap = snapshot(update, 95, 95, 0, 0);

        let food = evaluate(&snap, money(20), Category::Food);
        assert_eq!(food.len(), 1);
        assert_eq!(food[0].scope, AlertScope::Category(Category::Food));
        assert_eq!(food[0].level(), UsageStatus::Critical);

        // Bills has a limit but no spending and is not this transaction's category.
        let transport = evaluate(&snap, money(20), Category::Transport);
        assert!(transport.is_empty());
    }

    #[test]
    fn scopes_are_reported_in_fixed_order() {
        let update = LimitUpdate {
            category_limits: Some(BTreeMap::from([(Category::Food, money(100))])),
            monthly_budget: Some(money(100)),
            weekly_limit: Some(money(100)),
            daily_limit: Some(money(100)),
            ..LimitUpdate::default()
        };
        let snap = snapshot(update, 100, 100, 100, 100);
        let scopes: Vec<_> = evaluate(&snap, money(100), Category::Food)
            .into_iter()
            .map(|event| event.scope)
            .collect();

        assert_eq!(
            scopes,
            vec![
                AlertScope::Category(Category::Food),
                AlertScope::Monthly,
                AlertScope::Weekly,
                AlertScope::Daily,
            ]
        );
    }

    #[test]
    fn reset_limits_never_fire() {
        let snap = snapshot(LimitUpdate::reset(), 5000, 5000, 5000, 5000);
        assert!(evaluate(&snap, money(100), Category::Food).is_empty());
    }

    #[test]
    fn debit_outside_a_window_leaves_that_scope_alone() {
        let update = LimitUpdate {
            monthly_budget: Some(money(1000)),
            weekly_limit: Some(money(100)),
            daily_limit: Some(money(100)),
            ..LimitUpdate::default()
        };
        let snap = snapshot(update, 0, 850, 90, 90);
        let windows = Windows::at(now(), 0);

        // Earlier this week, so only the month and week totals include it.
        let monday = at("2024-06-10T09:00:00Z");
        let scopes: Vec<_> =
            evaluate_alerts(&snap, &windows, "alice", money(90), Category::Food, monday)
                .into_iter()
                .map(|event| event.scope)
                .collect();
        assert_eq!(scopes, vec![AlertScope::Monthly, AlertScope::Weekly]);

        // Last month: nothing in the current windows changed.
        let may = at("2024-05-02T09:00:00Z");
        let events = evaluate_alerts(&snap, &windows, "alice", money(900), Category::Food, may);
        assert!(events.is_empty());
    }

    #[test]
    fn display_names() {
        assert_eq!(
            AlertScope::Category(Category::Food).display_name(),
            "food (Category)"
        );
        assert_eq!(AlertScope::Monthly.display_name(), "Monthly Budget");
        assert_eq!(AlertScope::Weekly.to_string(), "Weekly Budget");
        assert_eq!(AlertScope::Daily.display_name(), "Daily Budget");
    }
}
