//! Spending analysis snapshot.
//!
//! A snapshot is built from a limit profile and the window totals at one
//! instant. It is never stored; [`crate::Engine::analyze`] rebuilds it on
//! every call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Category, LimitProfile, MoneyCents, UsageStatus};

/// Debit totals for the current local month.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySpending {
    pub total_spent: MoneyCents,
    /// Only categories with at least one debit in the window are present.
    pub category_spending: BTreeMap<Category, MoneyCents>,
}

/// All window totals an analysis needs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpendingTotals {
    pub monthly: MonthlySpending,
    pub weekly_spent: MoneyCents,
    pub daily_spent: MoneyCents,
    pub monthly_income: MoneyCents,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub total_spent: MoneyCents,
    pub total_income: MoneyCents,
    pub budget: MoneyCents,
    pub remaining: MoneyCents,
    /// Clamped to `[0, 100]`.
    pub percentage: f64,
}

impl MonthlySummary {
    /// Unclamped usage, `None` without a budget.
    pub fn raw_percentage(&self) -> Option<f64> {
        self.total_spent.percentage_of(self.budget)
    }
}

/// Usage of the weekly or daily cap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScopeUsage {
    pub spent: MoneyCents,
    pub limit: MoneyCents,
    pub remaining: MoneyCents,
    /// Clamped to `[0, 100]`.
    pub percentage: f64,
}

impl ScopeUsage {
    fn new(spent: MoneyCents, limit: MoneyCents) -> Self {
        Self {
            spent,
            limit,
            remaining: remaining(spent, limit),
            percentage: display_percentage(spent, limit),
        }
    }

    /// Unclamped usage, `None` without a limit.
    pub fn raw_percentage(&self) -> Option<f64> {
        self.spent.percentage_of(self.limit)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavingsProgress {
    /// Income minus spending this month; may be negative.
    pub actual: MoneyCents,
    pub goal: MoneyCents,
    pub remaining: MoneyCents,
    pub percentage: f64,
}

/// Usage of one configured category cap.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryUsage {
    pub limit: MoneyCents,
    pub spent: MoneyCents,
    pub remaining: MoneyCents,
    /// Clamped to `[0, 100]`.
    pub percentage: f64,
    pub status: UsageStatus,
}

impl CategoryUsage {
    pub fn raw_percentage(&self) -> Option<f64> {
        self.spent.percentage_of(self.limit)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    /// `None` when the user never stored limits.
    pub limits: Option<LimitProfile>,
    pub monthly: MonthlySummary,
    pub weekly: ScopeUsage,
    pub daily: ScopeUsage,
    pub savings: SavingsProgress,
    /// Only categories with a cap greater than zero.
    pub category_alerts: BTreeMap<Category, CategoryUsage>,
    pub category_spending: BTreeMap<Category, MoneyCents>,
}

impl AnalysisSnapshot {
    pub fn compute(limits: Option<LimitProfile>, totals: SpendingTotals) -> Self {
        let (budget, weekly_limit, daily_limit, goal) = match &limits {
            Some(profile) => (
                profile.monthly_budget(),
                profile.weekly_limit(),
                profile.daily_limit(),
                profile.savings_goal(),
            ),
            None => (
                MoneyCents::ZERO,
                MoneyCents::ZERO,
                MoneyCents::ZERO,
                MoneyCents::ZERO,
            ),
        };

        let spent = totals.monthly.total_spent;
        let actual_savings = totals.monthly_income - spent;

        let category_alerts = limits
            .iter()
            .flat_map(|profile| profile.category_limits.iter())
            .filter(|(_, limit)| limit.is_positive())
            .map(|(&category, &limit)| {
                let spent = totals
                    .monthly
                    .category_spending
                    .get(&category)
                    .copied()
                    .unwrap_or(MoneyCents::ZERO);
                let raw = spent.percentage_of(limit).unwrap_or(0.0);
                let usage = CategoryUsage {
                    limit,
                    spent,
                    remaining: remaining(spent, limit),
                    percentage: raw.min(100.0),
                    status: UsageStatus::from_percentage(raw),
                };
                (category, usage)
            })
            .collect();

        Self {
            monthly: MonthlySummary {
                total_spent: spent,
                total_income: totals.monthly_income,
                budget,
                remaining: remaining(spent, budget),
                percentage: display_percentage(spent, budget),
            },
            weekly: ScopeUsage::new(totals.weekly_spent, weekly_limit),
            daily: ScopeUsage::new(totals.daily_spent, daily_limit),
            savings: SavingsProgress {
                actual: actual_savings,
                goal,
                remaining: remaining(actual_savings, goal),
                percentage: display_percentage(actual_savings, goal),
            },
            category_alerts,
            category_spending: totals.monthly.category_spending,
            limits,
        }
    }
}

/// `max(0, limit - spent)`, or zero when no limit is configured.
fn remaining(spent: MoneyCents, limit: MoneyCents) -> MoneyCents {
    if !limit.is_positive() {
        return MoneyCents::ZERO;
    }
    (limit - spent).clamp_non_negative()
}

/// Usage clamped to `[0, 100]`, or zero when no limit is configured.
fn display_percentage(spent: MoneyCents, limit: MoneyCents) -> f64 {
    spent
        .percentage_of(limit)
        .map_or(0.0, |raw| raw.clamp(0.0, 100.0))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::LimitUpdate;

    fn money(units: i64) -> MoneyCents {
        MoneyCents::new(units * 100)
    }

    fn profile(update: LimitUpdate) -> LimitProfile {
        let mut profile = LimitProfile::empty("alice", Utc::now());
        update.apply(&mut profile);
        profile
    }

    fn totals(spent: i64, food: i64, income: i64) -> SpendingTotals {
        SpendingTotals {
            monthly: MonthlySpending {
                total_spent: money(spent),
                category_spending: BTreeMap::from([(Category::Food, money(food))]),
            },
            weekly_spent: money(spent),
            daily_spent: money(spent),
            monthly_income: money(income),
        }
    }

    #[test]
    fn missing_profile_reports_zero_everywhere() {
        let snapshot = AnalysisSnapshot::compute(None, totals(500, 200, 0));

        assert_eq!(snapshot.limits, None);
        assert_eq!(snapshot.monthly.budget, MoneyCents::ZERO);
        assert_eq!(snapshot.monthly.remaining, MoneyCents::ZERO);
        assert_eq!(snapshot.monthly.percentage, 0.0);
        assert_eq!(snapshot.weekly.percentage, 0.0);
        assert!(snapshot.category_alerts.is_empty());
        assert_eq!(snapshot.savings.actual, money(-500));
    }

    #[test]
    fn percentages_are_clamped_for_display_only() {
        let limits = profile(LimitUpdate {
            monthly_budget: Some(money(1000)),
            category_limits: Some(BTreeMap::from([(Category::Food, money(100))])),
            ..LimitUpdate::default()
        });
        let snapshot = AnalysisSnapshot::compute(Some(limits), totals(1100, 150, 0));

        assert_eq!(snapshot.monthly.percentage, 100.0);
        assert_eq!(snapshot.monthly.remaining, MoneyCents::ZERO);
        let raw = snapshot.monthly.raw_percentage().unwrap();
        assert!((raw - 110.0).abs() < 1e-9);

        let food = &snapshot.category_alerts[&Category::Food];
        assert_eq!(food.percentage, 100.0);
        assert_eq!(food.status, UsageStatus::Exceeded);
        assert!((food.raw_percentage().unwrap() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn category_status_and_remaining() {
        let limits = profile(LimitUpdate {
            category_limits: Some(BTreeMap::from([
                (Category::Food, money(200)),
                (Category::Bills, money(300)),
                (Category::Other, MoneyCents::ZERO),
            ])),
            ..LimitUpdate::default()
        });
        let snapshot = AnalysisSnapshot::compute(Some(limits), totals(180, 180, 0));

        let food = &snapshot.category_alerts[&Category::Food];
        assert_eq!(food.status, UsageStatus::Critical);
        assert_eq!(food.remaining, money(20));
        assert!((food.percentage - 90.0).abs() < 1e-9);

        let bills = &snapshot.category_alerts[&Category::Bills];
        assert_eq!(bills.spent, MoneyCents::ZERO);
        assert_eq!(bills.status, UsageStatus::Safe);

        assert!(!snapshot.category_alerts.contains_key(&Category::Other));
    }

    #[test]
    fn savings_progress_is_clamped_to_zero_when_negative() {
        let limits = profile(LimitUpdate {
            savings_goal: Some(money(500)),
            ..LimitUpdate::default()
        });
        let under = AnalysisSnapshot::compute(Some(limits.clone()), totals(800, 0, 1000));
        assert_eq!(under.savings.actual, money(200));
        assert_eq!(under.savings.remaining, money(300));
        assert!((under.savings.percentage - 40.0).abs() < 1e-9);

        let negative = AnalysisSnapshot::compute(Some(limits), totals(1200, 0, 1000));
        assert_eq!(negative.savings.actual, money(-200));
        assert_eq!(negative.savings.remaining, money(700));
        assert_eq!(negative.savings.percentage, 0.0);
    }

    #[test]
    fn reset_profile_has_no_division_by_zero() {
        let limits = profile(LimitUpdate::reset());
        let snapshot = AnalysisSnapshot::compute(Some(limits), totals(900, 900, 100));

        for percentage in [
            snapshot.monthly.percentage,
            snapshot.weekly.percentage,
            snapshot.daily.percentage,
            snapshot.savings.percentage,
        ] {
            assert_eq!(percentage, 0.0);
        }
        assert!(snapshot.category_alerts.is_empty());
        assert_eq!(snapshot.weekly.raw_percentage(), None);
    }
}
