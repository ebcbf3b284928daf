use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error body returned by every failing endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod limits {
    use super::*;

    /// Request body for `PUT /limits/update`.
    ///
    /// Absent fields are left untouched; `category_limits`, when present,
    /// replaces the stored category map. Negative values are stored as zero.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct LimitsUpdate {
        pub category_limits: Option<BTreeMap<String, i64>>,
        pub monthly_budget_minor: Option<i64>,
        pub daily_limit_minor: Option<i64>,
        pub weekly_limit_minor: Option<i64>,
        pub savings_goal_minor: Option<i64>,
    }

    /// Request body for `PUT /limits/category`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryLimitSet {
        pub category: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct LimitsView {
        pub category_limits: BTreeMap<String, i64>,
        pub monthly_budget_minor: i64,
        pub daily_limit_minor: i64,
        pub weekly_limit_minor: i64,
        pub savings_goal_minor: i64,
        pub updated_at: DateTime<Utc>,
    }

    /// Response of the limit write endpoints.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct LimitsResponse {
        pub message: String,
        pub limits: LimitsView,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct MonthlyView {
        pub total_spent_minor: i64,
        pub total_income_minor: i64,
        pub budget_minor: i64,
        pub remaining_minor: i64,
        pub percentage: f64,
    }

    /// Usage of a weekly, daily or monthly limit.
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct ScopeView {
        pub spent_minor: i64,
        pub limit_minor: i64,
        pub remaining_minor: i64,
        pub percentage: f64,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct SavingsView {
        pub actual_minor: i64,
        pub goal_minor: i64,
        pub remaining_minor: i64,
        pub percentage: f64,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct CategoryUsageView {
        pub limit_minor: i64,
        pub spent_minor: i64,
        pub remaining_minor: i64,
        pub percentage: f64,
        /// `safe`, `warning`, `critical` or `exceeded`.
        pub status: String,
    }

    /// Response of `GET /limits`.
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct AnalysisResponse {
        /// `null` when the user never stored limits.
        pub limits: Option<LimitsView>,
        pub monthly: MonthlyView,
        pub weekly: ScopeView,
        pub daily: ScopeView,
        pub savings: SavingsView,
        pub category_alerts: BTreeMap<String, CategoryUsageView>,
        pub category_spending: BTreeMap<String, i64>,
    }

    /// Response of `GET /limits/progress`.
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct ProgressResponse {
        pub monthly: ScopeView,
        pub weekly: ScopeView,
        pub daily: ScopeView,
        pub savings: SavingsView,
        pub categories: BTreeMap<String, CategoryUsageView>,
    }
}

pub mod expenditure {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Direction {
        Debit,
        Credit,
    }

    /// Request body for `POST /expenditure`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct ExpenditureNew {
        /// Must be > 0.
        pub amount_minor: i64,
        pub category: String,
        /// RFC3339 timestamp, including timezone offset.
        pub occurred_at: DateTime<FixedOffset>,
        pub direction: Direction,
        pub description: Option<String>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct ExpenditureView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub category: String,
        pub occurred_at: DateTime<Utc>,
        pub direction: Direction,
        pub description: Option<String>,
    }

    /// Query string of `GET /expenditure`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ExpenditureList {
        pub limit: Option<u64>,
    }
}

pub mod user {
    use super::*;

    /// Request body for `PUT /user/alerts`.
    ///
    /// Absent fields are left untouched. An empty `email` or `country`
    /// clears the stored value; `telegram_chat_id: null` unlinks the chat.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AlertSettingsUpdate {
        pub email: Option<String>,
        pub country: Option<String>,
        #[serde(default, with = "double_option")]
        pub telegram_chat_id: Option<Option<i64>>,
        pub email_alerts_enabled: Option<bool>,
        pub telegram_alerts_enabled: Option<bool>,
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    pub struct AlertSettings {
        pub email: Option<String>,
        pub country: Option<String>,
        pub utc_offset_minutes: i32,
        pub telegram_chat_id: Option<i64>,
        pub email_alerts_enabled: bool,
        pub telegram_alerts_enabled: bool,
    }

    /// Distinguishes a missing field (`None`) from an explicit `null`
    /// (`Some(None)`).
    mod double_option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        pub fn serialize<S, T>(value: &Option<Option<T>>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
            T: Serialize,
        {
            match value {
                Some(inner) => inner.serialize(serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
        where
            D: Deserializer<'de>,
            T: Deserialize<'de>,
        {
            Option::<T>::deserialize(deserializer).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::user::AlertSettingsUpdate;

    #[test]
    fn telegram_chat_id_null_differs_from_missing() {
        let missing: AlertSettingsUpdate = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.telegram_chat_id, None);

        let cleared: AlertSettingsUpdate =
            serde_json::from_str(r#"{"telegram_chat_id": null}"#).unwrap();
        assert_eq!(cleared.telegram_chat_id, Some(None));

        let set: AlertSettingsUpdate =
            serde_json::from_str(r#"{"telegram_chat_id": 42}"#).unwrap();
        assert_eq!(set.telegram_chat_id, Some(Some(42)));
    }
}
