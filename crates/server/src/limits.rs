//! Limits API endpoints

use std::collections::BTreeMap;

use api_types::limits::{
    AnalysisResponse, CategoryLimitSet, CategoryUsageView, LimitsResponse, LimitsUpdate,
    LimitsView, MonthlyView, ProgressResponse, SavingsView, ScopeView,
};
use axum::{Extension, Json, extract::State};
use chrono::Utc;
use engine::{
    AnalysisSnapshot, Category, CategoryUsage, LimitProfile, LimitUpdate, MoneyCents,
    SavingsProgress, ScopeUsage, users,
};

use crate::{ServerError, server::ServerState};

fn limits_view(profile: &LimitProfile) -> LimitsView {
    LimitsView {
        category_limits: profile
            .category_limits
            .iter()
            .map(|(category, cap)| (category.as_str().to_string(), cap.cents()))
            .collect(),
        monthly_budget_minor: profile.monthly_budget().cents(),
        daily_limit_minor: profile.daily_limit().cents(),
        weekly_limit_minor: profile.weekly_limit().cents(),
        savings_goal_minor: profile.savings_goal().cents(),
        updated_at: profile.updated_at,
    }
}

fn scope_view(usage: &ScopeUsage) -> ScopeView {
    ScopeView {
        spent_minor: usage.spent.cents(),
        limit_minor: usage.limit.cents(),
        remaining_minor: usage.remaining.cents(),
        percentage: usage.percentage,
    }
}

fn savings_view(savings: &SavingsProgress) -> SavingsView {
    SavingsView {
        actual_minor: savings.actual.cents(),
        goal_minor: savings.goal.cents(),
        remaining_minor: savings.remaining.cents(),
        percentage: savings.percentage,
    }
}

fn category_views(
    alerts: &BTreeMap<Category, CategoryUsage>,
) -> BTreeMap<String, CategoryUsageView> {
    alerts
        .iter()
        .map(|(category, usage)| {
            let view = CategoryUsageView {
                limit_minor: usage.limit.cents(),
                spent_minor: usage.spent.cents(),
                remaining_minor: usage.remaining.cents(),
                percentage: usage.percentage,
                status: usage.status.as_str().to_string(),
            };
            (category.as_str().to_string(), view)
        })
        .collect()
}

fn analysis_response(snapshot: &AnalysisSnapshot) -> AnalysisResponse {
    AnalysisResponse {
        limits: snapshot.limits.as_ref().map(limits_view),
        monthly: MonthlyView {
            total_spent_minor: snapshot.monthly.total_spent.cents(),
            total_income_minor: snapshot.monthly.total_income.cents(),
            budget_minor: snapshot.monthly.budget.cents(),
            remaining_minor: snapshot.monthly.remaining.cents(),
            percentage: snapshot.monthly.percentage,
        },
        weekly: scope_view(&snapshot.weekly),
        daily: scope_view(&snapshot.daily),
        savings: savings_view(&snapshot.savings),
        category_alerts: category_views(&snapshot.category_alerts),
        category_spending: snapshot
            .category_spending
            .iter()
            .map(|(category, spent)| (category.as_str().to_string(), spent.cents()))
            .collect(),
    }
}

fn progress_response(snapshot: &AnalysisSnapshot) -> ProgressResponse {
    ProgressResponse {
        monthly: ScopeView {
            spent_minor: snapshot.monthly.total_spent.cents(),
            limit_minor: snapshot.monthly.budget.cents(),
            remaining_minor: snapshot.monthly.remaining.cents(),
            percentage: snapshot.monthly.percentage,
        },
        weekly: scope_view(&snapshot.weekly),
        daily: scope_view(&snapshot.daily),
        savings: savings_view(&snapshot.savings),
        categories: category_views(&snapshot.category_alerts),
    }
}

pub async fn get(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AnalysisResponse>, ServerError> {
    let snapshot = state
        .engine
        .analyze(&user.username, Utc::now())
        .await
        .map_err(|err| {
            tracing::error!(username = %user.username, "failed to analyze limits: {err}");
            ServerError::Internal("failed to fetch limits")
        })?;

    Ok(Json(analysis_response(&snapshot)))
}

pub async fn progress(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<ProgressResponse>, ServerError> {
    let snapshot = state
        .engine
        .analyze(&user.username, Utc::now())
        .await
        .map_err(|err| {
            tracing::error!(username = %user.username, "failed to analyze progress: {err}");
            ServerError::Internal("failed to fetch progress")
        })?;

    Ok(Json(progress_response(&snapshot)))
}

pub async fn update(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<LimitsUpdate>,
) -> Result<Json<LimitsResponse>, ServerError> {
    let category_limits = payload
        .category_limits
        .map(|limits| {
            limits
                .into_iter()
                .map(|(category, cents)| {
                    Category::try_from(category.as_str())
                        .map(|category| (category, MoneyCents::new(cents)))
                })
                .collect::<Result<BTreeMap<_, _>, _>>()
        })
        .transpose()?;

    let update = LimitUpdate {
        category_limits,
        monthly_budget: payload.monthly_budget_minor.map(MoneyCents::new),
        daily_limit: payload.daily_limit_minor.map(MoneyCents::new),
        weekly_limit: payload.weekly_limit_minor.map(MoneyCents::new),
        savings_goal: payload.savings_goal_minor.map(MoneyCents::new),
    };
    let profile = state.engine.update_limits(&user.username, update).await?;

    Ok(Json(LimitsResponse {
        message: "Limits updated successfully".to_string(),
        limits: limits_view(&profile),
    }))
}

pub async fn set_category(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<CategoryLimitSet>,
) -> Result<Json<LimitsResponse>, ServerError> {
    let category = Category::try_from(payload.category.as_str())?;
    let profile = state
        .engine
        .set_category_limit(&user.username, category, MoneyCents::new(payload.amount_minor))
        .await?;

    Ok(Json(LimitsResponse {
        message: format!("{category} limit updated successfully"),
        limits: limits_view(&profile),
    }))
}

pub async fn reset(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<LimitsResponse>, ServerError> {
    let profile = state.engine.reset_limits(&user.username).await?;

    Ok(Json(LimitsResponse {
        message: "All limits reset successfully".to_string(),
        limits: limits_view(&profile),
    }))
}
