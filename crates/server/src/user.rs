//! Alert settings of the authenticated user

use api_types::user::{AlertSettings, AlertSettingsUpdate};
use axum::{Extension, Json, extract::State};
use engine::{NotificationPreferences, PreferencesUpdate, timezone, users};

use crate::{ServerError, server::ServerState};

fn settings_view(preferences: NotificationPreferences) -> AlertSettings {
    AlertSettings {
        utc_offset_minutes: timezone::offset_minutes(preferences.country.as_deref()),
        email: preferences.email,
        country: preferences.country,
        telegram_chat_id: preferences.telegram_chat_id,
        email_alerts_enabled: preferences.email_alerts_enabled,
        telegram_alerts_enabled: preferences.telegram_alerts_enabled,
    }
}

pub async fn alerts(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
) -> Result<Json<AlertSettings>, ServerError> {
    let preferences = state.engine.notification_preferences(&user.username).await?;
    Ok(Json(settings_view(preferences)))
}

pub async fn update_alerts(
    Extension(user): Extension<users::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AlertSettingsUpdate>,
) -> Result<Json<AlertSettings>, ServerError> {
    let update = PreferencesUpdate {
        email: payload.email,
        country: payload.country,
        telegram_chat_id: payload.telegram_chat_id,
        email_alerts_enabled: payload.email_alerts_enabled,
        telegram_alerts_enabled: payload.telegram_alerts_enabled,
    };
    let preferences = state
        .engine
        .update_preferences(&user.username, update)
        .await?;

    tracing::info!(username = %user.username, "alert settings updated");
    Ok(Json(settings_view(preferences)))
}
