use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::{dto::PublicUser, extractors::AuthUser, repo_types::User},
    error::AppError,
    state::AppState,
    users::dto::ReminderStatus,
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/profile", get(get_profile))
        .route("/users/reminders/status", get(get_reminder_status))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_reminder_status(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ReminderStatus>, AppError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("User not found"))?;

    let days_remaining = user
        .next_checkup_date
        .map(|next| (next - OffsetDateTime::now_utc()).whole_days());

    Ok(Json(ReminderStatus {
        next_checkup_date: user.next_checkup_date,
        days_remaining,
        reminder_enabled: true,
    }))
}
