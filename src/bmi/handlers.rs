use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    bmi::{
        dto::{BmiRequest, BmiResult, LatestBmi},
        repo::BmiRecord,
        services::{category_for, compute_bmi, health_tip_for, recommended_range},
    },
    error::AppError,
    state::AppState,
};

pub fn bmi_routes() -> Router<AppState> {
    Router::new()
        .route("/bmi/calculate", post(calculate))
        .route("/bmi/latest", get(latest))
}

#[instrument(skip(state))]
pub async fn calculate(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<BmiRequest>,
) -> Result<Json<BmiResult>, AppError> {
    if payload.height_cm <= 0.0 || payload.weight_kg <= 0.0 {
        return Err(AppError::bad_request(
            "height_cm and weight_kg must be positive",
        ));
    }

    let bmi = compute_bmi(payload.height_cm, payload.weight_kg);
    let category = category_for(bmi);

    BmiRecord::create(
        &state.db,
        user_id,
        payload.height_cm,
        payload.weight_kg,
        bmi,
        category,
    )
    .await?;

    info!(user_id = %user_id, bmi, category, "bmi recorded");
    Ok(Json(BmiResult {
        bmi,
        category: category.into(),
        recommended_range: recommended_range(payload.height_cm),
        health_tip: health_tip_for(category).into(),
    }))
}

#[instrument(skip(state))]
pub async fn latest(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Option<LatestBmi>>, AppError> {
    let record = match BmiRecord::latest_for_user(&state.db, user_id).await? {
        Some(r) => r,
        None => return Ok(Json(None)),
    };

    Ok(Json(Some(LatestBmi {
        bmi: record.bmi,
        category: record.category,
        height_cm: record.height_cm,
        weight_kg: record.weight_kg,
        recommended_range: recommended_range(record.height_cm),
        created_at: record.created_at,
    })))
}
