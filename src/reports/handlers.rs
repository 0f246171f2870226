use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde_json::Value;
use std::collections::BTreeMap;
use time::{Duration, OffsetDateTime};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{extractors::AuthUser, repo_types::User},
    error::AppError,
    reports::{
        analysis::AnalysisOutcome,
        dto::DeleteResponse,
        pdf,
        repo::Report,
        trends::{aggregate_trends, TrendSeries},
    },
    state::AppState,
};

/// Reminder interval applied after every ingested report.
const CHECKUP_INTERVAL_DAYS: i64 = 90;

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/trends", get(get_trends))
        .route("/reports/", get(list_reports))
        .route("/reports/:id", get(get_report).delete(delete_report))
        .route("/reports/:id/download", get(download_report))
        .route("/reports/upload", post(upload_report))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

/// Full ingestion pipeline: store blob, extract text, analyze, normalize,
/// persist. Analysis failures degrade the content; they never fail the
/// request. Storage and database failures do.
#[instrument(skip(state, mp))]
pub async fn upload_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    mut mp: Multipart,
) -> Result<Json<Report>, AppError> {
    let mut file_name = String::from("report.pdf");
    let mut content: Option<Bytes> = None;

    while let Ok(Some(field)) = mp.next_field().await {
        if field.name() == Some("file") {
            if let Some(name) = field.file_name() {
                file_name = name.to_string();
            }
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::bad_request(format!("unreadable upload: {e}")))?;
            content = Some(data);
        }
    }

    let content = match content {
        Some(b) if !b.is_empty() => b,
        _ => return Err(AppError::bad_request("file field is required")),
    };

    let now = OffsetDateTime::now_utc();
    let pdf_key = format!("{}/{}_{}", user_id, now.unix_timestamp(), file_name);

    // Blob write failure is fatal: no report row without its source file.
    state
        .storage
        .put_object(&pdf_key, content.clone(), "application/pdf")
        .await?;
    info!(user_id = %user_id, key = %pdf_key, "report file stored");

    let text = pdf::extract_text(&content);
    if text.trim().is_empty() {
        warn!(user_id = %user_id, "upload rejected: no extractable text");
        return Err(AppError::bad_request(
            "Could not extract text from the uploaded PDF. \
             Please ensure it is a valid text-based PDF report.",
        ));
    }

    let outcome = state.analysis.analyze_document(&content).await;
    if let AnalysisOutcome::Degraded { reason, .. } = &outcome {
        warn!(user_id = %user_id, reason = ?reason, "storing report with fallback analysis");
    }
    let (extracted_data, analysis) = outcome.into_parts();

    let report = Report::create(
        &state.db,
        user_id,
        "General Health",
        Value::Object(extracted_data),
        serde_json::to_value(&analysis).map_err(anyhow::Error::from)?,
        &pdf_key,
    )
    .await?;

    // Best-effort second write; the report is already committed.
    let next_checkup = now + Duration::days(CHECKUP_INTERVAL_DAYS);
    if let Err(e) = User::touch_report_dates(&state.db, user_id, now, next_checkup).await {
        error!(error = %e, user_id = %user_id, "failed to update checkup reminder dates");
    }

    info!(user_id = %user_id, report_id = %report.id, "report ingested");
    Ok(Json(report))
}

#[instrument(skip(state))]
pub async fn list_reports(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<Report>>, AppError> {
    let reports = Report::list_for_user(&state.db, user_id).await?;
    Ok(Json(reports))
}

#[instrument(skip(state))]
pub async fn get_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, AppError> {
    let report = Report::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Report not found"))?;
    Ok(Json(report))
}

/// 302 to a short-lived presigned URL for the original document.
#[instrument(skip(state))]
pub async fn download_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, AppError> {
    let report = Report::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Report not found"))?;

    let url = state.storage.presign_get(&report.pdf_key, 600).await?;
    Ok(Redirect::temporary(&url))
}

#[instrument(skip(state))]
pub async fn delete_report(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, AppError> {
    let report = Report::find_for_user(&state.db, user_id, id)
        .await?
        .ok_or_else(|| AppError::not_found("Report not found"))?;

    if !Report::delete_for_user(&state.db, user_id, id).await? {
        return Err(AppError::not_found("Report not found"));
    }

    // The row is gone; an orphaned blob is only worth a log line.
    if let Err(e) = state.storage.delete_object(&report.pdf_key).await {
        warn!(error = %e, key = %report.pdf_key, "failed to delete report blob");
    }

    info!(user_id = %user_id, report_id = %id, "report deleted");
    Ok(Json(DeleteResponse { status: "success" }))
}

#[instrument(skip(state))]
pub async fn get_trends(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<BTreeMap<String, TrendSeries>>, AppError> {
    let reports = Report::list_for_user_asc(&state.db, user_id).await?;
    Ok(Json(aggregate_trends(&reports)))
}
