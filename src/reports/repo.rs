use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

const REPORT_COLUMNS: &str =
    "id, user_id, report_type, upload_date, extracted_data, analysis, pdf_key";

/// Persisted lab report: one uploaded document plus its extracted parameters
/// and analysis. Immutable after insert; owner-scoped reads and deletes only.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub user_id: Uuid,
    pub report_type: String,
    #[serde(with = "time::serde::rfc3339")]
    pub upload_date: OffsetDateTime,
    pub extracted_data: serde_json::Value,
    pub analysis: serde_json::Value,
    pub pdf_key: String,
}

impl Report {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        report_type: &str,
        extracted_data: serde_json::Value,
        analysis: serde_json::Value,
        pdf_key: &str,
    ) -> anyhow::Result<Report> {
        let row = sqlx::query_as::<_, Report>(&format!(
            r#"
            INSERT INTO reports (user_id, report_type, extracted_data, analysis, pdf_key)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(report_type)
        .bind(extracted_data)
        .bind(analysis)
        .bind(pdf_key)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    /// Newest first, for the list view.
    pub async fn list_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Report>> {
        let rows = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE user_id = $1
            ORDER BY upload_date DESC
            LIMIT 100
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    /// Oldest first, for trend aggregation.
    pub async fn list_for_user_asc(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<Report>> {
        let rows = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE user_id = $1
            ORDER BY upload_date ASC
            LIMIT 100
            "#
        ))
        .bind(user_id)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn find_for_user(
        db: &PgPool,
        user_id: Uuid,
        report_id: Uuid,
    ) -> anyhow::Result<Option<Report>> {
        let row = sqlx::query_as::<_, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS}
            FROM reports
            WHERE id = $1 AND user_id = $2
            "#
        ))
        .bind(report_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }

    /// Owner-scoped delete; returns whether a row was removed.
    pub async fn delete_for_user(
        db: &PgPool,
        user_id: Uuid,
        report_id: Uuid,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1 AND user_id = $2")
            .bind(report_id)
            .bind(user_id)
            .execute(db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
