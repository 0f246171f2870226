use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Immutable BMI measurement; one row per calculation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BmiRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub bmi: f64,
    pub category: String,
    pub created_at: OffsetDateTime,
}

impl BmiRecord {
    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        height_cm: f64,
        weight_kg: f64,
        bmi: f64,
        category: &str,
    ) -> anyhow::Result<BmiRecord> {
        let row = sqlx::query_as::<_, BmiRecord>(
            r#"
            INSERT INTO bmi_records (user_id, height_cm, weight_kg, bmi, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, height_cm, weight_kg, bmi, category, created_at
            "#,
        )
        .bind(user_id)
        .bind(height_cm)
        .bind(weight_kg)
        .bind(bmi)
        .bind(category)
        .fetch_one(db)
        .await?;
        Ok(row)
    }

    pub async fn latest_for_user(db: &PgPool, user_id: Uuid) -> anyhow::Result<Option<BmiRecord>> {
        let row = sqlx::query_as::<_, BmiRecord>(
            r#"
            SELECT id, user_id, height_cm, weight_kg, bmi, category, created_at
            FROM bmi_records
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(row)
    }
}
