use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Debug, Deserialize)]
pub struct BmiRequest {
    pub height_cm: f64,
    pub weight_kg: f64,
}

#[derive(Debug, Serialize)]
pub struct BmiResult {
    pub bmi: f64,
    pub category: String,
    pub recommended_range: String,
    pub health_tip: String,
}

#[derive(Debug, Serialize)]
pub struct LatestBmi {
    pub bmi: f64,
    pub category: String,
    pub height_cm: f64,
    pub weight_kg: f64,
    pub recommended_range: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
