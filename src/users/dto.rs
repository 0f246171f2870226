use serde::Serialize;
use time::OffsetDateTime;

/// Checkup reminder derived from the user's denormalized report dates.
#[derive(Debug, Serialize)]
pub struct ReminderStatus {
    #[serde(with = "time::serde::rfc3339::option")]
    pub next_checkup_date: Option<OffsetDateTime>,
    pub days_remaining: Option<i64>,
    pub reminder_enabled: bool,
}
