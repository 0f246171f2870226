use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_report_date: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub next_checkup_date: Option<OffsetDateTime>,
}

impl From<crate::auth::repo_types::User> for PublicUser {
    fn from(u: crate::auth::repo_types::User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            last_report_date: u.last_report_date,
            next_checkup_date: u.next_checkup_date,
        }
    }
}
