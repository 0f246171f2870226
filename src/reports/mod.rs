use crate::state::AppState;
use axum::Router;

pub mod analysis;
mod dto;
pub mod handlers;
pub mod normalize;
pub mod pdf;
pub mod repo;
pub mod trends;

pub fn router() -> Router<AppState> {
    handlers::report_routes()
}
