mod dto;
pub mod handlers;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

/// Shown on every block page.
pub const ROAST_LINE: &str = "you think your goals finish themselves while you doom scroll?";

pub fn router() -> Router<AppState> {
    handlers::block_routes()
}
