use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use tracing::{debug, error, instrument};

use crate::{
    attempts::repo_types::Attempt,
    auth::{AuthUser, SessionKeys},
    dashboard::stats::build_stats,
    state::AppState,
    views,
};

pub fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[instrument(skip(state, user), fields(user_id = %user.user_id))]
pub async fn dashboard(State(state): State<AppState>, user: AuthUser) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let attempts = match Attempt::list_for_user(&state.db, user.user_id).await {
        Ok(attempts) => attempts,
        Err(e) => {
            error!(error = %e, "list attempts failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Could not load your attempts",
            )
                .into_response();
        }
    };

    let mut session = user.session;
    let stats = build_stats(&attempts, session.checkpoint);
    debug!(
        attempts = attempts.len(),
        streak = stats.streak,
        focus_seconds = stats.focus_seconds,
        "dashboard stats built"
    );

    let flash = session.take_flash();
    keys.respond(
        &session,
        Html(views::dashboard_page(
            &user.username,
            flash.as_ref(),
            &stats,
            &attempts,
        )),
    )
}
