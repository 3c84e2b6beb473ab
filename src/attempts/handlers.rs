use axum::{
    extract::{FromRef, Path, State},
    response::{Html, Redirect, Response},
    routing::get,
    Form, Router,
};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::{error, info, instrument};

use crate::{
    attempts::{dto::TaskForm, repo_types::Attempt, ROAST_LINE},
    auth::{session::FlashLevel, AuthUser, SessionKeys},
    state::AppState,
    views,
};

/// RFC 3986 unreserved characters pass through, everything else is escaped.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub fn block_routes() -> Router<AppState> {
    Router::new().route("/block/:site_name", get(block_page).post(block_submit))
}

#[instrument(skip(keys, user), fields(user_id = %user.user_id))]
pub async fn block_page(
    State(keys): State<SessionKeys>,
    Path(site_name): Path<String>,
    user: AuthUser,
) -> Response {
    let mut session = user.session;
    let flash = session.take_flash();
    keys.respond(
        &session,
        Html(views::block_page(&site_name, ROAST_LINE, flash.as_ref())),
    )
}

/// Records the interruption and restarts the focus timer.
#[instrument(skip(state, user, form), fields(user_id = %user.user_id))]
pub async fn block_submit(
    State(state): State<AppState>,
    Path(site_name): Path<String>,
    user: AuthUser,
    Form(form): Form<TaskForm>,
) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let mut session = user.session;

    match Attempt::record(&state.db, user.user_id, &site_name, ROAST_LINE, &form.task).await {
        Ok(attempt) => {
            info!(attempt_id = %attempt.id, site = %attempt.site_name, "attempt recorded");
            session.mark_checkpoint(attempt.timestamp);
            keys.respond(&session, Redirect::to("/dashboard"))
        }
        Err(e) => {
            error!(error = %e, "record attempt failed");
            let session = session.with_flash(
                FlashLevel::Error,
                "Could not save your task, please try again.",
            );
            // the Location header must stay ASCII; the path segment arrived decoded
            let back = format!("/block/{}", utf8_percent_encode(&site_name, PATH_SEGMENT));
            keys.respond(&session, Redirect::to(&back))
        }
    }
}
