use axum::{
    extract::{FromRef, State},
    response::{Html, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        services::{authenticate, register, AuthError},
        session::{FlashLevel, Session, SessionKeys},
    },
    state::AppState,
    views,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/register", get(register_page).post(register_submit))
        .route("/login", get(login_page).post(login_submit))
        .route("/logout", get(logout))
}

pub async fn index(session: Session) -> Redirect {
    if session.is_authenticated() {
        Redirect::to("/dashboard")
    } else {
        Redirect::to("/login")
    }
}

pub async fn register_page(State(keys): State<SessionKeys>, mut session: Session) -> Response {
    let flash = session.take_flash();
    keys.respond(&session, Html(views::register_page(flash.as_ref())))
}

#[instrument(skip(state, session, form))]
pub async fn register_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let keys = SessionKeys::from_ref(&state);
    let (level, message, to) = match register(&state.db, &form.username, &form.password).await {
        Ok(user) => {
            info!(user_id = %user.id, username = %user.username, "user registered");
            (
                FlashLevel::Success,
                "Registration successful! Please log in.",
                "/login",
            )
        }
        Err(AuthError::InvalidInput) => {
            warn!("registration with missing fields");
            (
                FlashLevel::Error,
                "Username and password are required.",
                "/register",
            )
        }
        Err(AuthError::DuplicateUsername) => {
            warn!(username = %form.username.trim(), "username already taken");
            (
                FlashLevel::Error,
                "That username is already taken.",
                "/register",
            )
        }
        Err(AuthError::Store(e)) => {
            error!(error = %e, "register failed");
            (
                FlashLevel::Error,
                "Something went wrong, please try again.",
                "/register",
            )
        }
    };
    keys.respond(&session.with_flash(level, message), Redirect::to(to))
}

pub async fn login_page(State(keys): State<SessionKeys>, mut session: Session) -> Response {
    let flash = session.take_flash();
    keys.respond(&session, Html(views::login_page(flash.as_ref())))
}

#[instrument(skip(state, session, form))]
pub async fn login_submit(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let keys = SessionKeys::from_ref(&state);
    match authenticate(&state.db, &form.username, &form.password).await {
        Ok(Some(user)) => {
            info!(user_id = %user.id, username = %user.username, "user logged in");
            let session = Session::logged_in(user.id, user.username)
                .with_flash(FlashLevel::Success, "Login successful!");
            keys.respond(&session, Redirect::to("/dashboard"))
        }
        Ok(None) => {
            warn!("login rejected");
            let session = session.with_flash(FlashLevel::Error, "Invalid username or password.");
            keys.respond(&session, Redirect::to("/login"))
        }
        Err(e) => {
            error!(error = %e, "login failed");
            let session =
                session.with_flash(FlashLevel::Error, "Something went wrong, please try again.");
            keys.respond(&session, Redirect::to("/login"))
        }
    }
}

pub async fn logout(State(keys): State<SessionKeys>) -> Response {
    let session = Session::default().with_flash(FlashLevel::Info, "You have been logged out.");
    keys.respond(&session, Redirect::to("/login"))
}
