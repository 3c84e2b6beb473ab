use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{Redirect, Response},
};
use tracing::warn;
use uuid::Uuid;

use super::session::{FlashLevel, Session, SessionKeys};

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        Ok(keys.from_headers(&parts.headers))
    }
}

/// Authenticated caller. Handlers taking this never run without a logged-in
/// session; the request is redirected to `/login` instead.
pub struct AuthUser {
    pub user_id: Uuid,
    pub username: String,
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let session = keys.from_headers(&parts.headers);

        let Some(identity) = session.identity.clone() else {
            warn!(uri = %parts.uri, "unauthenticated request redirected to login");
            let session = session.with_flash(
                FlashLevel::Warning,
                "You must be logged in to access this page.",
            );
            return Err(keys.respond(&session, Redirect::to("/login")));
        };

        Ok(AuthUser {
            user_id: identity.user_id,
            username: identity.username,
            session,
        })
    }
}
