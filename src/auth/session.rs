use std::time::Duration;

use axum::{
    extract::FromRef,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tower_sessions::cookie::{Cookie, SameSite};
use tracing::{debug, error};
use uuid::Uuid;

use crate::{config::SessionConfig, state::AppState};

pub const COOKIE_NAME: &str = "session";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashLevel::Success => "success",
            FlashLevel::Info => "info",
            FlashLevel::Warning => "warning",
            FlashLevel::Error => "error",
        }
    }
}

/// One-shot notification shown on the next rendered page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
    pub username: String,
}

/// Per-request view of the client-held session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub identity: Option<Identity>,
    /// Moment of the latest interruption recorded in this login session.
    pub checkpoint: Option<OffsetDateTime>,
    pub flash: Option<Flash>,
}

impl Session {
    /// Fresh session for a user who just logged in.
    pub fn logged_in(user_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            identity: Some(Identity {
                user_id,
                username: username.into(),
            }),
            checkpoint: None,
            flash: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    pub fn with_flash(mut self, level: FlashLevel, message: impl Into<String>) -> Self {
        self.flash = Some(Flash {
            level,
            message: message.into(),
        });
        self
    }

    pub fn take_flash(&mut self) -> Option<Flash> {
        self.flash.take()
    }

    pub fn mark_checkpoint(&mut self, at: OffsetDateTime) {
        self.checkpoint = Some(at);
    }
}

/// Signed token payload carried in the session cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(default)]
    pub sub: Option<Uuid>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub checkpoint: Option<i64>, // unix nanoseconds
    #[serde(default)]
    pub flash: Option<Flash>,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct SessionKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
    pub ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::new(&state.config.session)
    }
}

impl SessionKeys {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: Duration::from_secs(config.ttl_minutes.max(1) as u64 * 60),
        }
    }

    pub fn sign(&self, session: &Session) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = SessionClaims {
            sub: session.identity.as_ref().map(|i| i.user_id),
            username: session.identity.as_ref().map(|i| i.username.clone()),
            checkpoint: session
                .checkpoint
                .map(|at| i64::try_from(at.unix_timestamp_nanos()))
                .transpose()?,
            flash: session.flash.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Session> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)?.claims;

        let identity = match (claims.sub, claims.username) {
            (Some(user_id), Some(username)) => Some(Identity { user_id, username }),
            _ => None,
        };
        let checkpoint = claims
            .checkpoint
            .map(|nanos| OffsetDateTime::from_unix_timestamp_nanos(i128::from(nanos)))
            .transpose()?;
        debug!(authenticated = identity.is_some(), "session verified");
        Ok(Session {
            identity,
            checkpoint,
            flash: claims.flash,
        })
    }

    /// Decodes the session cookie from request headers. A missing, tampered
    /// or expired cookie yields an empty session.
    pub fn from_headers(&self, headers: &HeaderMap) -> Session {
        let Some(token) = session_token(headers) else {
            return Session::default();
        };
        match self.verify(&token) {
            Ok(session) => session,
            Err(e) => {
                debug!(error = %e, "discarding unreadable session cookie");
                Session::default()
            }
        }
    }

    pub fn cookie(&self, session: &Session) -> anyhow::Result<HeaderValue> {
        let cookie = Cookie::build((COOKIE_NAME, self.sign(session)?))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(TimeDuration::seconds(self.ttl.as_secs() as i64))
            .build();
        Ok(HeaderValue::from_str(&cookie.to_string())?)
    }

    /// Attaches `session` as the new cookie to `body`.
    pub fn respond(&self, session: &Session, body: impl IntoResponse) -> Response {
        match self.cookie(session) {
            Ok(cookie) => ([(header::SET_COOKIE, cookie)], body).into_response(),
            Err(e) => {
                error!(error = %e, "session sign failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Session error").into_response()
            }
        }
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == COOKIE_NAME)
        .map(|c| c.value_trimmed().to_string())
}
