use serde::Deserialize;

/// Signing parameters for the session cookie.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://instance/doomscroll.db?mode=rwc".into());
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        // PORT wins over APP_PORT so hosted platforms can inject it
        let port = std::env::var("PORT")
            .or_else(|_| std::env::var("APP_PORT"))
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()?
            .unwrap_or(5000);
        let session = SessionConfig {
            secret: std::env::var("SECRET_KEY").unwrap_or_else(|_| "dev_secret_key_123".into()),
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "doomscroll".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "doomscroll-users".into()),
            ttl_minutes: std::env::var("SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 7),
        };
        Ok(Self {
            database_url,
            host,
            port,
            session,
        })
    }

    /// Config backed by a private in-memory database.
    pub fn in_memory(secret: &str) -> Self {
        Self {
            database_url: "sqlite::memory:".into(),
            host: "127.0.0.1".into(),
            port: 0,
            session: SessionConfig {
                secret: secret.into(),
                issuer: "doomscroll".into(),
                audience: "doomscroll-users".into(),
                ttl_minutes: 60,
            },
        }
    }
}
