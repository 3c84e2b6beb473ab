use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{debug, info};

use crate::auth::{
    password::{hash_password, verify_password},
    repo_types::User,
};

/// Demo accounts created by `init-db`.
pub const DEMO_USERS: [(&str, &str); 2] = [("testuser", "password123"), ("admin", "admin")];

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username and password are required")]
    InvalidInput,
    #[error("username is already taken")]
    DuplicateUsername,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Creates an account. The password is stored only as an Argon2 hash.
pub async fn register(db: &SqlitePool, username: &str, password: &str) -> Result<User, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::InvalidInput);
    }

    if User::find_by_username(db, username).await?.is_some() {
        return Err(AuthError::DuplicateUsername);
    }

    let hash = hash_password(password)?;
    match User::create(db, username, &hash).await {
        Ok(user) => Ok(user),
        // lost a race with a concurrent registration of the same name
        Err(e) if is_unique_violation(&e) => Err(AuthError::DuplicateUsername),
        Err(e) => Err(AuthError::Store(e)),
    }
}

/// Returns the account only when the password matches. Unknown usernames and
/// wrong passwords are indistinguishable to the caller.
pub async fn authenticate(
    db: &SqlitePool,
    username: &str,
    password: &str,
) -> Result<Option<User>, AuthError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Ok(None);
    }

    let Some(user) = User::find_by_username(db, username).await? else {
        debug!("login for unknown username");
        return Ok(None);
    };

    if verify_password(password, &user.password_hash)? {
        Ok(Some(user))
    } else {
        debug!(user_id = %user.id, "login with wrong password");
        Ok(None)
    }
}

/// Ensures the demo accounts exist and returns the usernames that were created.
pub async fn seed_demo_users(db: &SqlitePool) -> anyhow::Result<Vec<String>> {
    let mut created = Vec::new();
    for (username, password) in DEMO_USERS {
        if User::find_by_username(db, username).await?.is_some() {
            continue;
        }
        let user = User::create(db, username, &hash_password(password)?).await?;
        info!(user_id = %user.id, username, "demo user created");
        created.push(user.username);
    }
    Ok(created)
}

fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db_err)) if db_err.is_unique_violation()
    )
}
