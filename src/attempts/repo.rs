use anyhow::Context;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::attempts::repo_types::{Attempt, AttemptRow};

impl Attempt {
    /// Stores a new attempt stamped with the server clock.
    pub async fn record(
        db: &SqlitePool,
        user_id: Uuid,
        site_name: &str,
        roast_given: &str,
        task_entered: &str,
    ) -> anyhow::Result<Attempt> {
        let row = sqlx::query_as::<_, AttemptRow>(
            r#"
            INSERT INTO attempts (id, user_id, site_name, roast_given, task_entered, timestamp_ns)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING id, user_id, site_name, roast_given, task_entered, timestamp_ns
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(site_name)
        .bind(roast_given)
        .bind(task_entered)
        .bind(OffsetDateTime::now_utc().unix_timestamp_nanos() as i64)
        .fetch_one(db)
        .await
        .context("insert attempt")?;
        Ok(Attempt::try_from(row)?)
    }

    /// Every attempt of `user_id`, newest first. Not paginated.
    pub async fn list_for_user(db: &SqlitePool, user_id: Uuid) -> anyhow::Result<Vec<Attempt>> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT id, user_id, site_name, roast_given, task_entered, timestamp_ns
            FROM attempts
            WHERE user_id = ?
            ORDER BY timestamp_ns DESC, rowid DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
        .context("select attempts for user")?;
        rows.into_iter()
            .map(|r| Attempt::try_from(r).map_err(anyhow::Error::from))
            .collect()
    }
}
