use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row as stored: the timestamp is kept as integer nanoseconds so that
/// `ORDER BY` sorts chronologically.
#[derive(Debug, FromRow)]
pub struct AttemptRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub site_name: String,
    pub roast_given: String,
    pub task_entered: String,
    pub timestamp_ns: i64,
}

/// One recorded interruption on a blocked site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub site_name: String,
    pub roast_given: String,
    pub task_entered: String,
    pub timestamp: OffsetDateTime,
}

impl TryFrom<AttemptRow> for Attempt {
    type Error = time::error::ComponentRange;

    fn try_from(r: AttemptRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            site_name: r.site_name,
            roast_given: r.roast_given,
            task_entered: r.task_entered,
            timestamp: OffsetDateTime::from_unix_timestamp_nanos(i128::from(r.timestamp_ns))?,
        })
    }
}
