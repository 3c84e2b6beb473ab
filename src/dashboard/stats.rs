use std::collections::{HashMap, HashSet};

use serde::Serialize;
use time::{Date, OffsetDateTime, UtcOffset};

use crate::attempts::repo_types::Attempt;

/// Upper bound on the streak loop. This is a safety valve; it is not a
/// product rule, and longer streaks are reported as this value.
pub const STREAK_CAP: u32 = 730;

/// Label of the placeholder series entry shown when there are no attempts.
pub const NO_DATA_LABEL: &str = "No Data";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCount {
    pub site: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    /// Never empty: holds a single `NO_DATA_LABEL`/0 entry when `has_data` is false.
    pub site_counts: Vec<SiteCount>,
    pub has_data: bool,
    pub streak: u32,
    pub focus_seconds: i64,
}

pub fn build_stats(attempts: &[Attempt], checkpoint: Option<OffsetDateTime>) -> DashboardStats {
    build_stats_at(attempts, OffsetDateTime::now_utc(), checkpoint)
}

/// Derives the dashboard figures from a user's attempts. Days are UTC days.
pub fn build_stats_at(
    attempts: &[Attempt],
    now: OffsetDateTime,
    checkpoint: Option<OffsetDateTime>,
) -> DashboardStats {
    let mut site_counts = site_counts(attempts);
    let has_data = !site_counts.is_empty();
    if !has_data {
        site_counts.push(SiteCount {
            site: NO_DATA_LABEL.to_string(),
            count: 0,
        });
    }

    DashboardStats {
        site_counts,
        has_data,
        streak: streak(attempts, utc_date(now)),
        focus_seconds: focus_seconds(attempts, now, checkpoint),
    }
}

/// Counts per exact site name, in order of first appearance.
fn site_counts(attempts: &[Attempt]) -> Vec<SiteCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<SiteCount> = Vec::new();
    for attempt in attempts.iter().filter(|a| !a.site_name.is_empty()) {
        match index.get(attempt.site_name.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(&attempt.site_name, counts.len());
                counts.push(SiteCount {
                    site: attempt.site_name.clone(),
                    count: 1,
                });
            }
        }
    }
    counts
}

/// Consecutive days with at least one attempt, ending today. No attempt
/// today means no streak, however long the run before it.
fn streak(attempts: &[Attempt], today: Date) -> u32 {
    let days: HashSet<Date> = attempts.iter().map(|a| utc_date(a.timestamp)).collect();

    let mut streak = 0;
    let mut day = Some(today);
    while let Some(current) = day {
        if streak >= STREAK_CAP || !days.contains(&current) {
            break;
        }
        streak += 1;
        day = current.previous_day();
    }
    streak
}

/// Seconds since the session checkpoint, or since the latest attempt when
/// the session has none.
fn focus_seconds(
    attempts: &[Attempt],
    now: OffsetDateTime,
    checkpoint: Option<OffsetDateTime>,
) -> i64 {
    let since = checkpoint.or_else(|| attempts.iter().map(|a| a.timestamp).max());
    match since {
        Some(start) => (now - start).whole_seconds().max(0),
        None => 0,
    }
}

fn utc_date(at: OffsetDateTime) -> Date {
    at.to_offset(UtcOffset::UTC).date()
}
