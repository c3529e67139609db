// Timestamp helpers for activity and staleness displays

use chrono::{Local, TimeZone};
use serde::Serialize;

const MINUTE: i64 = 60;
const HOUR: i64 = 3600;
const DAY: i64 = 86_400;
const WEEK: i64 = 604_800;

/// Current Unix timestamp
pub fn now_ts() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Format timestamp for display
pub fn format_timestamp(ts: i64) -> String {
    match Local.timestamp_opt(ts, 0).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ts.to_string(),
    }
}

/// Format a timestamp relative to `now` ("Just now", "5m ago", "3h ago", "2d ago", "4w ago")
pub fn format_time_ago(ts: i64, now: i64) -> String {
    let diff = now - ts;
    if diff < MINUTE {
        "Just now".to_string()
    } else if diff < HOUR {
        format!("{}m ago", diff / MINUTE)
    } else if diff < DAY {
        format!("{}h ago", diff / HOUR)
    } else if diff < WEEK {
        format!("{}d ago", diff / DAY)
    } else {
        format!("{}w ago", diff / WEEK)
    }
}

/// Recency badge derived from a lead's last update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActivityBadge {
    /// Touched within the last day
    Active,
    /// Touched within the last week
    Idle,
    Stalled,
}

impl ActivityBadge {
    pub fn from_updated(updated_ts: i64, now: i64) -> Self {
        let age = (now - updated_ts).abs();
        if age < DAY {
            ActivityBadge::Active
        } else if age < WEEK {
            ActivityBadge::Idle
        } else {
            ActivityBadge::Stalled
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityBadge::Active => "Active",
            ActivityBadge::Idle => "Idle",
            ActivityBadge::Stalled => "Stalled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_time_ago() {
        let now = 1_700_000_000;
        assert_eq!(format_time_ago(now - 10, now), "Just now");
        assert_eq!(format_time_ago(now + 30, now), "Just now");
        assert_eq!(format_time_ago(now - 5 * MINUTE, now), "5m ago");
        assert_eq!(format_time_ago(now - 3 * HOUR - 10, now), "3h ago");
        assert_eq!(format_time_ago(now - 2 * DAY, now), "2d ago");
        assert_eq!(format_time_ago(now - 15 * DAY, now), "2w ago");
    }

    #[test]
    fn test_activity_badge_thresholds() {
        let now = 1_700_000_000;
        assert_eq!(ActivityBadge::from_updated(now - HOUR, now), ActivityBadge::Active);
        assert_eq!(ActivityBadge::from_updated(now - DAY, now), ActivityBadge::Idle);
        assert_eq!(ActivityBadge::from_updated(now - 6 * DAY, now), ActivityBadge::Idle);
        assert_eq!(ActivityBadge::from_updated(now - WEEK, now), ActivityBadge::Stalled);
        assert_eq!(ActivityBadge::Stalled.as_str(), "Stalled");
    }
}
