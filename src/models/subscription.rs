use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// Subscription document, keyed by uid in storage.
/// One document per user; `ends_at` is the sole entitlement signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRecord {
    pub user_id: String,
    /// Admin who created or last renewed the subscription
    pub admin_id: Option<String>,
    pub educational_level_id: Option<String>,
    // Denormalized from the user document for the admin listing
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub starts_at: i64,
    pub ends_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl SubscriptionRecord {
    /// A subscription is live while its expiry lies strictly in the future.
    /// Expired documents stay in the store; they are inert, not deleted.
    pub fn is_live(&self, now: i64) -> bool {
        self.ends_at.map_or(false, |ends_at| ends_at > now)
    }
}

/// Expiry for a subscription granted at `start` for `months` calendar months.
/// Calendar arithmetic: the day of month is preserved (June 10 + 3 months is
/// September 10), clamped at the end of shorter months.
pub fn expiry_after_months(start: DateTime<Utc>, months: u32) -> Option<DateTime<Utc>> {
    start.checked_add_months(Months::new(months))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sub(level: Option<&str>, ends_at: Option<i64>) -> SubscriptionRecord {
        SubscriptionRecord {
            user_id: "user-1".to_string(),
            admin_id: None,
            educational_level_id: level.map(str::to_string),
            user_name: None,
            user_email: None,
            user_phone: None,
            starts_at: 0,
            ends_at,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_is_live() {
        let now = 1_000_000;
        assert!(sub(Some("prep"), Some(now + 1)).is_live(now));
        assert!(!sub(Some("prep"), Some(now)).is_live(now));
        assert!(!sub(Some("prep"), Some(now - 1)).is_live(now));
        assert!(!sub(Some("prep"), None).is_live(now));
    }

    #[test]
    fn test_expiry_preserves_day_of_month() {
        // June 10 + 3 months -> September 10
        let start = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let ends = expiry_after_months(start, 3).unwrap();
        assert_eq!(ends, Utc.with_ymd_and_hms(2025, 9, 10, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_expiry_clamps_short_months() {
        // January 31 + 1 month -> February 28 (non-leap year)
        let start = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        let ends = expiry_after_months(start, 1).unwrap();
        assert_eq!(ends, Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_expiry_crosses_year_boundary() {
        let start = Utc.with_ymd_and_hms(2025, 11, 15, 8, 30, 0).unwrap();
        let ends = expiry_after_months(start, 3).unwrap();
        assert_eq!(ends, Utc.with_ymd_and_hms(2026, 2, 15, 8, 30, 0).unwrap());
    }
}
