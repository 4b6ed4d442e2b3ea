//! Entitlement decisions: the subscription validator and the admin gate.
//!
//! Both checks fail closed: an absent identity, an absent document, or any
//! store error resolves to "denied", never to an exception or an ambiguous
//! "assume granted" state.

use chrono::Utc;

use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::extractors::Identity;
use crate::models::{RoleRecord, SubscriptionRecord};
use crate::AppState;

/// Outcome of a gated content fetch, exposed to the caller as exactly
/// one of three states.
#[derive(Debug)]
pub enum GatedAccess<T> {
    NotFound,
    NotEntitled,
    Entitled(T),
}

/// Decide whether a subscription document grants access to a level.
///
/// Pure and side-effect free; `now` is a Unix timestamp. Returns false when
/// the subscription is absent, has no level, is scoped to a different level,
/// has no expiry, or has expired. A subscription to level A never grants
/// access to level B.
pub fn subscription_grants(
    subscription: Option<&SubscriptionRecord>,
    level_id: Option<&str>,
    now: i64,
) -> bool {
    let Some(level_id) = level_id else {
        return false;
    };
    let Some(subscription) = subscription else {
        return false;
    };
    let Some(subscribed_level) = subscription.educational_level_id.as_deref() else {
        return false;
    };
    if subscribed_level != level_id {
        return false;
    }
    match subscription.ends_at {
        Some(ends_at) => ends_at > now,
        None => false,
    }
}

/// Decide whether a role document grants admin access.
/// Absent document and non-"admin" literals are treated identically.
pub fn role_grants_admin(role: Option<&RoleRecord>) -> bool {
    role.map_or(false, RoleRecord::grants_admin)
}

/// Subscription validator against the store.
///
/// Read-only and safe to call repeatedly; any lookup failure is logged and
/// resolved to false.
pub async fn is_entitled(
    state: &AppState,
    identity: Option<&Identity>,
    level_id: Option<&str>,
) -> bool {
    let Some(identity) = identity else {
        return false;
    };
    let Some(level_id) = level_id else {
        return false;
    };

    let db = state.db.clone();
    let uid = identity.uid.clone();
    let level_id = level_id.to_string();

    let outcome = tokio::task::spawn_blocking(move || -> Result<bool> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::SUBSCRIPTIONS)?;
        let subscription: Option<SubscriptionRecord> = table
            .get(uid.as_str())?
            .map(|bytes| db::decode(bytes.value()))
            .transpose()?;

        Ok(subscription_grants(
            subscription.as_ref(),
            Some(&level_id),
            Utc::now().timestamp(),
        ))
    })
    .await;

    match outcome {
        Ok(Ok(granted)) => granted,
        Ok(Err(e)) => {
            tracing::warn!("Subscription check failed closed: {}", e);
            false
        }
        Err(e) => {
            tracing::warn!("Subscription check task failed closed: {}", e);
            false
        }
    }
}

/// Admin gate against the store. Fails closed on any lookup error.
pub async fn is_admin(state: &AppState, identity: &Identity) -> bool {
    let db = state.db.clone();
    let uid = identity.uid.clone();

    let outcome = tokio::task::spawn_blocking(move || -> Result<bool> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::ROLES)?;
        let role: Option<RoleRecord> = table
            .get(uid.as_str())?
            .map(|bytes| db::decode(bytes.value()))
            .transpose()?;

        Ok(role_grants_admin(role.as_ref()))
    })
    .await;

    match outcome {
        Ok(Ok(granted)) => granted,
        Ok(Err(e)) => {
            tracing::warn!("Admin check failed closed: {}", e);
            false
        }
        Err(e) => {
            tracing::warn!("Admin check task failed closed: {}", e);
            false
        }
    }
}

/// Guard for management handlers: error out unless the caller is an admin
pub async fn require_admin(state: &AppState, identity: &Identity) -> Result<()> {
    if is_admin(state, identity).await {
        Ok(())
    } else {
        tracing::warn!("Admin access denied for user {}", identity.uid);
        Err(AppError::NotAdmin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOW: i64 = 1_750_000_000;

    fn subscription(level: Option<&str>, ends_at: Option<i64>) -> SubscriptionRecord {
        SubscriptionRecord {
            user_id: "user-1".to_string(),
            admin_id: Some("admin-1".to_string()),
            educational_level_id: level.map(str::to_string),
            user_name: None,
            user_email: None,
            user_phone: None,
            starts_at: NOW - 86_400,
            ends_at,
            created_at: NOW - 86_400,
            updated_at: NOW - 86_400,
        }
    }

    #[test]
    fn test_absent_level_denied() {
        let sub = subscription(Some("prep"), Some(NOW + 86_400));
        assert!(!subscription_grants(Some(&sub), None, NOW));
    }

    #[test]
    fn test_absent_subscription_denied() {
        assert!(!subscription_grants(None, Some("prep"), NOW));
    }

    #[test]
    fn test_subscription_without_level_denied() {
        let sub = subscription(None, Some(NOW + 86_400));
        assert!(!subscription_grants(Some(&sub), Some("prep"), NOW));
    }

    #[test]
    fn test_level_mismatch_denied_even_when_live() {
        // A subscription to level A never grants access to level B
        let sub = subscription(Some("prep"), Some(NOW + 86_400));
        assert!(!subscription_grants(Some(&sub), Some("secondary"), NOW));
    }

    #[test]
    fn test_missing_expiry_denied() {
        let sub = subscription(Some("prep"), None);
        assert!(!subscription_grants(Some(&sub), Some("prep"), NOW));
    }

    #[test]
    fn test_expired_yesterday_denied() {
        let sub = subscription(Some("prep"), Some(NOW - 86_400));
        assert!(!subscription_grants(Some(&sub), Some("prep"), NOW));
    }

    #[test]
    fn test_expiry_exactly_now_denied() {
        let sub = subscription(Some("prep"), Some(NOW));
        assert!(!subscription_grants(Some(&sub), Some("prep"), NOW));
    }

    #[test]
    fn test_live_match_granted() {
        // Live next month for "prep": granted for "prep", denied for "secondary"
        let sub = subscription(Some("prep"), Some(NOW + 30 * 86_400));
        assert!(subscription_grants(Some(&sub), Some("prep"), NOW));
        assert!(!subscription_grants(Some(&sub), Some("secondary"), NOW));
    }

    #[test]
    fn test_idempotent_with_no_intervening_write() {
        let sub = subscription(Some("prep"), Some(NOW + 1));
        let first = subscription_grants(Some(&sub), Some("prep"), NOW);
        let second = subscription_grants(Some(&sub), Some("prep"), NOW);
        assert_eq!(first, second);
    }

    #[test]
    fn test_role_gate_exact_literal_only() {
        assert!(!role_grants_admin(None));

        let editor = RoleRecord { role: "editor".to_string() };
        assert!(!role_grants_admin(Some(&editor)));

        let admin = RoleRecord { role: "admin".to_string() };
        assert!(role_grants_admin(Some(&admin)));
    }
}
