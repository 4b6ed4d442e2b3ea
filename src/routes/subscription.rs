use axum::{extract::State, Json};
use chrono::Utc;
use serde::Serialize;

use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::extractors::Identity;
use crate::models::SubscriptionRecord;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionSummary {
    pub educational_level_id: Option<String>,
    pub starts_at: i64,
    pub ends_at: Option<i64>,
    pub active: bool,
}

/// The caller's own subscription, 404 when none exists.
/// An expired subscription is returned with `active: false`; it stays in
/// the store until an admin deletes it.
pub async fn my_subscription(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<SubscriptionSummary>> {
    let db = state.db.clone();
    let uid = identity.uid.clone();
    let record = tokio::task::spawn_blocking(move || -> Result<Option<SubscriptionRecord>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::SUBSCRIPTIONS)?;
        table
            .get(uid.as_str())?
            .map(|bytes| db::decode(bytes.value()))
            .transpose()
    })
    .await??;

    let record = record.ok_or(AppError::SubscriptionNotFound)?;
    let active = record.is_live(Utc::now().timestamp());

    Ok(Json(SubscriptionSummary {
        educational_level_id: record.educational_level_id,
        starts_at: record.starts_at,
        ends_at: record.ends_at,
        active,
    }))
}
