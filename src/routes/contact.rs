use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ERR_INVALID_EMAIL, MAX_MESSAGE_LEN};
use crate::db::{self, tables};
use crate::error::{AppError, Result};
use crate::extractors::MaybeIdentity;
use crate::models::{validate_email, MessageRecord};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRequest {
    pub user_name: String,
    pub user_email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub success: bool,
    pub id: String,
}

/// Submit a contact message. Open to visitors; an authenticated caller's
/// uid is attached, anonymous senders leave it null.
pub async fn submit_message(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<ContactResponse>> {
    if payload.user_name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }
    if !validate_email(&payload.user_email) {
        return Err(AppError::InvalidInput(ERR_INVALID_EMAIL.to_string()));
    }
    let message = payload.message.trim();
    if message.is_empty() {
        return Err(AppError::InvalidInput("Message is required".to_string()));
    }
    if message.chars().count() > MAX_MESSAGE_LEN {
        return Err(AppError::InvalidInput(format!(
            "Message exceeds {} characters",
            MAX_MESSAGE_LEN
        )));
    }

    let record = MessageRecord {
        user_id: identity.map(|identity| identity.uid),
        user_name: payload.user_name.trim().to_string(),
        user_email: payload.user_email.trim().to_string(),
        message: message.to_string(),
        read: false,
        created_at: Utc::now().timestamp(),
    };

    let db = state.db.clone();
    let id = Uuid::now_v7().to_string();
    let stored = record;
    let stored_id = id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut messages = write_txn.open_table(tables::MESSAGES)?;
            let bytes = db::encode(&stored)?;
            messages.insert(stored_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("Contact message received: {}", id);

    Ok(Json(ContactResponse { success: true, id }))
}
