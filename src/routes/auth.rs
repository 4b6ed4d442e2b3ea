use axum::{extract::State, Json};
use chrono::{Duration, Utc};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{ERR_INVALID_EMAIL, ERR_PASSWORD_TOO_SHORT, MIN_PASSWORD_LEN};
use crate::db::{self, tables};
use crate::entitlement;
use crate::error::{AppError, Result};
use crate::extractors::Identity;
use crate::models::{normalize_email, validate_email, Profile, UserRecord};
use crate::security::{hash_password, issue_session_token, verify_password};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: Profile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub admin: bool,
    #[serde(flatten)]
    pub user: Profile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub avatar_url: Option<String>,
}

fn issue_session(state: &AppState, uid: &str, user: Profile) -> Result<Json<SessionResponse>> {
    let expires_at =
        (Utc::now() + Duration::hours(state.config.session_ttl_hours)).timestamp();
    let token = issue_session_token(uid, expires_at, &state.config.session_secret)
        .ok_or(AppError::InvalidCredentials)?;

    Ok(Json(SessionResponse {
        token,
        expires_at,
        user,
    }))
}

/// Register a new user
///
/// Creates the profile document keyed by a generated uid and indexes the
/// normalized email for login. Returns 409 Conflict if the email is taken,
/// then signs the caller in.
pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput("Name is required".to_string()));
    }
    if !validate_email(&payload.email) {
        return Err(AppError::InvalidInput(ERR_INVALID_EMAIL.to_string()));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(ERR_PASSWORD_TOO_SHORT.to_string()));
    }

    let email = normalize_email(&payload.email);
    let uid = Uuid::now_v7().to_string();
    let record = UserRecord {
        name: payload.name.trim().to_string(),
        email: email.clone(),
        phone: payload.phone.clone(),
        birth_date: None,
        avatar_url: None,
        password_hash: hash_password(&email, &payload.password, &state.config.password_pepper),
        created_at: Utc::now().timestamp(),
        updated_at: Utc::now().timestamp(),
    };

    let db = state.db.clone();
    let stored = record.clone();
    let stored_uid = uid.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut email_index = write_txn.open_table(tables::EMAIL_INDEX)?;
            if email_index.get(stored.email.as_str())?.is_some() {
                return Err(AppError::EmailAlreadyRegistered);
            }
            email_index.insert(stored.email.as_str(), stored_uid.as_str())?;
            drop(email_index);

            let mut users = write_txn.open_table(tables::USERS)?;
            let bytes = db::encode(&stored)?;
            users.insert(stored_uid.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("New user registered: {}", uid);

    let profile = Profile::from_record(uid.clone(), &record);
    issue_session(&state, &uid, profile)
}

/// Sign in with email and password, returning a signed session token
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>> {
    let email = normalize_email(&payload.email);

    let db = state.db.clone();
    let lookup_email = email.clone();
    let found = tokio::task::spawn_blocking(move || -> Result<Option<(String, UserRecord)>> {
        let read_txn = db.begin_read()?;
        let email_index = read_txn.open_table(tables::EMAIL_INDEX)?;
        let Some(uid) = email_index
            .get(lookup_email.as_str())?
            .map(|v| v.value().to_string())
        else {
            return Ok(None);
        };

        let users = read_txn.open_table(tables::USERS)?;
        let record: Option<UserRecord> = users
            .get(uid.as_str())?
            .map(|bytes| db::decode(bytes.value()))
            .transpose()?;

        Ok(record.map(|record| (uid, record)))
    })
    .await??;

    let Some((uid, record)) = found else {
        tracing::warn!("Login attempt for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(
        &email,
        &payload.password,
        &state.config.password_pepper,
        &record.password_hash,
    ) {
        tracing::warn!("Failed login attempt for user {}", uid);
        return Err(AppError::InvalidCredentials);
    }

    let profile = Profile::from_record(uid.clone(), &record);
    issue_session(&state, &uid, profile)
}

/// The caller's own profile, with the admin flag resolved through the gate
pub async fn get_profile(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<ProfileResponse>> {
    let db = state.db.clone();
    let uid = identity.uid.clone();
    let record = tokio::task::spawn_blocking(move || -> Result<Option<UserRecord>> {
        let read_txn = db.begin_read()?;
        let users = read_txn.open_table(tables::USERS)?;
        users
            .get(uid.as_str())?
            .map(|bytes| db::decode(bytes.value()))
            .transpose()
    })
    .await??;

    let record = record.ok_or(AppError::UserNotFound)?;
    let admin = entitlement::is_admin(&state, &identity).await;

    Ok(Json(ProfileResponse {
        admin,
        user: Profile::from_record(identity.uid, &record),
    }))
}

/// Self-service profile edit; only the provided fields change
pub async fn update_profile(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>> {
    if let Some(name) = &payload.name {
        if name.trim().is_empty() {
            return Err(AppError::InvalidInput("Name is required".to_string()));
        }
    }

    let db = state.db.clone();
    let uid = identity.uid.clone();
    let updated = tokio::task::spawn_blocking(move || -> Result<UserRecord> {
        let write_txn = db.begin_write()?;
        let record = {
            let mut users = write_txn.open_table(tables::USERS)?;
            let mut record: UserRecord = users
                .get(uid.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::UserNotFound)?;

            if let Some(name) = payload.name {
                record.name = name.trim().to_string();
            }
            if let Some(phone) = payload.phone {
                record.phone = Some(phone);
            }
            if let Some(birth_date) = payload.birth_date {
                record.birth_date = Some(birth_date);
            }
            if let Some(avatar_url) = payload.avatar_url {
                record.avatar_url = Some(avatar_url);
            }
            record.updated_at = Utc::now().timestamp();

            let bytes = db::encode(&record)?;
            users.insert(uid.as_str(), bytes.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    })
    .await??;

    Ok(Json(Profile::from_record(identity.uid, &updated)))
}
