use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] redb::Error),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::error::EncodeError),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bincode::error::DecodeError),

    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Authentication required")]
    Unauthenticated,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Admin access required")]
    NotAdmin,

    #[error("Active subscription required")]
    NotEntitled,

    #[error("User not found")]
    UserNotFound,

    #[error("Content not found")]
    ContentNotFound,

    #[error("Educational level not found")]
    LevelNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Message not found")]
    MessageNotFound,

    #[error("Subscription not found")]
    SubscriptionNotFound,

    #[error("No result recorded for this test")]
    ResultNotFound,

    #[error("Content source unavailable")]
    PrivateContentMissing,

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("User already holds an active subscription")]
    SubscriptionStillActive,

    #[error("A result is already recorded for this test")]
    AttemptAlreadyRecorded,
}

/// Implement IntoResponse to convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, code) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Transaction(ref e) => {
                tracing::error!("Transaction error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Table(ref e) => {
                tracing::error!("Table error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Storage(ref e) => {
                tracing::error!("Storage error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Commit(ref e) => {
                tracing::error!("Commit error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Serialization(ref e) => {
                tracing::error!("Serialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::Deserialization(ref e) => {
                tracing::error!("Deserialization error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::TaskJoin(ref e) => {
                tracing::error!("Task join error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error", None)
            }
            AppError::PrivateContentMissing => {
                tracing::error!("Public document exists but its private sibling is missing");
                (StatusCode::INTERNAL_SERVER_ERROR, "Content source unavailable", None)
            }
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.as_str(), None),
            AppError::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, "Authentication required", None)
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password", None)
            }
            AppError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required", None),
            AppError::NotEntitled => (
                StatusCode::FORBIDDEN,
                "An active subscription for this educational level is required",
                Some("subscription_required"),
            ),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "User not found", None),
            AppError::ContentNotFound => (StatusCode::NOT_FOUND, "Content not found", None),
            AppError::LevelNotFound => {
                (StatusCode::NOT_FOUND, "Educational level not found", None)
            }
            AppError::CategoryNotFound => (StatusCode::NOT_FOUND, "Category not found", None),
            AppError::MessageNotFound => (StatusCode::NOT_FOUND, "Message not found", None),
            AppError::SubscriptionNotFound => {
                (StatusCode::NOT_FOUND, "Subscription not found", None)
            }
            AppError::ResultNotFound => {
                (StatusCode::NOT_FOUND, "No result recorded for this test", None)
            }
            AppError::EmailAlreadyRegistered => {
                (StatusCode::CONFLICT, "Email already registered", None)
            }
            AppError::SubscriptionStillActive => (
                StatusCode::CONFLICT,
                "User already holds an active subscription",
                None,
            ),
            AppError::AttemptAlreadyRecorded => (
                StatusCode::CONFLICT,
                "A result is already recorded for this test",
                None,
            ),
        };

        let body = match code {
            Some(code) => Json(json!({ "error": error_message, "code": code })),
            None => Json(json!({ "error": error_message })),
        };

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
