//! Management API. Every handler passes the admin gate before reading or
//! mutating anything; the gate fails closed on lookup errors.

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use redb::{ReadableTable, ReadableTableMetadata};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{
    ERR_INVALID_MONTHS, ERR_MISSING_FIELD, MAX_SUBSCRIPTION_MONTHS, MIN_SUBSCRIPTION_MONTHS,
};
use crate::db::{self, tables};
use crate::entitlement::require_admin;
use crate::error::{AppError, Result};
use crate::extractors::Identity;
use crate::models::{
    expiry_after_months, Category, CategoryKind, CategoryRecord, CourseRecord, LevelRecord,
    Message, MessageRecord, PrivateSource, Question, SubscriptionRecord, TestContent, TestRecord,
    UserRecord, VideoRecord,
};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

const OK: SuccessResponse = SuccessResponse { success: true };

// =============================================================================
// Stats
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStatsResponse {
    pub user_count: u64,
    pub level_count: u64,
    pub video_count: u64,
    pub course_count: u64,
    pub test_count: u64,
    pub subscription_count: u64,
    pub unread_message_count: u64,
}

/// Dashboard statistics, recomputed from the authoritative tables on every
/// request rather than kept as stored counters.
pub async fn admin_stats(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<AdminStatsResponse>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    let stats = tokio::task::spawn_blocking(move || -> Result<AdminStatsResponse> {
        let read_txn = db.begin_read()?;

        let user_count = read_txn.open_table(tables::USERS)?.len()?;
        let level_count = read_txn.open_table(tables::LEVELS)?.len()?;
        let video_count = read_txn.open_table(tables::VIDEOS)?.len()?;
        let course_count = read_txn.open_table(tables::COURSES)?.len()?;
        let test_count = read_txn.open_table(tables::TESTS)?.len()?;
        let subscription_count = read_txn.open_table(tables::SUBSCRIPTIONS)?.len()?;

        let messages = read_txn.open_table(tables::MESSAGES)?;
        let mut unread_message_count = 0;
        for item in messages.iter()? {
            let (_, value) = item?;
            let message: MessageRecord = db::decode(value.value())?;
            if !message.read {
                unread_message_count += 1;
            }
        }

        Ok(AdminStatsResponse {
            user_count,
            level_count,
            video_count,
            course_count,
            test_count,
            subscription_count,
            unread_message_count,
        })
    })
    .await??;

    Ok(Json(stats))
}

// =============================================================================
// Educational Levels
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRequest {
    pub name: String,
    pub image_url: Option<String>,
}

pub async fn create_level(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<LevelRequest>,
) -> Result<Json<CreatedResponse>> {
    require_admin(&state, &identity).await?;

    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput(ERR_MISSING_FIELD.to_string()));
    }

    let now = Utc::now().timestamp();
    let record = LevelRecord {
        name: payload.name.trim().to_string(),
        image_url: payload.image_url,
        created_at: now,
        updated_at: now,
    };

    let db = state.db.clone();
    let id = Uuid::now_v7().to_string();
    let stored_id = id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut levels = write_txn.open_table(tables::LEVELS)?;
            let bytes = db::encode(&record)?;
            levels.insert(stored_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(CreatedResponse { id }))
}

pub async fn update_level(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<LevelRequest>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput(ERR_MISSING_FIELD.to_string()));
    }

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut levels = write_txn.open_table(tables::LEVELS)?;
            let mut record: LevelRecord = levels
                .get(id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::LevelNotFound)?;

            record.name = payload.name.trim().to_string();
            record.image_url = payload.image_url;
            record.updated_at = Utc::now().timestamp();

            let bytes = db::encode(&record)?;
            levels.insert(id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

/// Delete an educational level. No cascade: content and subscriptions that
/// reference the level keep their dangling reference and simply stop
/// matching any entitlement.
pub async fn delete_level(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut levels = write_txn.open_table(tables::LEVELS)?;
            if levels.remove(id.as_str())?.is_none() {
                return Err(AppError::LevelNotFound);
            }
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub kind: CategoryKind,
    pub name: String,
}

pub async fn create_category(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<CreatedResponse>> {
    require_admin(&state, &identity).await?;

    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput(ERR_MISSING_FIELD.to_string()));
    }

    let record = CategoryRecord {
        kind: payload.kind,
        name: payload.name.trim().to_string(),
    };

    let db = state.db.clone();
    let id = Uuid::now_v7().to_string();
    let stored_id = id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut categories = write_txn.open_table(tables::CATEGORIES)?;
            let bytes = db::encode(&record)?;
            categories.insert(stored_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(CreatedResponse { id }))
}

pub async fn update_category(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<Category>> {
    require_admin(&state, &identity).await?;

    if payload.name.trim().is_empty() {
        return Err(AppError::InvalidInput(ERR_MISSING_FIELD.to_string()));
    }

    let record = CategoryRecord {
        kind: payload.kind,
        name: payload.name.trim().to_string(),
    };

    let db = state.db.clone();
    let category_id = id.clone();
    let stored = record.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut categories = write_txn.open_table(tables::CATEGORIES)?;
            if categories.get(category_id.as_str())?.is_none() {
                return Err(AppError::CategoryNotFound);
            }
            let bytes = db::encode(&stored)?;
            categories.insert(category_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(Category {
        id,
        kind: record.kind,
        name: record.name,
    }))
}

pub async fn delete_category(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut categories = write_txn.open_table(tables::CATEGORIES)?;
            if categories.remove(id.as_str())?.is_none() {
                return Err(AppError::CategoryNotFound);
            }
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

// =============================================================================
// Videos
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRequest {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub level: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    /// Private media URL; stored as the gated sibling document
    pub source_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub thumbnail_url: Option<String>,
    pub duration: Option<String>,
    pub source_url: Option<String>,
}

pub async fn create_video(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<VideoRequest>,
) -> Result<Json<CreatedResponse>> {
    require_admin(&state, &identity).await?;

    if payload.title.trim().is_empty()
        || payload.description.trim().is_empty()
        || payload.source_url.trim().is_empty()
    {
        return Err(AppError::InvalidInput(ERR_MISSING_FIELD.to_string()));
    }

    let now = Utc::now().timestamp();
    let record = VideoRecord {
        title: payload.title.trim().to_string(),
        description: payload.description.trim().to_string(),
        category: payload.category,
        level: payload.level,
        thumbnail_url: payload.thumbnail_url,
        duration: payload.duration,
        views: 0,
        created_at: now,
        updated_at: now,
    };
    let source = PrivateSource {
        url: payload.source_url.trim().to_string(),
    };

    let db = state.db.clone();
    let id = Uuid::now_v7().to_string();
    let stored_id = id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut videos = write_txn.open_table(tables::VIDEOS)?;
            let bytes = db::encode(&record)?;
            videos.insert(stored_id.as_str(), bytes.as_slice())?;
            drop(videos);

            let mut sources = write_txn.open_table(tables::VIDEO_SOURCES)?;
            let bytes = db::encode(&source)?;
            sources.insert(stored_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("Video created: {}", id);

    Ok(Json(CreatedResponse { id }))
}

pub async fn update_video(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<VideoUpdateRequest>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut videos = write_txn.open_table(tables::VIDEOS)?;
            let mut record: VideoRecord = videos
                .get(id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::ContentNotFound)?;

            if let Some(title) = payload.title {
                record.title = title.trim().to_string();
            }
            if let Some(description) = payload.description {
                record.description = description.trim().to_string();
            }
            if let Some(category) = payload.category {
                record.category = Some(category);
            }
            if let Some(level) = payload.level {
                record.level = Some(level);
            }
            if let Some(thumbnail_url) = payload.thumbnail_url {
                record.thumbnail_url = Some(thumbnail_url);
            }
            if let Some(duration) = payload.duration {
                record.duration = Some(duration);
            }
            record.updated_at = Utc::now().timestamp();

            let bytes = db::encode(&record)?;
            videos.insert(id.as_str(), bytes.as_slice())?;
            drop(videos);

            if let Some(source_url) = payload.source_url {
                let mut sources = write_txn.open_table(tables::VIDEO_SOURCES)?;
                let source = PrivateSource {
                    url: source_url.trim().to_string(),
                };
                let bytes = db::encode(&source)?;
                sources.insert(id.as_str(), bytes.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

pub async fn delete_video(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut videos = write_txn.open_table(tables::VIDEOS)?;
            if videos.remove(id.as_str())?.is_none() {
                return Err(AppError::ContentNotFound);
            }
            drop(videos);

            // Remove the private sibling with the public document
            let mut sources = write_txn.open_table(tables::VIDEO_SOURCES)?;
            sources.remove(id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

// =============================================================================
// Courses
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRequest {
    pub title: String,
    pub description: String,
    pub category: Option<String>,
    pub level: Option<String>,
    pub thumbnail_url: Option<String>,
    pub hours: u32,
    pub source_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub thumbnail_url: Option<String>,
    pub hours: Option<u32>,
    pub source_url: Option<String>,
}

pub async fn create_course(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CourseRequest>,
) -> Result<Json<CreatedResponse>> {
    require_admin(&state, &identity).await?;

    if payload.title.trim().is_empty()
        || payload.description.trim().is_empty()
        || payload.source_url.trim().is_empty()
    {
        return Err(AppError::InvalidInput(ERR_MISSING_FIELD.to_string()));
    }
    if payload.hours == 0 {
        return Err(AppError::InvalidInput(
            "Course hours must be greater than zero".to_string(),
        ));
    }

    let now = Utc::now().timestamp();
    let record = CourseRecord {
        title: payload.title.trim().to_string(),
        description: payload.description.trim().to_string(),
        category: payload.category,
        level: payload.level,
        thumbnail_url: payload.thumbnail_url,
        hours: payload.hours,
        created_at: now,
        updated_at: now,
    };
    let source = PrivateSource {
        url: payload.source_url.trim().to_string(),
    };

    let db = state.db.clone();
    let id = Uuid::now_v7().to_string();
    let stored_id = id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut courses = write_txn.open_table(tables::COURSES)?;
            let bytes = db::encode(&record)?;
            courses.insert(stored_id.as_str(), bytes.as_slice())?;
            drop(courses);

            let mut sources = write_txn.open_table(tables::COURSE_SOURCES)?;
            let bytes = db::encode(&source)?;
            sources.insert(stored_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("Course created: {}", id);

    Ok(Json(CreatedResponse { id }))
}

pub async fn update_course(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<CourseUpdateRequest>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    if payload.hours == Some(0) {
        return Err(AppError::InvalidInput(
            "Course hours must be greater than zero".to_string(),
        ));
    }

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut courses = write_txn.open_table(tables::COURSES)?;
            let mut record: CourseRecord = courses
                .get(id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::ContentNotFound)?;

            if let Some(title) = payload.title {
                record.title = title.trim().to_string();
            }
            if let Some(description) = payload.description {
                record.description = description.trim().to_string();
            }
            if let Some(category) = payload.category {
                record.category = Some(category);
            }
            if let Some(level) = payload.level {
                record.level = Some(level);
            }
            if let Some(thumbnail_url) = payload.thumbnail_url {
                record.thumbnail_url = Some(thumbnail_url);
            }
            if let Some(hours) = payload.hours {
                record.hours = hours;
            }
            record.updated_at = Utc::now().timestamp();

            let bytes = db::encode(&record)?;
            courses.insert(id.as_str(), bytes.as_slice())?;
            drop(courses);

            if let Some(source_url) = payload.source_url {
                let mut sources = write_txn.open_table(tables::COURSE_SOURCES)?;
                let source = PrivateSource {
                    url: source_url.trim().to_string(),
                };
                let bytes = db::encode(&source)?;
                sources.insert(id.as_str(), bytes.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

pub async fn delete_course(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut courses = write_txn.open_table(tables::COURSES)?;
            if courses.remove(id.as_str())?.is_none() {
                return Err(AppError::ContentNotFound);
            }
            drop(courses);

            let mut sources = write_txn.open_table(tables::COURSE_SOURCES)?;
            sources.remove(id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

// =============================================================================
// Tests
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRequest {
    pub title: String,
    pub description: String,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub questions_data: Vec<Question>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<String>,
    pub duration: Option<String>,
    pub questions_data: Option<Vec<Question>>,
}

fn validate_questions(questions: &[Question]) -> Result<()> {
    if questions.is_empty() {
        return Err(AppError::InvalidInput(
            "A test needs at least one question".to_string(),
        ));
    }
    for question in questions {
        question.validate().map_err(AppError::InvalidInput)?;
    }
    Ok(())
}

pub async fn create_test(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<TestRequest>,
) -> Result<Json<CreatedResponse>> {
    require_admin(&state, &identity).await?;

    if payload.title.trim().is_empty() || payload.description.trim().is_empty() {
        return Err(AppError::InvalidInput(ERR_MISSING_FIELD.to_string()));
    }
    validate_questions(&payload.questions_data)?;

    let now = Utc::now().timestamp();
    // The public question count is derived from the submitted set in the
    // same write, never taken from the client
    let record = TestRecord {
        title: payload.title.trim().to_string(),
        description: payload.description.trim().to_string(),
        level: payload.level,
        duration: payload.duration,
        questions: payload.questions_data.len() as u32,
        created_at: now,
        updated_at: now,
    };
    let content = TestContent {
        questions_data: payload.questions_data,
    };

    let db = state.db.clone();
    let id = Uuid::now_v7().to_string();
    let stored_id = id.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut tests = write_txn.open_table(tables::TESTS)?;
            let bytes = db::encode(&record)?;
            tests.insert(stored_id.as_str(), bytes.as_slice())?;
            drop(tests);

            let mut contents = write_txn.open_table(tables::TEST_CONTENT)?;
            let bytes = db::encode(&content)?;
            contents.insert(stored_id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    tracing::info!("Test created: {}", id);

    Ok(Json(CreatedResponse { id }))
}

pub async fn update_test(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<TestUpdateRequest>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    if let Some(questions) = &payload.questions_data {
        validate_questions(questions)?;
    }

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut tests = write_txn.open_table(tables::TESTS)?;
            let mut record: TestRecord = tests
                .get(id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::ContentNotFound)?;

            if let Some(title) = payload.title {
                record.title = title.trim().to_string();
            }
            if let Some(description) = payload.description {
                record.description = description.trim().to_string();
            }
            if let Some(level) = payload.level {
                record.level = Some(level);
            }
            if let Some(duration) = payload.duration {
                record.duration = Some(duration);
            }
            if let Some(questions) = &payload.questions_data {
                // Count and question set change together in this transaction
                record.questions = questions.len() as u32;
            }
            record.updated_at = Utc::now().timestamp();

            let bytes = db::encode(&record)?;
            tests.insert(id.as_str(), bytes.as_slice())?;
            drop(tests);

            if let Some(questions) = payload.questions_data {
                let mut contents = write_txn.open_table(tables::TEST_CONTENT)?;
                let content = TestContent {
                    questions_data: questions,
                };
                let bytes = db::encode(&content)?;
                contents.insert(id.as_str(), bytes.as_slice())?;
            }
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

pub async fn delete_test(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut tests = write_txn.open_table(tables::TESTS)?;
            if tests.remove(id.as_str())?.is_none() {
                return Err(AppError::ContentNotFound);
            }
            drop(tests);

            let mut contents = write_txn.open_table(tables::TEST_CONTENT)?;
            contents.remove(id.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

// =============================================================================
// Subscriptions
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    pub user_id: String,
    pub educational_level_id: String,
    pub months: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewSubscriptionRequest {
    pub months: u32,
    /// Switch the subscription to another level while renewing
    pub educational_level_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionEntry {
    pub id: String,
    #[serde(flatten)]
    pub doc: SubscriptionRecord,
}

fn validate_months(months: u32) -> Result<()> {
    if !(MIN_SUBSCRIPTION_MONTHS..=MAX_SUBSCRIPTION_MONTHS).contains(&months) {
        return Err(AppError::InvalidInput(ERR_INVALID_MONTHS.to_string()));
    }
    Ok(())
}

pub async fn list_subscriptions(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<SubscriptionEntry>>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    let mut subscriptions =
        tokio::task::spawn_blocking(move || -> Result<Vec<SubscriptionEntry>> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(tables::SUBSCRIPTIONS)?;
            let mut out = Vec::new();
            for item in table.iter()? {
                let (key, value) = item?;
                out.push(SubscriptionEntry {
                    id: key.value().to_string(),
                    doc: db::decode(value.value())?,
                });
            }
            Ok(out)
        })
        .await??;

    subscriptions.sort_by_key(|entry| std::cmp::Reverse(entry.doc.created_at));
    Ok(Json(subscriptions))
}

/// Grant a subscription to a user.
///
/// `endsAt` is `now` plus the requested number of calendar months. Creating
/// over a live subscription is rejected so remaining entitlement is never
/// silently lost; renewal is its own explicit operation.
pub async fn create_subscription(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<CreateSubscriptionRequest>,
) -> Result<Json<SubscriptionEntry>> {
    require_admin(&state, &identity).await?;
    validate_months(payload.months)?;

    let now = Utc::now();
    let ends_at = expiry_after_months(now, payload.months)
        .ok_or_else(|| AppError::InvalidInput(ERR_INVALID_MONTHS.to_string()))?;

    let db = state.db.clone();
    let admin_id = identity.uid.clone();
    let record = tokio::task::spawn_blocking(move || -> Result<SubscriptionRecord> {
        let write_txn = db.begin_write()?;
        let record = {
            let users = write_txn.open_table(tables::USERS)?;
            let user: UserRecord = users
                .get(payload.user_id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::UserNotFound)?;
            drop(users);

            let mut subscriptions = write_txn.open_table(tables::SUBSCRIPTIONS)?;
            let existing: Option<SubscriptionRecord> = subscriptions
                .get(payload.user_id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?;

            if let Some(existing) = existing {
                if existing.is_live(now.timestamp()) {
                    return Err(AppError::SubscriptionStillActive);
                }
            }

            let record = SubscriptionRecord {
                user_id: payload.user_id.clone(),
                admin_id: Some(admin_id),
                educational_level_id: Some(payload.educational_level_id),
                user_name: Some(user.name),
                user_email: Some(user.email),
                user_phone: user.phone,
                starts_at: now.timestamp(),
                ends_at: Some(ends_at.timestamp()),
                created_at: now.timestamp(),
                updated_at: now.timestamp(),
            };
            let bytes = db::encode(&record)?;
            subscriptions.insert(payload.user_id.as_str(), bytes.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    })
    .await??;

    tracing::info!(
        "Subscription created for user {} until {:?}",
        record.user_id,
        record.ends_at
    );

    Ok(Json(SubscriptionEntry {
        id: record.user_id.clone(),
        doc: record,
    }))
}

/// Renew an existing subscription.
///
/// The new expiry is computed from `now`, not from the previous `endsAt`;
/// remaining time does not accrue.
pub async fn renew_subscription(
    State(state): State<AppState>,
    identity: Identity,
    Path(user_id): Path<String>,
    Json(payload): Json<RenewSubscriptionRequest>,
) -> Result<Json<SubscriptionEntry>> {
    require_admin(&state, &identity).await?;
    validate_months(payload.months)?;

    let now = Utc::now();
    let ends_at = expiry_after_months(now, payload.months)
        .ok_or_else(|| AppError::InvalidInput(ERR_INVALID_MONTHS.to_string()))?;

    let db = state.db.clone();
    let admin_id = identity.uid.clone();
    let record = tokio::task::spawn_blocking(move || -> Result<SubscriptionRecord> {
        let write_txn = db.begin_write()?;
        let record = {
            let mut subscriptions = write_txn.open_table(tables::SUBSCRIPTIONS)?;
            let mut record: SubscriptionRecord = subscriptions
                .get(user_id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::SubscriptionNotFound)?;

            if let Some(level) = payload.educational_level_id {
                record.educational_level_id = Some(level);
            }
            record.admin_id = Some(admin_id);
            record.starts_at = now.timestamp();
            record.ends_at = Some(ends_at.timestamp());
            record.updated_at = now.timestamp();

            let bytes = db::encode(&record)?;
            subscriptions.insert(user_id.as_str(), bytes.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    })
    .await??;

    tracing::info!(
        "Subscription renewed for user {} until {:?}",
        record.user_id,
        record.ends_at
    );

    Ok(Json(SubscriptionEntry {
        id: record.user_id.clone(),
        doc: record,
    }))
}

/// Remove a subscription outright. No soft delete, no grace period.
pub async fn delete_subscription(
    State(state): State<AppState>,
    identity: Identity,
    Path(user_id): Path<String>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut subscriptions = write_txn.open_table(tables::SUBSCRIPTIONS)?;
            if subscriptions.remove(user_id.as_str())?.is_none() {
                return Err(AppError::SubscriptionNotFound);
            }
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct MarkReadRequest {
    pub read: bool,
}

pub async fn list_messages(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<Vec<Message>>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    let mut messages = tokio::task::spawn_blocking(move || -> Result<Vec<Message>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::MESSAGES)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            out.push(Message {
                id: key.value().to_string(),
                doc: db::decode(value.value())?,
            });
        }
        Ok(out)
    })
    .await??;

    messages.sort_by_key(|message| std::cmp::Reverse(message.doc.created_at));
    Ok(Json(messages))
}

pub async fn mark_message_read(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<MarkReadRequest>,
) -> Result<Json<SuccessResponse>> {
    require_admin(&state, &identity).await?;

    let db = state.db.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let write_txn = db.begin_write()?;
        {
            let mut messages = write_txn.open_table(tables::MESSAGES)?;
            let mut record: MessageRecord = messages
                .get(id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::MessageNotFound)?;

            record.read = payload.read;
            let bytes = db::encode(&record)?;
            messages.insert(id.as_str(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    })
    .await??;

    Ok(Json(OK))
}
