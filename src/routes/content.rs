use axum::{
    extract::{Path, State},
    Json,
};
use redb::ReadableTable;
use serde::Serialize;

use crate::db::{self, tables};
use crate::entitlement::{self, GatedAccess};
use crate::error::{AppError, Result};
use crate::extractors::{Identity, MaybeIdentity};
use crate::gated::{fetch_gated, fetch_public};
use crate::models::{CourseRecord, PrivateSource, TestContent, TestRecord, VideoRecord};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct VideoDetail {
    pub id: String,
    pub entitled: bool,
    #[serde(flatten)]
    pub doc: VideoRecord,
}

#[derive(Debug, Serialize)]
pub struct CourseDetail {
    pub id: String,
    pub entitled: bool,
    #[serde(flatten)]
    pub doc: CourseRecord,
}

#[derive(Debug, Serialize)]
pub struct TestDetail {
    pub id: String,
    pub entitled: bool,
    #[serde(flatten)]
    pub doc: TestRecord,
}

/// Public video metadata plus the caller's entitlement for it.
/// The view counter is incremented in the same write transaction that
/// reads the record, never from a client-supplied value.
pub async fn video_detail(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<VideoDetail>> {
    let db = state.db.clone();
    let video_id = id.clone();
    let doc = tokio::task::spawn_blocking(move || -> Result<VideoRecord> {
        let write_txn = db.begin_write()?;
        let record = {
            let mut videos = write_txn.open_table(tables::VIDEOS)?;
            let mut record: VideoRecord = videos
                .get(video_id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()?
                .ok_or(AppError::ContentNotFound)?;

            record.views += 1;
            let bytes = db::encode(&record)?;
            videos.insert(video_id.as_str(), bytes.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    })
    .await??;

    let entitled = entitlement::is_entitled(&state, Some(&identity), doc.level.as_deref()).await;

    Ok(Json(VideoDetail { id, entitled, doc }))
}

/// Private video source; gated three-outcome fetch
pub async fn video_source(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<String>,
) -> Result<Json<PrivateSource>> {
    match fetch_gated::<VideoRecord>(&state, identity.as_ref(), &id).await? {
        GatedAccess::NotFound => Err(AppError::ContentNotFound),
        GatedAccess::NotEntitled => Err(AppError::NotEntitled),
        GatedAccess::Entitled(source) => Ok(Json(source)),
    }
}

/// Public course metadata plus the caller's entitlement for it
pub async fn course_detail(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<CourseDetail>> {
    let doc = fetch_public::<CourseRecord>(&state, &id)
        .await?
        .ok_or(AppError::ContentNotFound)?;

    let entitled = entitlement::is_entitled(&state, Some(&identity), doc.level.as_deref()).await;

    Ok(Json(CourseDetail { id, entitled, doc }))
}

/// Private course source; gated three-outcome fetch
pub async fn course_source(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<String>,
) -> Result<Json<PrivateSource>> {
    match fetch_gated::<CourseRecord>(&state, identity.as_ref(), &id).await? {
        GatedAccess::NotFound => Err(AppError::ContentNotFound),
        GatedAccess::NotEntitled => Err(AppError::NotEntitled),
        GatedAccess::Entitled(source) => Ok(Json(source)),
    }
}

/// Public test metadata plus the caller's entitlement for it
pub async fn test_detail(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<TestDetail>> {
    let doc = fetch_public::<TestRecord>(&state, &id)
        .await?
        .ok_or(AppError::ContentNotFound)?;

    let entitled = entitlement::is_entitled(&state, Some(&identity), doc.level.as_deref()).await;

    Ok(Json(TestDetail { id, entitled, doc }))
}

/// Private question set; gated three-outcome fetch
pub async fn test_content(
    State(state): State<AppState>,
    MaybeIdentity(identity): MaybeIdentity,
    Path(id): Path<String>,
) -> Result<Json<TestContent>> {
    match fetch_gated::<TestRecord>(&state, identity.as_ref(), &id).await? {
        GatedAccess::NotFound => Err(AppError::ContentNotFound),
        GatedAccess::NotEntitled => Err(AppError::NotEntitled),
        GatedAccess::Entitled(content) => Ok(Json(content)),
    }
}
