use axum::{
    extract::{Query, State},
    Json,
};
use redb::ReadableTable;
use serde::{Deserialize, Serialize};

use crate::db::{self, tables};
use crate::error::Result;
use crate::extractors::Identity;
use crate::models::{
    Category, CategoryKind, CategoryRecord, CourseRecord, Level, LevelRecord, TestRecord,
    VideoRecord,
};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub kind: Option<CategoryKind>,
}

#[derive(Debug, Deserialize)]
pub struct ContentQuery {
    pub level: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct VideoSummary {
    pub id: String,
    #[serde(flatten)]
    pub doc: VideoRecord,
}

#[derive(Debug, Serialize)]
pub struct CourseSummary {
    pub id: String,
    #[serde(flatten)]
    pub doc: CourseRecord,
}

#[derive(Debug, Serialize)]
pub struct TestSummary {
    pub id: String,
    #[serde(flatten)]
    pub doc: TestRecord,
}

/// List educational levels. Public: the landing page shows levels to
/// visitors before they sign in.
pub async fn list_levels(State(state): State<AppState>) -> Result<Json<Vec<Level>>> {
    let db = state.db.clone();
    let mut levels = tokio::task::spawn_blocking(move || -> Result<Vec<Level>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::LEVELS)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            let doc: LevelRecord = db::decode(value.value())?;
            out.push(Level {
                id: key.value().to_string(),
                doc,
            });
        }
        Ok(out)
    })
    .await??;

    levels.sort_by_key(|level| level.doc.created_at);
    Ok(Json(levels))
}

/// List categories, optionally filtered by kind (video or course)
pub async fn list_categories(
    State(state): State<AppState>,
    _identity: Identity,
    Query(params): Query<CategoryQuery>,
) -> Result<Json<Vec<Category>>> {
    let db = state.db.clone();
    let mut categories = tokio::task::spawn_blocking(move || -> Result<Vec<Category>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::CATEGORIES)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            let doc: CategoryRecord = db::decode(value.value())?;
            if params.kind.is_some_and(|kind| kind != doc.kind) {
                continue;
            }
            out.push(Category {
                id: key.value().to_string(),
                kind: doc.kind,
                name: doc.name,
            });
        }
        Ok(out)
    })
    .await??;

    categories.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(categories))
}

/// List videos, newest first, filtered by level and/or category
pub async fn list_videos(
    State(state): State<AppState>,
    _identity: Identity,
    Query(params): Query<ContentQuery>,
) -> Result<Json<Vec<VideoSummary>>> {
    let db = state.db.clone();
    let mut videos = tokio::task::spawn_blocking(move || -> Result<Vec<VideoSummary>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::VIDEOS)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            let doc: VideoRecord = db::decode(value.value())?;
            if let Some(level) = &params.level {
                if doc.level.as_deref() != Some(level.as_str()) {
                    continue;
                }
            }
            if let Some(category) = &params.category {
                if doc.category.as_deref() != Some(category.as_str()) {
                    continue;
                }
            }
            out.push(VideoSummary {
                id: key.value().to_string(),
                doc,
            });
        }
        Ok(out)
    })
    .await??;

    videos.sort_by_key(|video| std::cmp::Reverse(video.doc.created_at));
    Ok(Json(videos))
}

/// List courses, newest first, filtered by level and/or category
pub async fn list_courses(
    State(state): State<AppState>,
    _identity: Identity,
    Query(params): Query<ContentQuery>,
) -> Result<Json<Vec<CourseSummary>>> {
    let db = state.db.clone();
    let mut courses = tokio::task::spawn_blocking(move || -> Result<Vec<CourseSummary>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::COURSES)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            let doc: CourseRecord = db::decode(value.value())?;
            if let Some(level) = &params.level {
                if doc.level.as_deref() != Some(level.as_str()) {
                    continue;
                }
            }
            if let Some(category) = &params.category {
                if doc.category.as_deref() != Some(category.as_str()) {
                    continue;
                }
            }
            out.push(CourseSummary {
                id: key.value().to_string(),
                doc,
            });
        }
        Ok(out)
    })
    .await??;

    courses.sort_by_key(|course| std::cmp::Reverse(course.doc.created_at));
    Ok(Json(courses))
}

/// List tests, newest first, filtered by level
pub async fn list_tests(
    State(state): State<AppState>,
    _identity: Identity,
    Query(params): Query<ContentQuery>,
) -> Result<Json<Vec<TestSummary>>> {
    let db = state.db.clone();
    let mut tests = tokio::task::spawn_blocking(move || -> Result<Vec<TestSummary>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(tables::TESTS)?;
        let mut out = Vec::new();
        for item in table.iter()? {
            let (key, value) = item?;
            let doc: TestRecord = db::decode(value.value())?;
            if let Some(level) = &params.level {
                if doc.level.as_deref() != Some(level.as_str()) {
                    continue;
                }
            }
            out.push(TestSummary {
                id: key.value().to_string(),
                doc,
            });
        }
        Ok(out)
    })
    .await??;

    tests.sort_by_key(|test| std::cmp::Reverse(test.doc.created_at));
    Ok(Json(tests))
}
