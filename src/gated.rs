//! Generic gated content repository.
//!
//! Videos, courses and tests all follow the same convention: a public
//! metadata document anyone authenticated may read, and a private sibling
//! (media URL or question set) that is fetched only after the subscription
//! validator has passed for the item's educational level. This module
//! implements that fetch sequence once, parameterized over the content type.

use redb::TableDefinition;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::{self, tables};
use crate::entitlement::{self, GatedAccess};
use crate::error::{AppError, Result};
use crate::extractors::Identity;
use crate::models::{CourseRecord, PrivateSource, TestContent, TestRecord, VideoRecord};
use crate::AppState;

/// A content type split into a public document and a private sibling
pub trait GatedContent: DeserializeOwned + Send + 'static {
    /// Payload of the private sibling document
    type Private: DeserializeOwned + Serialize + Send + 'static;

    /// Table holding the public metadata documents
    const PUBLIC: TableDefinition<'static, &'static str, &'static [u8]>;
    /// Table holding the private sibling documents, keyed by the same id
    const PRIVATE: TableDefinition<'static, &'static str, &'static [u8]>;

    /// Educational level the item belongs to, if assigned
    fn level_id(&self) -> Option<&str>;
}

impl GatedContent for VideoRecord {
    type Private = PrivateSource;
    const PUBLIC: TableDefinition<'static, &'static str, &'static [u8]> = tables::VIDEOS;
    const PRIVATE: TableDefinition<'static, &'static str, &'static [u8]> = tables::VIDEO_SOURCES;

    fn level_id(&self) -> Option<&str> {
        self.level.as_deref()
    }
}

impl GatedContent for CourseRecord {
    type Private = PrivateSource;
    const PUBLIC: TableDefinition<'static, &'static str, &'static [u8]> = tables::COURSES;
    const PRIVATE: TableDefinition<'static, &'static str, &'static [u8]> = tables::COURSE_SOURCES;

    fn level_id(&self) -> Option<&str> {
        self.level.as_deref()
    }
}

impl GatedContent for TestRecord {
    type Private = TestContent;
    const PUBLIC: TableDefinition<'static, &'static str, &'static [u8]> = tables::TESTS;
    const PRIVATE: TableDefinition<'static, &'static str, &'static [u8]> = tables::TEST_CONTENT;

    fn level_id(&self) -> Option<&str> {
        self.level.as_deref()
    }
}

/// Fetch the public metadata document for a content item
pub async fn fetch_public<C: GatedContent>(state: &AppState, id: &str) -> Result<Option<C>> {
    let db = state.db.clone();
    let id = id.to_string();

    tokio::task::spawn_blocking(move || -> Result<Option<C>> {
        let read_txn = db.begin_read()?;
        let table = read_txn.open_table(C::PUBLIC)?;
        table
            .get(id.as_str())?
            .map(|bytes| db::decode(bytes.value()))
            .transpose()
    })
    .await?
}

/// Fetch a content item's private sibling, gated on entitlement.
///
/// The private document is requested only after the subscription validator
/// has returned true; an anonymous caller or a failed check short-circuits
/// to `NotEntitled` without touching the private table. A public document
/// whose sibling is missing surfaces a fetch error distinct from the
/// entitlement outcomes.
pub async fn fetch_gated<C: GatedContent>(
    state: &AppState,
    identity: Option<&Identity>,
    id: &str,
) -> Result<GatedAccess<C::Private>> {
    let Some(record) = fetch_public::<C>(state, id).await? else {
        return Ok(GatedAccess::NotFound);
    };

    let Some(identity) = identity else {
        return Ok(GatedAccess::NotEntitled);
    };

    if !entitlement::is_entitled(state, Some(identity), record.level_id()).await {
        return Ok(GatedAccess::NotEntitled);
    }

    let db = state.db.clone();
    let id = id.to_string();
    let private: Option<C::Private> =
        tokio::task::spawn_blocking(move || -> Result<Option<C::Private>> {
            let read_txn = db.begin_read()?;
            let table = read_txn.open_table(C::PRIVATE)?;
            table
                .get(id.as_str())?
                .map(|bytes| db::decode(bytes.value()))
                .transpose()
        })
        .await??;

    match private {
        Some(private) => Ok(GatedAccess::Entitled(private)),
        None => Err(AppError::PrivateContentMissing),
    }
}
