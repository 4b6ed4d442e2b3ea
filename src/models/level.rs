use serde::{Deserialize, Serialize};

/// Educational level document (e.g. preparatory or secondary stage).
/// The top-level partitioning dimension that subscriptions are scoped to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelRecord {
    pub name: String,
    pub image_url: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Educational level as exposed by the API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
    pub id: String,
    #[serde(flatten)]
    pub doc: LevelRecord,
}
