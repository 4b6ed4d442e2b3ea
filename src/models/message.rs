use serde::{Deserialize, Serialize};

/// Contact message document.
/// `user_id` is None when the sender was not signed in.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub user_id: Option<String>,
    pub user_name: String,
    pub user_email: String,
    pub message: String,
    pub read: bool,
    pub created_at: i64,
}

/// Contact message as exposed by the admin API
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(flatten)]
    pub doc: MessageRecord,
}
