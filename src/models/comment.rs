use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A comment on a document. Threading is one level deep: `parent_id` is
/// either absent (top-level) or the id of a top-level comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: String,
    pub document_id: String,
    pub user_id: String,
    pub user_email: String,
    pub content: String,
    pub parent_id: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        document_id: String,
        user_id: String,
        user_email: String,
        content: String,
        parent_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id,
            user_id,
            user_email,
            content,
            parent_id,
            created_at: Utc::now(),
        }
    }
}
