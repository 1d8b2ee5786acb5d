use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named container owned by one user. `parent_id` is recorded as given,
/// never validated, so the hierarchy may contain gaps; traversals must
/// tolerate dangling parents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub parent_id: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Folder {
    pub fn new(name: String, owner_id: String, parent_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            owner_id,
            parent_id,
            created_at: Utc::now(),
        }
    }
}
