use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review workflow status. No transition graph: any status may be set from
/// any status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum WorkflowStatus {
    #[default]
    Draft,
    InReview,
    Approved,
}

impl std::str::FromStr for WorkflowStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(WorkflowStatus::Draft),
            "InReview" => Ok(WorkflowStatus::InReview),
            "Approved" => Ok(WorkflowStatus::Approved),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkflowStatus::Draft => "Draft",
            WorkflowStatus::InReview => "InReview",
            WorkflowStatus::Approved => "Approved",
        };
        write!(f, "{}", s)
    }
}

/// Embedded workflow state. Documents persisted before the workflow existed
/// lack the field entirely, so every part defaults on read; nothing is
/// written back until the next workflow update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WorkflowState {
    #[serde(default)]
    pub status: WorkflowStatus,
    #[serde(default)]
    pub reviewers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    pub filename: String,
    /// Blob-store key for the raw bytes; replaced wholesale on content update.
    pub file_id: String,
    pub owner_id: String,
    pub folder_id: Option<String>,
    /// Extracted plain text. May carry an extraction-failure marker which
    /// readers tolerate and summarization rejects.
    pub content: String,
    pub mimetype: String,
    pub summary: Option<String>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub workflow: WorkflowState,
}

impl Document {
    pub fn new(
        owner_id: String,
        filename: String,
        mimetype: String,
        file_id: String,
        content: String,
        folder_id: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            filename,
            file_id,
            owner_id,
            folder_id,
            content,
            mimetype,
            summary: None,
            uploaded_at: Utc::now(),
            workflow: WorkflowState::default(),
        }
    }
}
