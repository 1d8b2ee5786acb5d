use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Closed set of audited actions. Wire and storage form is the human-readable
/// label, which the activity feed renders directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivityAction {
    #[serde(rename = "Document Uploaded")]
    DocumentUploaded,
    #[serde(rename = "Document Renamed")]
    DocumentRenamed,
    #[serde(rename = "Document Updated")]
    DocumentUpdated,
    #[serde(rename = "Document Deleted")]
    DocumentDeleted,
    #[serde(rename = "Document Moved")]
    DocumentMoved,
    #[serde(rename = "Folder Created")]
    FolderCreated,
    #[serde(rename = "Folder Deleted")]
    FolderDeleted,
    #[serde(rename = "Comment Added")]
    CommentAdded,
    #[serde(rename = "Workflow Updated")]
    WorkflowUpdated,
}

impl std::fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ActivityAction::DocumentUploaded => "Document Uploaded",
            ActivityAction::DocumentRenamed => "Document Renamed",
            ActivityAction::DocumentUpdated => "Document Updated",
            ActivityAction::DocumentDeleted => "Document Deleted",
            ActivityAction::DocumentMoved => "Document Moved",
            ActivityAction::FolderCreated => "Folder Created",
            ActivityAction::FolderDeleted => "Folder Deleted",
            ActivityAction::CommentAdded => "Comment Added",
            ActivityAction::WorkflowUpdated => "Workflow Updated",
        };
        write!(f, "{}", s)
    }
}

/// Append-only audit record. Entries are never updated or deleted, and
/// deleting the entity they describe leaves them in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    #[serde(rename = "_id")]
    pub id: String,
    pub action: ActivityAction,
    pub user_id: String,
    pub user_email: String,
    pub details: String,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

impl Activity {
    pub fn new(action: ActivityAction, user_id: String, user_email: String, details: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            action,
            user_id,
            user_email,
            details,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_serializes_as_human_readable_label() {
        assert_eq!(
            serde_json::to_string(&ActivityAction::WorkflowUpdated).unwrap(),
            "\"Workflow Updated\""
        );
        assert_eq!(
            serde_json::to_string(&ActivityAction::CommentAdded).unwrap(),
            "\"Comment Added\""
        );
    }

    #[test]
    fn action_display_matches_serialized_form() {
        let actions = [
            ActivityAction::DocumentUploaded,
            ActivityAction::DocumentRenamed,
            ActivityAction::DocumentUpdated,
            ActivityAction::DocumentDeleted,
            ActivityAction::DocumentMoved,
            ActivityAction::FolderCreated,
            ActivityAction::FolderDeleted,
            ActivityAction::CommentAdded,
            ActivityAction::WorkflowUpdated,
        ];
        for action in actions {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action));
        }
    }
}
