use serde::{Deserialize, Serialize};

use crate::models::{Document, WorkflowState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub filename: String,
    pub file_id: String,
    pub owner_id: String,
    pub folder_id: Option<String>,
    pub content: String,
    pub mimetype: String,
    pub summary: Option<String>,
    pub uploaded_at: String,
    pub workflow: WorkflowState,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            filename: document.filename,
            file_id: document.file_id,
            owner_id: document.owner_id,
            folder_id: document.folder_id,
            content: document.content,
            mimetype: document.mimetype,
            summary: document.summary,
            uploaded_at: document.uploaded_at.to_rfc3339(),
            workflow: document.workflow,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListDocumentsParams {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRequest {
    pub status: Option<String>,
    pub reviewer_ids: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct WorkflowResponse {
    pub message: String,
    pub document: DocumentResponse,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub filename: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateContentRequest {
    pub content: String,
}
