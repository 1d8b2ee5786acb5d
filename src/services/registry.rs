use std::sync::Arc;

use anyhow::anyhow;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityAction, Document, WorkflowStatus};
use crate::services::activity::ActivityLog;
use crate::services::extract::{self, ALLOWED_MIME_TYPES};
use crate::services::metrics;
use crate::services::storage::Storage;
use crate::services::summarizer::{
    is_summarizable, truncate_to_chars, Summarizer, SUMMARY_INPUT_CHAR_LIMIT,
};
use crate::store::Store;

/// Hard cap on a single upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Document metadata, blob content and review workflow state.
#[derive(Clone)]
pub struct DocumentRegistry {
    store: Arc<dyn Store>,
    storage: Arc<dyn Storage>,
    summarizer: Arc<dyn Summarizer>,
    activity: ActivityLog,
    quota_bytes: u64,
}

impl DocumentRegistry {
    pub fn new(
        store: Arc<dyn Store>,
        storage: Arc<dyn Storage>,
        summarizer: Arc<dyn Summarizer>,
        activity: ActivityLog,
        quota_bytes: u64,
    ) -> Self {
        Self {
            store,
            storage,
            summarizer,
            activity,
            quota_bytes,
        }
    }

    /// Full upload pipeline: whitelist, size and quota checks, text
    /// extraction, blob write, metadata insert, best-effort summary,
    /// activity record.
    pub async fn ingest(
        &self,
        actor: &AuthUser,
        filename: String,
        mimetype: String,
        bytes: Vec<u8>,
        folder_id: Option<String>,
    ) -> Result<Document, AppError> {
        if !ALLOWED_MIME_TYPES.contains(&mimetype.as_str()) {
            return Err(AppError::BadRequest(anyhow!("File type not allowed")));
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::BadRequest(anyhow!("File too large")));
        }

        // Placement requires the folder to exist, not to be owned by the
        // uploader: any editor may file into any folder.
        if let Some(folder_id) = &folder_id {
            if Uuid::parse_str(folder_id).is_err() {
                return Err(AppError::BadRequest(anyhow!("Invalid folder ID")));
            }
            if self.store.find_folder(folder_id).await?.is_none() {
                return Err(AppError::NotFound(anyhow!("Folder not found")));
            }
        }

        let usage = self.storage.usage().await?;
        if usage.saturating_add(bytes.len() as u64) > self.quota_bytes {
            return Err(AppError::BadRequest(anyhow!("Storage limit exceeded")));
        }

        // Extraction failure is recorded in the content, never fails the
        // upload.
        let content = match extract::extract_text(&mimetype, &bytes) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(filename = %filename, error = %err, "Text extraction failed");
                format!("Error extracting text: {}", err)
            }
        };

        let file_id = Uuid::new_v4().to_string();
        self.storage.upload(&file_id, bytes).await?;

        let mut document = Document::new(
            actor.id.clone(),
            filename,
            mimetype,
            file_id,
            content,
            folder_id,
        );
        self.store.insert_document(&document).await?;

        if is_summarizable(&document.content) {
            let input = truncate_to_chars(&document.content, SUMMARY_INPUT_CHAR_LIMIT);
            match self.summarizer.summarize(input).await {
                Ok(summary) => {
                    self.store.set_summary(&document.id, &summary).await?;
                    document.summary = Some(summary);
                    metrics::record_summary("ok");
                }
                Err(err) => {
                    tracing::warn!(
                        document_id = %document.id,
                        error = %err,
                        "Upload-time summarization failed"
                    );
                    metrics::record_summary("error");
                }
            }
        }

        self.activity
            .record(
                ActivityAction::DocumentUploaded,
                actor,
                format!("Uploaded document: {}", document.filename),
            )
            .await?;
        metrics::record_document_uploaded();

        tracing::info!(
            document_id = %document.id,
            filename = %document.filename,
            "Document ingested"
        );
        Ok(document)
    }

    pub async fn get_document(&self, id: &str) -> Result<Document, AppError> {
        self.store
            .find_document(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Document not found")))
    }

    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Document>, AppError> {
        self.store.list_documents(search).await
    }

    /// Applies status and/or reviewer changes as one atomic update and
    /// returns the post-image. No transition graph is enforced.
    pub async fn update_workflow(
        &self,
        actor: &AuthUser,
        id: &str,
        status: Option<String>,
        reviewer_ids: Option<Vec<String>>,
    ) -> Result<Document, AppError> {
        if status.is_none() && reviewer_ids.is_none() {
            return Err(AppError::BadRequest(anyhow!("Nothing to update")));
        }

        let status = match status {
            Some(raw) => Some(
                raw.parse::<WorkflowStatus>()
                    .map_err(|_| AppError::BadRequest(anyhow!("Invalid status")))?,
            ),
            None => None,
        };
        if let Some(reviewer_ids) = &reviewer_ids {
            if reviewer_ids.iter().any(|id| Uuid::parse_str(id).is_err()) {
                return Err(AppError::BadRequest(anyhow!("Invalid reviewer IDs")));
            }
        }

        let document = self
            .store
            .update_workflow(id, status, reviewer_ids)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Document not found")))?;

        let status_label = status
            .map(|status| status.to_string())
            .unwrap_or_else(|| "reviewers assigned".to_string());
        self.activity
            .record(
                ActivityAction::WorkflowUpdated,
                actor,
                format!("Updated workflow for {} to {}", document.filename, status_label),
            )
            .await?;
        Ok(document)
    }

    pub async fn rename(
        &self,
        actor: &AuthUser,
        id: &str,
        filename: &str,
    ) -> Result<(), AppError> {
        if filename.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow!("Filename is required")));
        }
        if !self.store.set_filename(id, filename).await? {
            return Err(AppError::NotFound(anyhow!("Document not found")));
        }
        self.activity
            .record(
                ActivityAction::DocumentRenamed,
                actor,
                format!("Renamed document to: {}", filename),
            )
            .await?;
        Ok(())
    }

    /// Replaces the blob under a fresh file id and stores the new text.
    /// The cached summary is left as-is; it stays stale until the next
    /// force-refreshed summarize call.
    pub async fn update_content(
        &self,
        actor: &AuthUser,
        id: &str,
        content: &str,
    ) -> Result<(), AppError> {
        if content.is_empty() {
            return Err(AppError::BadRequest(anyhow!("Content is required")));
        }

        let document = self.get_document(id).await?;

        let new_file_id = Uuid::new_v4().to_string();
        self.storage.delete(&document.file_id).await?;
        self.storage
            .upload(&new_file_id, content.as_bytes().to_vec())
            .await?;

        if !self.store.set_content(id, &new_file_id, content).await? {
            return Err(AppError::NotFound(anyhow!("Document not found")));
        }

        self.activity
            .record(
                ActivityAction::DocumentUpdated,
                actor,
                format!("Updated document: {}", document.filename),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, actor: &AuthUser, id: &str) -> Result<(), AppError> {
        let document = self.get_document(id).await?;

        self.storage.delete(&document.file_id).await?;
        if !self.store.delete_document(id).await? {
            return Err(AppError::NotFound(anyhow!("Document not found")));
        }

        self.activity
            .record(
                ActivityAction::DocumentDeleted,
                actor,
                format!("Deleted document: {}", document.filename),
            )
            .await?;
        Ok(())
    }

    /// Case-insensitive match over filename and summary.
    pub async fn search(&self, query: &str) -> Result<Vec<Document>, AppError> {
        self.store.search_documents(query).await
    }

    /// Returns the cached summary unless `force_refresh` is set, in which
    /// case the provider is called again and the cache replaced.
    pub async fn summarize(&self, id: &str, force_refresh: bool) -> Result<String, AppError> {
        if Uuid::parse_str(id).is_err() {
            return Err(AppError::BadRequest(anyhow!("Invalid document ID")));
        }

        let document = self.get_document(id).await?;
        if !force_refresh {
            if let Some(summary) = document.summary {
                return Ok(summary);
            }
        }

        if !is_summarizable(&document.content) {
            return Err(AppError::BadRequest(anyhow!(
                "No valid content available for summarization"
            )));
        }

        let input = truncate_to_chars(&document.content, SUMMARY_INPUT_CHAR_LIMIT);
        let summary = match self.summarizer.summarize(input).await {
            Ok(summary) => {
                metrics::record_summary("ok");
                summary
            }
            Err(err) => {
                metrics::record_summary("error");
                return Err(err.into());
            }
        };
        self.store.set_summary(id, &summary).await?;
        Ok(summary)
    }

    /// Resolves a blob key to its document and bytes. The blob handle is
    /// acquired and released inside this call.
    pub async fn download(&self, file_id: &str) -> Result<(Document, Vec<u8>), AppError> {
        let document = self
            .store
            .find_document_by_file_id(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("File not found")))?;
        let bytes = self.storage.download(&document.file_id).await?;
        Ok((document, bytes))
    }
}
