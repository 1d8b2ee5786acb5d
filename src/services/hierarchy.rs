use std::sync::Arc;

use anyhow::anyhow;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityAction, Folder};
use crate::services::activity::ActivityLog;
use crate::store::Store;

/// Folder tree membership. Parent references are weak: they are stored as
/// given and never walked, so cycles and dangling parents are possible.
#[derive(Clone)]
pub struct FolderHierarchy {
    store: Arc<dyn Store>,
    activity: ActivityLog,
}

impl FolderHierarchy {
    pub fn new(store: Arc<dyn Store>, activity: ActivityLog) -> Self {
        Self { store, activity }
    }

    pub async fn create_folder(
        &self,
        actor: &AuthUser,
        name: String,
        parent_id: Option<String>,
    ) -> Result<Folder, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow!("Folder name is required")));
        }

        let folder = Folder::new(name, actor.id.clone(), parent_id);
        self.store.insert_folder(&folder).await?;

        self.activity
            .record(
                ActivityAction::FolderCreated,
                actor,
                format!("Created folder: {}", folder.name),
            )
            .await?;
        Ok(folder)
    }

    pub async fn list_folders(&self, actor: &AuthUser) -> Result<Vec<Folder>, AppError> {
        self.store.list_folders_for_owner(&actor.id).await
    }

    /// A folder goes away only when nothing points at it: no document's
    /// `folder_id` and no folder's `parent_id`.
    pub async fn delete_folder(&self, actor: &AuthUser, id: &str) -> Result<(), AppError> {
        if Uuid::parse_str(id).is_err() {
            return Err(AppError::BadRequest(anyhow!("Invalid folder ID")));
        }

        let folder = self
            .store
            .find_folder(id)
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Folder not found")))?;
        if folder.owner_id != actor.id {
            return Err(AppError::Forbidden(anyhow!(
                "Only the folder owner may delete it"
            )));
        }

        let documents = self.store.count_documents_in_folder(id).await?;
        if documents > 0 {
            return Err(AppError::Conflict(anyhow!(
                "Folder contains documents and cannot be deleted"
            )));
        }
        let subfolders = self.store.count_subfolders(id).await?;
        if subfolders > 0 {
            return Err(AppError::Conflict(anyhow!(
                "Folder contains subfolders and cannot be deleted"
            )));
        }

        if !self.store.delete_folder(id).await? {
            return Err(AppError::NotFound(anyhow!("Folder not found")));
        }

        self.activity
            .record(
                ActivityAction::FolderDeleted,
                actor,
                format!("Deleted folder: {}", folder.name),
            )
            .await?;
        Ok(())
    }

    /// Sets a document's folder as one atomic field update. The target
    /// folder's existence is not checked; `None` moves to root. Ownership is
    /// folded into the lookup, so a foreign document reads as absent.
    pub async fn move_document(
        &self,
        actor: &AuthUser,
        document_id: &str,
        folder_id: Option<String>,
    ) -> Result<(), AppError> {
        if let Some(folder_id) = &folder_id {
            if Uuid::parse_str(folder_id).is_err() {
                return Err(AppError::BadRequest(anyhow!("Invalid folder ID")));
            }
        }

        let document = self
            .store
            .set_folder(document_id, &actor.id, folder_id.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound(anyhow!("Document not found")))?;

        let destination = folder_id.as_deref().unwrap_or("root");
        self.activity
            .record(
                ActivityAction::DocumentMoved,
                actor,
                format!("Moved document {} to folder {}", document.filename, destination),
            )
            .await?;
        Ok(())
    }
}
