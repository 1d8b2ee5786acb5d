use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{Activity, Comment, Document, Folder, User, WorkflowStatus};

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// Persistence seam for every collection the service touches. Production
/// runs the Mongo implementation; tests run the in-memory one. All writes
/// are single-document and atomic; callers never see partial state.
#[async_trait]
pub trait Store: Send + Sync {
    // Documents
    async fn insert_document(&self, document: &Document) -> Result<(), AppError>;
    async fn find_document(&self, id: &str) -> Result<Option<Document>, AppError>;
    async fn find_document_by_file_id(&self, file_id: &str)
        -> Result<Option<Document>, AppError>;
    /// All documents, newest upload first. `search`, when present, runs the
    /// full-text index over filename/summary/content.
    async fn list_documents(&self, search: Option<&str>) -> Result<Vec<Document>, AppError>;
    /// Case-insensitive substring match on filename or summary.
    async fn search_documents(&self, query: &str) -> Result<Vec<Document>, AppError>;
    /// Applies the given workflow fields in one find-and-update and returns
    /// the post-image, or None if the document vanished first.
    async fn update_workflow(
        &self,
        id: &str,
        status: Option<WorkflowStatus>,
        reviewers: Option<Vec<String>>,
    ) -> Result<Option<Document>, AppError>;
    async fn set_filename(&self, id: &str, filename: &str) -> Result<bool, AppError>;
    async fn set_content(&self, id: &str, file_id: &str, content: &str)
        -> Result<bool, AppError>;
    async fn set_summary(&self, id: &str, summary: &str) -> Result<bool, AppError>;
    /// Moves a document owned by `owner_id`; the owner check is part of the
    /// filter, so a foreign document reads as absent. Returns the post-image.
    async fn set_folder(
        &self,
        id: &str,
        owner_id: &str,
        folder_id: Option<&str>,
    ) -> Result<Option<Document>, AppError>;
    async fn delete_document(&self, id: &str) -> Result<bool, AppError>;
    async fn count_documents_in_folder(&self, folder_id: &str) -> Result<u64, AppError>;

    // Comments
    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError>;
    async fn find_comment(&self, id: &str) -> Result<Option<Comment>, AppError>;
    /// Top-level comments (no parent) for a document, newest first.
    async fn list_top_level_comments(
        &self,
        document_id: &str,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Comment>, AppError>;
    async fn count_top_level_comments(&self, document_id: &str) -> Result<u64, AppError>;
    /// Direct replies to one comment, oldest first, unpaginated.
    async fn list_replies(&self, parent_id: &str) -> Result<Vec<Comment>, AppError>;
    /// Direct replies to any of the given comments, oldest first.
    async fn list_replies_for_parents(
        &self,
        parent_ids: &[String],
    ) -> Result<Vec<Comment>, AppError>;
    async fn delete_comment(&self, id: &str) -> Result<bool, AppError>;
    /// Removes direct replies only. Never descends further.
    async fn delete_replies(&self, parent_id: &str) -> Result<u64, AppError>;

    // Folders
    async fn insert_folder(&self, folder: &Folder) -> Result<(), AppError>;
    async fn find_folder(&self, id: &str) -> Result<Option<Folder>, AppError>;
    async fn list_folders_for_owner(&self, owner_id: &str) -> Result<Vec<Folder>, AppError>;
    async fn delete_folder(&self, id: &str) -> Result<bool, AppError>;
    async fn count_subfolders(&self, parent_id: &str) -> Result<u64, AppError>;

    // Activities
    async fn insert_activity(&self, activity: &Activity) -> Result<(), AppError>;
    async fn list_activities_for_user(&self, user_id: &str) -> Result<Vec<Activity>, AppError>;

    // Users
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;
    async fn find_user(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
