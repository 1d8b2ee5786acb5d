use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::AppError;
use crate::models::{Activity, Comment, Document, Folder, User, WorkflowStatus};
use crate::store::Store;

/// In-memory store for tests and local development. Entities carry an
/// insertion sequence number so sort orders stay deterministic when
/// timestamps tie.
#[derive(Default)]
pub struct MemoryStore {
    documents: DashMap<String, (u64, Document)>,
    comments: DashMap<String, (u64, Comment)>,
    folders: DashMap<String, (u64, Folder)>,
    activities: DashMap<String, (u64, Activity)>,
    users: DashMap<String, (u64, User)>,
    seq: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }
}

fn contains_ci(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_document(&self, document: &Document) -> Result<(), AppError> {
        self.documents
            .insert(document.id.clone(), (self.next_seq(), document.clone()));
        Ok(())
    }

    async fn find_document(&self, id: &str) -> Result<Option<Document>, AppError> {
        Ok(self.documents.get(id).map(|entry| entry.1.clone()))
    }

    async fn find_document_by_file_id(
        &self,
        file_id: &str,
    ) -> Result<Option<Document>, AppError> {
        Ok(self
            .documents
            .iter()
            .find(|entry| entry.1.file_id == file_id)
            .map(|entry| entry.1.clone()))
    }

    async fn list_documents(&self, search: Option<&str>) -> Result<Vec<Document>, AppError> {
        // Text search approximated by case-insensitive substring over the
        // same fields the production text index covers.
        let needle = search.map(str::to_lowercase);
        let mut entries: Vec<(u64, Document)> = self
            .documents
            .iter()
            .filter(|entry| match &needle {
                Some(needle) => {
                    let document = &entry.1;
                    contains_ci(&document.filename, needle)
                        || contains_ci(&document.content, needle)
                        || document
                            .summary
                            .as_deref()
                            .is_some_and(|summary| contains_ci(summary, needle))
                }
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| (b.1.uploaded_at, b.0).cmp(&(a.1.uploaded_at, a.0)));
        Ok(entries.into_iter().map(|(_, document)| document).collect())
    }

    async fn search_documents(&self, query: &str) -> Result<Vec<Document>, AppError> {
        let needle = query.to_lowercase();
        let mut entries: Vec<(u64, Document)> = self
            .documents
            .iter()
            .filter(|entry| {
                let document = &entry.1;
                contains_ci(&document.filename, &needle)
                    || document
                        .summary
                        .as_deref()
                        .is_some_and(|summary| contains_ci(summary, &needle))
            })
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| (b.1.uploaded_at, b.0).cmp(&(a.1.uploaded_at, a.0)));
        Ok(entries.into_iter().map(|(_, document)| document).collect())
    }

    async fn update_workflow(
        &self,
        id: &str,
        status: Option<WorkflowStatus>,
        reviewers: Option<Vec<String>>,
    ) -> Result<Option<Document>, AppError> {
        match self.documents.get_mut(id) {
            Some(mut entry) => {
                let document = &mut entry.1;
                if let Some(status) = status {
                    document.workflow.status = status;
                }
                if let Some(reviewers) = reviewers {
                    document.workflow.reviewers = reviewers;
                }
                Ok(Some(document.clone()))
            }
            None => Ok(None),
        }
    }

    async fn set_filename(&self, id: &str, filename: &str) -> Result<bool, AppError> {
        match self.documents.get_mut(id) {
            Some(mut entry) => {
                entry.1.filename = filename.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_content(
        &self,
        id: &str,
        file_id: &str,
        content: &str,
    ) -> Result<bool, AppError> {
        match self.documents.get_mut(id) {
            Some(mut entry) => {
                entry.1.file_id = file_id.to_string();
                entry.1.content = content.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_summary(&self, id: &str, summary: &str) -> Result<bool, AppError> {
        match self.documents.get_mut(id) {
            Some(mut entry) => {
                entry.1.summary = Some(summary.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_folder(
        &self,
        id: &str,
        owner_id: &str,
        folder_id: Option<&str>,
    ) -> Result<Option<Document>, AppError> {
        match self.documents.get_mut(id) {
            Some(mut entry) if entry.1.owner_id == owner_id => {
                entry.1.folder_id = folder_id.map(str::to_string);
                Ok(Some(entry.1.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete_document(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.documents.remove(id).is_some())
    }

    async fn count_documents_in_folder(&self, folder_id: &str) -> Result<u64, AppError> {
        Ok(self
            .documents
            .iter()
            .filter(|entry| entry.1.folder_id.as_deref() == Some(folder_id))
            .count() as u64)
    }

    async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        self.comments
            .insert(comment.id.clone(), (self.next_seq(), comment.clone()));
        Ok(())
    }

    async fn find_comment(&self, id: &str) -> Result<Option<Comment>, AppError> {
        Ok(self.comments.get(id).map(|entry| entry.1.clone()))
    }

    async fn list_top_level_comments(
        &self,
        document_id: &str,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Comment>, AppError> {
        let mut entries: Vec<(u64, Comment)> = self
            .comments
            .iter()
            .filter(|entry| {
                entry.1.document_id == document_id && entry.1.parent_id.is_none()
            })
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| (b.1.created_at, b.0).cmp(&(a.1.created_at, a.0)));
        Ok(entries
            .into_iter()
            .map(|(_, comment)| comment)
            .skip(skip as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count_top_level_comments(&self, document_id: &str) -> Result<u64, AppError> {
        Ok(self
            .comments
            .iter()
            .filter(|entry| {
                entry.1.document_id == document_id && entry.1.parent_id.is_none()
            })
            .count() as u64)
    }

    async fn list_replies(&self, parent_id: &str) -> Result<Vec<Comment>, AppError> {
        let mut entries: Vec<(u64, Comment)> = self
            .comments
            .iter()
            .filter(|entry| entry.1.parent_id.as_deref() == Some(parent_id))
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| (a.1.created_at, a.0).cmp(&(b.1.created_at, b.0)));
        Ok(entries.into_iter().map(|(_, comment)| comment).collect())
    }

    async fn list_replies_for_parents(
        &self,
        parent_ids: &[String],
    ) -> Result<Vec<Comment>, AppError> {
        let mut entries: Vec<(u64, Comment)> = self
            .comments
            .iter()
            .filter(|entry| {
                entry
                    .1
                    .parent_id
                    .as_ref()
                    .is_some_and(|parent| parent_ids.contains(parent))
            })
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| (a.1.created_at, a.0).cmp(&(b.1.created_at, b.0)));
        Ok(entries.into_iter().map(|(_, comment)| comment).collect())
    }

    async fn delete_comment(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.comments.remove(id).is_some())
    }

    async fn delete_replies(&self, parent_id: &str) -> Result<u64, AppError> {
        let reply_ids: Vec<String> = self
            .comments
            .iter()
            .filter(|entry| entry.1.parent_id.as_deref() == Some(parent_id))
            .map(|entry| entry.key().clone())
            .collect();
        let mut deleted = 0;
        for id in reply_ids {
            if self.comments.remove(&id).is_some() {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    async fn insert_folder(&self, folder: &Folder) -> Result<(), AppError> {
        self.folders
            .insert(folder.id.clone(), (self.next_seq(), folder.clone()));
        Ok(())
    }

    async fn find_folder(&self, id: &str) -> Result<Option<Folder>, AppError> {
        Ok(self.folders.get(id).map(|entry| entry.1.clone()))
    }

    async fn list_folders_for_owner(&self, owner_id: &str) -> Result<Vec<Folder>, AppError> {
        let mut entries: Vec<(u64, Folder)> = self
            .folders
            .iter()
            .filter(|entry| entry.1.owner_id == owner_id)
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| (a.1.created_at, a.0).cmp(&(b.1.created_at, b.0)));
        Ok(entries.into_iter().map(|(_, folder)| folder).collect())
    }

    async fn delete_folder(&self, id: &str) -> Result<bool, AppError> {
        Ok(self.folders.remove(id).is_some())
    }

    async fn count_subfolders(&self, parent_id: &str) -> Result<u64, AppError> {
        Ok(self
            .folders
            .iter()
            .filter(|entry| entry.1.parent_id.as_deref() == Some(parent_id))
            .count() as u64)
    }

    async fn insert_activity(&self, activity: &Activity) -> Result<(), AppError> {
        self.activities
            .insert(activity.id.clone(), (self.next_seq(), activity.clone()));
        Ok(())
    }

    async fn list_activities_for_user(&self, user_id: &str) -> Result<Vec<Activity>, AppError> {
        let mut entries: Vec<(u64, Activity)> = self
            .activities
            .iter()
            .filter(|entry| entry.1.user_id == user_id)
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by(|a, b| (b.1.timestamp, b.0).cmp(&(a.1.timestamp, a.0)));
        Ok(entries.into_iter().map(|(_, activity)| activity).collect())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        self.users
            .insert(user.id.clone(), (self.next_seq(), user.clone()));
        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(id).map(|entry| entry.1.clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut entries: Vec<(u64, User)> = self
            .users
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        Ok(entries.into_iter().map(|(_, user)| user).collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
