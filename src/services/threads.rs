use std::sync::Arc;

use anyhow::anyhow;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::{ActivityAction, Comment};
use crate::services::activity::ActivityLog;
use crate::services::metrics;
use crate::store::Store;

const DEFAULT_PAGE_LIMIT: i64 = 10;
const MAX_PAGE_LIMIT: i64 = 100;

/// A top-level comment with its direct replies attached.
#[derive(Debug, Clone)]
pub struct ThreadedComment {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

/// One page of assembled threads.
#[derive(Debug, Clone)]
pub struct CommentPage {
    pub comments: Vec<ThreadedComment>,
    pub total: u64,
    pub page: u64,
    pub limit: i64,
}

/// One-level threaded comments on documents.
#[derive(Clone)]
pub struct CommentThreads {
    store: Arc<dyn Store>,
    activity: ActivityLog,
}

impl CommentThreads {
    pub fn new(store: Arc<dyn Store>, activity: ActivityLog) -> Self {
        Self { store, activity }
    }

    /// Stores a comment as given: the document reference and any parent
    /// reference are not checked, so dangling parents are possible (they
    /// never surface, see [`build_thread`]).
    pub async fn add_comment(
        &self,
        actor: &AuthUser,
        document_id: &str,
        content: String,
        parent_id: Option<String>,
    ) -> Result<Comment, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::BadRequest(anyhow!("Comment content is required")));
        }

        let comment = Comment::new(
            document_id.to_string(),
            actor.id.clone(),
            actor.email.clone(),
            content,
            parent_id,
        );
        self.store.insert_comment(&comment).await?;

        self.activity
            .record(
                ActivityAction::CommentAdded,
                actor,
                format!("Commented on document {}", document_id),
            )
            .await?;
        metrics::record_comment_added();
        Ok(comment)
    }

    /// Newest-first page of top-level comments, each with its replies.
    /// `page` is 1-indexed; out-of-range pages come back empty with the
    /// correct total.
    pub async fn list_top_level(
        &self,
        document_id: &str,
        page: Option<u64>,
        limit: Option<i64>,
    ) -> Result<CommentPage, AppError> {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        let skip = (page - 1) * limit as u64;

        let top_level = self
            .store
            .list_top_level_comments(document_id, skip, limit)
            .await?;
        let total = self.store.count_top_level_comments(document_id).await?;

        let parent_ids: Vec<String> = top_level.iter().map(|c| c.id.clone()).collect();
        let replies = if parent_ids.is_empty() {
            Vec::new()
        } else {
            self.store.list_replies_for_parents(&parent_ids).await?
        };

        Ok(CommentPage {
            comments: build_thread(top_level, replies),
            total,
            page,
            limit,
        })
    }

    pub async fn list_replies(&self, parent_id: &str) -> Result<Vec<Comment>, AppError> {
        self.store.list_replies(parent_id).await
    }

    /// Removes a comment and its direct replies. Reply cleanup runs even
    /// when the target is already gone, so a half-finished earlier delete
    /// gets completed. No activity is recorded.
    pub async fn delete_comment(&self, id: &str) -> Result<(), AppError> {
        let deleted = self.store.delete_comment(id).await?;
        let removed_replies = self.store.delete_replies(id).await?;
        if !deleted {
            return Err(AppError::NotFound(anyhow!("Comment not found")));
        }
        tracing::debug!(comment_id = %id, replies = removed_replies, "Comment deleted");
        Ok(())
    }
}

/// Pure one-level assembly: each reply is attached to its parent in the
/// given page. Replies whose parent is not present are dropped. Nothing
/// recurses; replies never carry replies.
pub fn build_thread(top_level: Vec<Comment>, replies: Vec<Comment>) -> Vec<ThreadedComment> {
    let mut threads: Vec<ThreadedComment> = top_level
        .into_iter()
        .map(|comment| ThreadedComment {
            comment,
            replies: Vec::new(),
        })
        .collect();

    for reply in replies {
        let Some(parent_id) = reply.parent_id.as_deref() else {
            continue;
        };
        if let Some(thread) = threads
            .iter_mut()
            .find(|thread| thread.comment.id == parent_id)
        {
            thread.replies.push(reply);
        }
    }
    threads
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: &str, parent_id: Option<&str>) -> Comment {
        let mut comment = Comment::new(
            "d1".to_string(),
            "u1".to_string(),
            "u1@example.com".to_string(),
            format!("content of {}", id),
            parent_id.map(str::to_string),
        );
        comment.id = id.to_string();
        comment
    }

    #[test]
    fn replies_attach_to_their_parents_in_order() {
        let top_level = vec![comment("t2", None), comment("t1", None)];
        let replies = vec![
            comment("r1", Some("t1")),
            comment("r2", Some("t2")),
            comment("r3", Some("t1")),
        ];

        let threads = build_thread(top_level, replies);
        assert_eq!(threads.len(), 2);
        assert_eq!(threads[0].comment.id, "t2");
        assert_eq!(threads[0].replies.len(), 1);
        assert_eq!(threads[1].comment.id, "t1");
        let reply_ids: Vec<&str> = threads[1].replies.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(reply_ids, vec!["r1", "r3"]);
    }

    #[test]
    fn orphan_replies_are_dropped() {
        let top_level = vec![comment("t1", None)];
        let replies = vec![
            comment("r1", Some("t1")),
            comment("orphan", Some("not-in-page")),
        ];

        let threads = build_thread(top_level, replies);
        assert_eq!(threads.len(), 1);
        assert_eq!(threads[0].replies.len(), 1);
        assert_eq!(threads[0].replies[0].id, "r1");
    }

    #[test]
    fn empty_inputs_assemble_to_empty_threads() {
        assert!(build_thread(Vec::new(), Vec::new()).is_empty());

        let threads = build_thread(vec![comment("t1", None)], Vec::new());
        assert_eq!(threads.len(), 1);
        assert!(threads[0].replies.is_empty());
    }
}
