use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::Comment;
use crate::services::threads::{CommentPage, ThreadedComment};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[validate(length(min = 1, max = 4000, message = "must be 1 to 4000 characters"))]
    pub content: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub document_id: String,
    pub user_id: String,
    pub user_email: String,
    pub content: String,
    pub parent_id: Option<String>,
    pub created_at: String,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            document_id: comment.document_id,
            user_id: comment.user_id,
            user_email: comment.user_email,
            content: comment.content,
            parent_id: comment.parent_id,
            created_at: comment.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentCreatedResponse {
    pub comment: CommentResponse,
}

/// A top-level comment with its direct replies inlined.
#[derive(Debug, Serialize)]
pub struct ThreadedCommentResponse {
    #[serde(flatten)]
    pub comment: CommentResponse,
    pub replies: Vec<CommentResponse>,
}

impl From<ThreadedComment> for ThreadedCommentResponse {
    fn from(thread: ThreadedComment) -> Self {
        Self {
            comment: thread.comment.into(),
            replies: thread.replies.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListCommentsParams {
    pub page: Option<u64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CommentPageResponse {
    pub comments: Vec<ThreadedCommentResponse>,
    pub total: u64,
    pub page: u64,
    pub limit: i64,
}

impl From<CommentPage> for CommentPageResponse {
    fn from(page: CommentPage) -> Self {
        Self {
            comments: page.comments.into_iter().map(Into::into).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RepliesResponse {
    pub replies: Vec<CommentResponse>,
}
