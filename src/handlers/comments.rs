use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::dtos::{
    AddCommentRequest, CommentCreatedResponse, CommentPageResponse, ListCommentsParams,
    MessageResponse, RepliesResponse,
};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::Role;
use crate::startup::AppState;

pub async fn add_comment(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(document_id): Path<String>,
    Json(payload): Json<AddCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let comment = state
        .threads
        .add_comment(&actor, &document_id, payload.content, payload.parent_id)
        .await?;
    Ok(Json(CommentCreatedResponse {
        comment: comment.into(),
    }))
}

pub async fn list_comments(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(document_id): Path<String>,
    Query(params): Query<ListCommentsParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state
        .threads
        .list_top_level(&document_id, params.page, params.limit)
        .await?;
    Ok(Json(CommentPageResponse::from(page)))
}

pub async fn list_replies(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(parent_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let replies = state.threads.list_replies(&parent_id).await?;
    Ok(Json(RepliesResponse {
        replies: replies.into_iter().map(Into::into).collect(),
    }))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(comment_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin, Role::Editor])?;
    state.threads.delete_comment(&comment_id).await?;
    Ok(Json(MessageResponse::new("Comment deleted")))
}
