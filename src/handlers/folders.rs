use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::dtos::{
    CreateFolderRequest, FolderResponse, FoldersResponse, MessageResponse, MoveDocumentRequest,
};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::Role;
use crate::startup::AppState;

pub async fn create_folder(
    State(state): State<AppState>,
    actor: AuthUser,
    Json(payload): Json<CreateFolderRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin])?;
    payload.validate()?;
    let folder = state
        .hierarchy
        .create_folder(&actor, payload.name, payload.parent_id)
        .await?;
    Ok((StatusCode::CREATED, Json(FolderResponse::from(folder))))
}

pub async fn list_folders(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let folders = state.hierarchy.list_folders(&actor).await?;
    Ok(Json(FoldersResponse {
        folders: folders.into_iter().map(Into::into).collect(),
    }))
}

pub async fn delete_folder(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(folder_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin])?;
    state.hierarchy.delete_folder(&actor, &folder_id).await?;
    Ok(Json(MessageResponse::new("Folder deleted")))
}

pub async fn move_document(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(document_id): Path<String>,
    Json(payload): Json<MoveDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin])?;
    state
        .hierarchy
        .move_document(&actor, &document_id, payload.folder_id)
        .await?;
    Ok(Json(MessageResponse::new("Document moved")))
}
