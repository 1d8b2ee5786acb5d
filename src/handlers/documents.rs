use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::dtos::{
    DocumentResponse, ListDocumentsParams, MessageResponse, RenameRequest, UpdateContentRequest,
    WorkflowRequest, WorkflowResponse,
};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::Role;
use crate::startup::AppState;

pub async fn list_documents(
    State(state): State<AppState>,
    _actor: AuthUser,
    Query(params): Query<ListDocumentsParams>,
) -> Result<impl IntoResponse, AppError> {
    let documents = state.registry.list(params.search.as_deref()).await?;
    let documents: Vec<DocumentResponse> = documents.into_iter().map(Into::into).collect();
    Ok(Json(documents))
}

pub async fn upload_document(
    State(state): State<AppState>,
    actor: AuthUser,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin, Role::Editor])?;

    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut folder_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e))
    })? {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or("unnamed").to_string();
                let mimetype = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| {
                        AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e))
                    })?
                    .to_vec();
                file = Some((filename, mimetype, bytes));
            }
            Some("folderId") => {
                let value = field.text().await.map_err(|e| {
                    AppError::BadRequest(anyhow::anyhow!("Failed to read folderId: {}", e))
                })?;
                if !value.is_empty() {
                    folder_id = Some(value);
                }
            }
            _ => {}
        }
    }

    let (filename, mimetype, bytes) =
        file.ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;

    let document = state
        .registry
        .ingest(&actor, filename, mimetype, bytes, folder_id)
        .await?;
    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

pub async fn get_document(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let document = state.registry.get_document(&document_id).await?;
    Ok(Json(DocumentResponse::from(document)))
}

pub async fn update_workflow(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(document_id): Path<String>,
    Json(payload): Json<WorkflowRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin])?;
    let document = state
        .registry
        .update_workflow(&actor, &document_id, payload.status, payload.reviewer_ids)
        .await?;
    Ok(Json(WorkflowResponse {
        message: "Workflow updated".to_string(),
        document: document.into(),
    }))
}

pub async fn download_file(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let (document, bytes) = state.registry.download(&file_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, document.mimetype),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", document.filename),
            ),
        ],
        bytes,
    ))
}

pub async fn rename_document(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(document_id): Path<String>,
    Json(payload): Json<RenameRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin, Role::Editor])?;
    state
        .registry
        .rename(&actor, &document_id, &payload.filename)
        .await?;
    Ok(Json(MessageResponse::new("Document renamed")))
}

pub async fn update_content(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(document_id): Path<String>,
    Json(payload): Json<UpdateContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin, Role::Editor])?;
    state
        .registry
        .update_content(&actor, &document_id, &payload.content)
        .await?;
    Ok(Json(MessageResponse::new("Document updated")))
}

pub async fn delete_document(
    State(state): State<AppState>,
    actor: AuthUser,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin])?;
    state.registry.delete(&actor, &document_id).await?;
    Ok(Json(MessageResponse::new("Document deleted")))
}
