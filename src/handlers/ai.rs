use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::dtos::{SearchRequest, SearchResponse, SummarizeParams, SummarizeResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::startup::AppState;

pub async fn search_documents(
    State(state): State<AppState>,
    _actor: AuthUser,
    Json(payload): Json<SearchRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;
    let results = state.registry.search(&payload.query).await?;
    Ok(Json(SearchResponse {
        results: results.into_iter().map(Into::into).collect(),
    }))
}

pub async fn summarize_document(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(document_id): Path<String>,
    Query(params): Query<SummarizeParams>,
) -> Result<impl IntoResponse, AppError> {
    let force_refresh = params.force_refresh.unwrap_or(false);
    let summary = state.registry.summarize(&document_id, force_refresh).await?;
    Ok(Json(SummarizeResponse { summary }))
}
