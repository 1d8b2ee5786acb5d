use axum::{extract::State, response::IntoResponse, Json};

use crate::dtos::{MeResponse, UsersResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::Role;
use crate::startup::AppState;

pub async fn me(actor: AuthUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(MeResponse {
        role: actor.role,
        email: actor.email,
    }))
}

pub async fn list_users(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    actor.require(&[Role::Admin])?;
    let users = state.store.list_users().await?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}
