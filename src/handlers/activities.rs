use axum::{extract::State, response::IntoResponse, Json};

use crate::dtos::ActivitiesResponse;
use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::startup::AppState;

pub async fn list_activities(
    State(state): State<AppState>,
    actor: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let activities = state.activity.list_for(&actor.id).await?;
    Ok(Json(ActivitiesResponse {
        activities: activities.into_iter().map(Into::into).collect(),
    }))
}
