use std::sync::Arc;

use crate::error::AppError;
use crate::middleware::auth::AuthUser;
use crate::models::{Activity, ActivityAction};
use crate::store::Store;

/// Append-only per-user action feed. Records are written synchronously: an
/// operation that cannot log its activity fails as a whole.
#[derive(Clone)]
pub struct ActivityLog {
    store: Arc<dyn Store>,
}

impl ActivityLog {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn record(
        &self,
        action: ActivityAction,
        actor: &AuthUser,
        details: String,
    ) -> Result<(), AppError> {
        let activity = Activity::new(action, actor.id.clone(), actor.email.clone(), details);
        self.store.insert_activity(&activity).await?;
        tracing::debug!(action = %action, user_id = %activity.user_id, "Recorded activity");
        Ok(())
    }

    pub async fn list_for(&self, user_id: &str) -> Result<Vec<Activity>, AppError> {
        self.store.list_activities_for_user(user_id).await
    }
}
