use serde::Serialize;

use crate::models::{Activity, ActivityAction};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityResponse {
    pub id: String,
    pub action: ActivityAction,
    pub user_id: String,
    pub user_email: String,
    pub details: String,
    pub timestamp: String,
}

impl From<Activity> for ActivityResponse {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            action: activity.action,
            user_id: activity.user_id,
            user_email: activity.user_email,
            details: activity.details,
            timestamp: activity.timestamp.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivitiesResponse {
    pub activities: Vec<ActivityResponse>,
}
