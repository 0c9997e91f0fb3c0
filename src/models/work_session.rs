use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::entities::work_sessions;

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkStatusResponse {
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkSessionResponse {
    pub id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub distance_travelled: f64,
}

impl From<work_sessions::Model> for WorkSessionResponse {
    fn from(session: work_sessions::Model) -> Self {
        Self {
            id: session.id,
            start_time: session.start_time,
            end_time: session.end_time,
            is_active: session.is_active,
            distance_travelled: session.distance_travelled,
        }
    }
}
