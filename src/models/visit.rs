use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::assigned_visits;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "lowercase")]
pub enum VisitStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "completed")]
    Completed,
}

/// GeoJSON point, `[longitude, latitude]` — coordinate order matters for
/// anything spatial downstream.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: [longitude, latitude],
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssignVisitRequest {
    #[schema(example = "DIST1001")]
    pub distributor_code: String,
    #[schema(example = "Rampur, Uttar Pradesh")]
    pub village: String,
    pub notes: Option<String>,
    /// RFC 3339 timestamp of the scheduled visit.
    #[schema(example = "2026-09-01T10:00:00Z")]
    pub visit_date: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignedVisitResponse {
    pub id: i64,
    pub distributor_id: i64,
    pub distributor_code: String,
    pub village: String,
    pub notes: Option<String>,
    pub visit_date: DateTime<Utc>,
    pub status: VisitStatus,
    pub location: GeoPoint,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<assigned_visits::Model> for AssignedVisitResponse {
    fn from(visit: assigned_visits::Model) -> Self {
        Self {
            id: visit.id,
            distributor_id: visit.distributor_id,
            distributor_code: visit.distributor_code,
            village: visit.village,
            notes: visit.notes,
            visit_date: visit.visit_date,
            status: visit.status,
            location: GeoPoint::new(visit.longitude, visit.latitude),
            completed_at: visit.completed_at,
            created_at: visit.created_at,
        }
    }
}

/// Trimmed view for the distributor's route map.
#[derive(Debug, Serialize, ToSchema)]
pub struct MapVisitResponse {
    pub id: i64,
    pub village: String,
    pub visit_date: DateTime<Utc>,
    pub location: GeoPoint,
}

impl From<assigned_visits::Model> for MapVisitResponse {
    fn from(visit: assigned_visits::Model) -> Self {
        Self {
            id: visit.id,
            village: visit.village,
            visit_date: visit.visit_date,
            location: GeoPoint::new(visit.longitude, visit.latitude),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DistributorStats {
    pub todays_visits: i64,
    pub completed: i64,
    pub pending: i64,
}
