use crate::models::VisitStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "assigned_visits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub distributor_id: i64,
    pub distributor_code: String,
    pub village: String,
    pub notes: Option<String>,
    pub visit_date: DateTime<Utc>,
    pub status: VisitStatus,
    /// GeoJSON coordinate order: longitude first.
    pub longitude: f64,
    pub latitude: f64,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
