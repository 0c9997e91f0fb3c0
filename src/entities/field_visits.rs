use crate::models::{Category, SaleType, VisitOutcome, VisitType};
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "field_visits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub distributor_id: i64,
    pub assigned_visit_id: Option<i64>,
    pub visit_type: VisitType,
    pub name: Option<String>,
    pub village: Option<String>,
    pub attendees: Option<i32>,
    pub category: Option<Category>,
    pub business_potential: Option<String>,
    pub notes: Option<String>,
    /// JSON array of storage references.
    pub photo_urls: Json,
    pub latitude: f64,
    pub longitude: f64,
    pub sale_type: Option<SaleType>,
    pub product_sku: Option<String>,
    pub pack_size: Option<String>,
    pub quantity: Option<i32>,
    pub buyer_type: Option<String>,
    pub buyer_name: Option<String>,
    pub repeat_order: bool,
    pub visit_outcome: VisitOutcome,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
