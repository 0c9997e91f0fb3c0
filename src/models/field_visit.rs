use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::entities::field_visits;
use crate::error::AppError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum VisitType {
    #[sea_orm(string_value = "one_on_one")]
    OneOnOne,
    #[sea_orm(string_value = "group")]
    Group,
}

impl FromStr for VisitType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_on_one" => Ok(VisitType::OneOnOne),
            "group" => Ok(VisitType::Group),
            other => Err(AppError::ValidationError(format!(
                "Invalid visit type: {other}"
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[sea_orm(string_value = "farmer")]
    Farmer,
    #[sea_orm(string_value = "seller")]
    Seller,
    #[sea_orm(string_value = "influencer")]
    Influencer,
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farmer" => Ok(Category::Farmer),
            "seller" => Ok(Category::Seller),
            "influencer" => Ok(Category::Influencer),
            other => Err(AppError::ValidationError(format!(
                "Invalid category: {other}"
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(3))")]
pub enum SaleType {
    #[sea_orm(string_value = "B2B")]
    #[serde(rename = "B2B")]
    B2b,
    #[sea_orm(string_value = "B2C")]
    #[serde(rename = "B2C")]
    B2c,
}

impl FromStr for SaleType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "B2B" => Ok(SaleType::B2b),
            "B2C" => Ok(SaleType::B2c),
            other => Err(AppError::ValidationError(format!(
                "Invalid sale type: {other}"
            ))),
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "snake_case")]
pub enum VisitOutcome {
    #[sea_orm(string_value = "interested")]
    Interested,
    #[sea_orm(string_value = "not_interested")]
    NotInterested,
    #[sea_orm(string_value = "follow_up")]
    FollowUp,
    #[sea_orm(string_value = "converted")]
    Converted,
}

impl FromStr for VisitOutcome {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "interested" => Ok(VisitOutcome::Interested),
            "not_interested" => Ok(VisitOutcome::NotInterested),
            "follow_up" => Ok(VisitOutcome::FollowUp),
            "converted" => Ok(VisitOutcome::Converted),
            other => Err(AppError::ValidationError(format!(
                "Invalid visit outcome: {other}"
            ))),
        }
    }
}

/// Field report data as parsed out of the multipart submission, photos
/// already persisted to storage.
#[derive(Debug, Default)]
pub struct CreateFieldVisit {
    pub assigned_visit_id: Option<i64>,
    pub visit_type: Option<VisitType>,
    pub name: Option<String>,
    pub village: Option<String>,
    pub attendees: Option<i32>,
    pub category: Option<Category>,
    pub business_potential: Option<String>,
    pub notes: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub sale_type: Option<SaleType>,
    pub product_sku: Option<String>,
    pub pack_size: Option<String>,
    pub quantity: Option<i32>,
    pub buyer_type: Option<String>,
    pub buyer_name: Option<String>,
    pub repeat_order: bool,
    pub visit_outcome: Option<VisitOutcome>,
    pub photo_urls: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FieldVisitResponse {
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
    pub photo_urls: Vec<String>,
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

impl From<field_visits::Model> for FieldVisitResponse {
    fn from(visit: field_visits::Model) -> Self {
        let photo_urls = serde_json::from_value(visit.photo_urls).unwrap_or_default();
        Self {
            id: visit.id,
            distributor_id: visit.distributor_id,
            assigned_visit_id: visit.assigned_visit_id,
            visit_type: visit.visit_type,
            name: visit.name,
            village: visit.village,
            attendees: visit.attendees,
            category: visit.category,
            business_potential: visit.business_potential,
            notes: visit.notes,
            photo_urls,
            latitude: visit.latitude,
            longitude: visit.longitude,
            sale_type: visit.sale_type,
            product_sku: visit.product_sku,
            pack_size: visit.pack_size,
            quantity: visit.quantity,
            buyer_type: visit.buyer_type,
            buyer_name: visit.buyer_name,
            repeat_order: visit.repeat_order,
            visit_outcome: visit.visit_outcome,
            created_at: visit.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_type_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&SaleType::B2b).unwrap(), "\"B2B\"");
        assert_eq!(serde_json::to_string(&SaleType::B2c).unwrap(), "\"B2C\"");
    }

    #[test]
    fn test_visit_type_parse() {
        assert_eq!("one_on_one".parse::<VisitType>().unwrap(), VisitType::OneOnOne);
        assert_eq!("group".parse::<VisitType>().unwrap(), VisitType::Group);
        assert!("solo".parse::<VisitType>().is_err());
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("farmer".parse::<Category>().unwrap(), Category::Farmer);
        assert!("trader".parse::<Category>().is_err());
    }

    #[test]
    fn test_outcome_parse() {
        assert_eq!(
            "follow_up".parse::<VisitOutcome>().unwrap(),
            VisitOutcome::FollowUp
        );
        assert!("maybe".parse::<VisitOutcome>().is_err());
    }
}
