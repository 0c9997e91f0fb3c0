use chrono::{DateTime, Utc};
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::users;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "distributor")]
    Distributor,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Distributor => write!(f, "distributor"),
        }
    }
}

/// Identity lifecycle. Disabling is the only removal path; user rows are
/// never hard-deleted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(20))")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "disabled")]
    Disabled,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateDistributorRequest {
    #[schema(example = "Ravi Kumar")]
    pub name: String,
    #[schema(example = "9000000001")]
    pub mobile: String,
    #[schema(example = "Maharashtra")]
    pub state: Option<String>,
    #[schema(example = "Pune")]
    pub district: Option<String>,
    #[schema(example = "123456789012")]
    pub aadhaar: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RemoveDistributorRequest {
    #[schema(example = "DIST1001")]
    pub distributor_code: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SearchQuery {
    pub query: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DistributorResponse {
    pub id: i64,
    pub name: String,
    pub mobile: String,
    pub distributor_code: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<users::Model> for DistributorResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            mobile: user.mobile,
            distributor_code: user.distributor_code.unwrap_or_default(),
            state: user.state,
            district: user.district,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

/// Distributor list entry with the live work-session flag.
#[derive(Debug, Serialize, ToSchema)]
pub struct DistributorListItem {
    pub id: i64,
    pub name: String,
    pub distributor_code: String,
    pub state: Option<String>,
    pub district: Option<String>,
    pub status: UserStatus,
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DistributorSearchItem {
    pub id: i64,
    pub name: String,
    pub distributor_code: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DistributorProfile {
    pub id: i64,
    pub name: String,
    pub distributor_code: String,
    pub mobile: String,
    pub state: Option<String>,
    pub district: Option<String>,
}

impl From<users::Model> for DistributorProfile {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            distributor_code: user.distributor_code.unwrap_or_default(),
            mobile: user.mobile,
            state: user.state,
            district: user.district,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Role::Distributor).unwrap(),
            "\"distributor\""
        );
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UserStatus::Disabled).unwrap(),
            "\"disabled\""
        );
    }
}
