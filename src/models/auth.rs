use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::Role;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendOtpRequest {
    #[schema(example = "9000000001")]
    pub mobile: String,
    #[schema(example = "DIST1001")]
    pub distributor_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SendOtpResponse {
    /// Seconds until the issued code expires.
    pub expires_in: i64,
    /// Only present in demo login mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demo_otp: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyOtpRequest {
    #[schema(example = "9000000001")]
    pub mobile: String,
    #[schema(example = "DIST1001")]
    pub distributor_code: Option<String>,
    #[schema(example = "123456")]
    pub otp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifyOtpResponse {
    pub token: String,
    pub role: Role,
    pub user_id: i64,
    pub name: String,
}
