use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Error half of the response envelope; success responses are built inline
/// in the handlers.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}
