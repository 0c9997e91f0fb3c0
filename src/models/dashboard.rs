use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardStats {
    pub total_distributors: i64,
    pub active_distributors: i64,
    pub meetings_today: i64,
    pub b2b_sales: i64,
    pub b2c_sales: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ActiveDistributorCount {
    pub active_distributors: i64,
}
