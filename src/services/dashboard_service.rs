use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect,
};
use std::sync::Arc;

use crate::entities::{field_visits, users, work_sessions};
use crate::error::AppResult;
use crate::models::*;
use crate::utils::local_day_bounds;

#[derive(FromQueryResult)]
struct QuantitySum {
    total: Option<i64>,
}

#[derive(Clone)]
pub struct DashboardService {
    pool: Arc<DatabaseConnection>,
}

impl DashboardService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    pub async fn dashboard_stats(&self) -> AppResult<DashboardStats> {
        let (start, end) = local_day_bounds();

        let total_distributors = users::Entity::find()
            .filter(users::Column::Role.eq(Role::Distributor))
            .filter(users::Column::Status.eq(UserStatus::Active))
            .count(self.pool.as_ref())
            .await?;

        let active_distributors = work_sessions::Entity::find()
            .filter(work_sessions::Column::IsActive.eq(true))
            .count(self.pool.as_ref())
            .await?;

        let meetings_today = field_visits::Entity::find()
            .filter(field_visits::Column::CreatedAt.gte(start))
            .filter(field_visits::Column::CreatedAt.lt(end))
            .count(self.pool.as_ref())
            .await?;

        let b2b_sales = self.sales_today(SaleType::B2b, start, end).await?;
        let b2c_sales = self.sales_today(SaleType::B2c, start, end).await?;

        Ok(DashboardStats {
            total_distributors: total_distributors as i64,
            active_distributors: active_distributors as i64,
            meetings_today: meetings_today as i64,
            b2b_sales,
            b2c_sales,
        })
    }

    /// Units sold today for one channel. NULL quantities drop out of the sum.
    async fn sales_today(
        &self,
        sale_type: SaleType,
        start: chrono::DateTime<chrono::Utc>,
        end: chrono::DateTime<chrono::Utc>,
    ) -> AppResult<i64> {
        let row = field_visits::Entity::find()
            .select_only()
            .column_as(field_visits::Column::Quantity.sum(), "total")
            .filter(field_visits::Column::SaleType.eq(sale_type))
            .filter(field_visits::Column::CreatedAt.gte(start))
            .filter(field_visits::Column::CreatedAt.lt(end))
            .into_model::<QuantitySum>()
            .one(self.pool.as_ref())
            .await?;

        Ok(row.and_then(|r| r.total).unwrap_or(0))
    }
}
