use chrono::Utc;
use sea_orm::sea_query::{Expr, extension::postgres::PgExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::entities::{users, work_sessions};
use crate::error::{AppError, AppResult};
use crate::external::TwilioService;
use crate::models::*;
use crate::utils::{generate_unique_distributor_code, normalize_mobile, validate_aadhaar};

const SEARCH_RESULT_LIMIT: u64 = 10;

#[derive(Clone)]
pub struct AdminService {
    pool: Arc<DatabaseConnection>,
    twilio_service: TwilioService,
}

impl AdminService {
    pub fn new(pool: Arc<DatabaseConnection>, twilio_service: TwilioService) -> Self {
        Self {
            pool,
            twilio_service,
        }
    }

    pub async fn create_distributor(
        &self,
        request: CreateDistributorRequest,
    ) -> AppResult<DistributorResponse> {
        if request.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Name, mobile and Aadhaar are required".to_string(),
            ));
        }

        let mobile = normalize_mobile(&request.mobile);
        if mobile.is_empty() {
            return Err(AppError::ValidationError(
                "Name, mobile and Aadhaar are required".to_string(),
            ));
        }

        validate_aadhaar(&request.aadhaar)?;

        let mobile_exists = users::Entity::find()
            .filter(users::Column::Mobile.eq(mobile.clone()))
            .one(self.pool.as_ref())
            .await?;

        if mobile_exists.is_some() {
            return Err(AppError::ValidationError(
                "Mobile already registered".to_string(),
            ));
        }

        let distributor_code = generate_unique_distributor_code(self.pool.as_ref()).await?;
        let now = Utc::now();

        let distributor = users::ActiveModel {
            name: Set(request.name.trim().to_string()),
            mobile: Set(mobile.clone()),
            role: Set(Role::Distributor),
            distributor_code: Set(Some(distributor_code.clone())),
            state: Set(request.state),
            district: Set(request.district),
            status: Set(UserStatus::Active),
            aadhaar: Set(request.aadhaar),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(|e| {
            AppError::unique_violation_as(
                e,
                AppError::ValidationError("Mobile or Aadhaar already registered".to_string()),
            )
        })?;

        // Welcome SMS must never fail creation
        if let Err(e) = self
            .twilio_service
            .send_welcome_sms(&mobile, &distributor_code)
            .await
        {
            log::warn!("Welcome SMS to {mobile} failed: {e}");
        }

        Ok(DistributorResponse::from(distributor))
    }

    /// Soft removal: disables login, keeps the record and everything that
    /// references it.
    pub async fn remove_distributor(&self, distributor_code: &str) -> AppResult<()> {
        let code = distributor_code.trim().to_uppercase();
        if code.is_empty() {
            return Err(AppError::ValidationError(
                "Distributor ID required".to_string(),
            ));
        }

        let distributor = users::Entity::find()
            .filter(users::Column::DistributorCode.eq(code))
            .filter(users::Column::Role.eq(Role::Distributor))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Distributor not found".to_string()))?;

        let mut model = distributor.into_active_model();
        model.status = Set(UserStatus::Disabled);
        model.updated_at = Set(Utc::now());
        model.update(self.pool.as_ref()).await?;

        Ok(())
    }

    pub async fn list_distributors(&self) -> AppResult<Vec<DistributorListItem>> {
        let distributors = users::Entity::find()
            .filter(users::Column::Role.eq(Role::Distributor))
            .order_by_asc(users::Column::Name)
            .all(self.pool.as_ref())
            .await?;

        let active_sessions = work_sessions::Entity::find()
            .filter(work_sessions::Column::IsActive.eq(true))
            .all(self.pool.as_ref())
            .await?;

        let active_ids: HashSet<i64> = active_sessions
            .into_iter()
            .map(|s| s.distributor_id)
            .collect();

        Ok(distributors
            .into_iter()
            .map(|d| {
                let active = active_ids.contains(&d.id);
                DistributorListItem {
                    id: d.id,
                    name: d.name,
                    distributor_code: d.distributor_code.unwrap_or_default(),
                    state: d.state,
                    district: d.district,
                    status: d.status,
                    active,
                }
            })
            .collect())
    }

    pub async fn search_distributors(
        &self,
        query: Option<&str>,
    ) -> AppResult<Vec<DistributorSearchItem>> {
        let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
            return Ok(vec![]);
        };

        let pattern = format!("%{query}%");

        let distributors = users::Entity::find()
            .filter(users::Column::Role.eq(Role::Distributor))
            .filter(
                Condition::any()
                    .add(Expr::col(users::Column::DistributorCode).ilike(pattern.clone()))
                    .add(Expr::col(users::Column::Name).ilike(pattern)),
            )
            .limit(SEARCH_RESULT_LIMIT)
            .all(self.pool.as_ref())
            .await?;

        Ok(distributors
            .into_iter()
            .map(|d| DistributorSearchItem {
                id: d.id,
                name: d.name,
                distributor_code: d.distributor_code.unwrap_or_default(),
            })
            .collect())
    }

    pub async fn active_distributor_count(&self) -> AppResult<ActiveDistributorCount> {
        let active = work_sessions::Entity::find()
            .filter(work_sessions::Column::IsActive.eq(true))
            .count(self.pool.as_ref())
            .await?;

        Ok(ActiveDistributorCount {
            active_distributors: active as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn twilio() -> TwilioService {
        TwilioService::new(crate::config::TwilioConfig {
            account_sid: String::new(),
            auth_token: String::new(),
            from_phone: String::new(),
            country_prefix: "+91".to_string(),
        })
    }

    fn distributor(id: i64, name: &str, code: &str) -> users::Model {
        users::Model {
            id,
            name: name.to_string(),
            mobile: format!("90000000{id:02}"),
            role: Role::Distributor,
            distributor_code: Some(code.to_string()),
            state: None,
            district: None,
            status: UserStatus::Active,
            aadhaar: format!("1234567890{id:02}"),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_distributor_rejects_bad_aadhaar() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = AdminService::new(Arc::new(db), twilio());

        let err = service
            .create_distributor(CreateDistributorRequest {
                name: "Ravi".to_string(),
                mobile: "9000000001".to_string(),
                state: None,
                district: None,
                aadhaar: "1234".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_distributor_rejects_duplicate_mobile() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![distributor(1, "Ravi", "DIST1001")]])
            .into_connection();
        let service = AdminService::new(Arc::new(db), twilio());

        let err = service
            .create_distributor(CreateDistributorRequest {
                name: "Ravi".to_string(),
                mobile: "9000000001".to_string(),
                state: None,
                district: None,
                aadhaar: "123456789012".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_search_empty_query_returns_nothing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = AdminService::new(Arc::new(db), twilio());

        assert!(service.search_distributors(None).await.unwrap().is_empty());
        assert!(
            service
                .search_distributors(Some("  "))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_list_distributors_flags_active_sessions() {
        let session = work_sessions::Model {
            id: 1,
            distributor_id: 2,
            start_time: Utc::now(),
            end_time: None,
            is_active: true,
            distance_travelled: 0.0,
            created_at: Utc::now(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![
                distributor(1, "Asha", "DIST1001"),
                distributor(2, "Ravi", "DIST1002"),
            ]])
            .append_query_results(vec![vec![session]])
            .into_connection();
        let service = AdminService::new(Arc::new(db), twilio());

        let list = service.list_distributors().await.unwrap();
        assert_eq!(list.len(), 2);
        assert!(!list[0].active);
        assert!(list[1].active);
    }
}
