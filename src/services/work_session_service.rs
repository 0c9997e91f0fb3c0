use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use std::sync::Arc;

use crate::entities::work_sessions;
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Clone)]
pub struct WorkSessionService {
    pool: Arc<DatabaseConnection>,
}

impl WorkSessionService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    async fn active_session(&self, distributor_id: i64) -> AppResult<Option<work_sessions::Model>> {
        let session = work_sessions::Entity::find()
            .filter(work_sessions::Column::DistributorId.eq(distributor_id))
            .filter(work_sessions::Column::IsActive.eq(true))
            .one(self.pool.as_ref())
            .await?;
        Ok(session)
    }

    /// At most one active session per distributor. The partial unique index
    /// on (distributor_id) WHERE is_active backs this up when two starts race.
    pub async fn start_work(&self, distributor_id: i64) -> AppResult<WorkSessionResponse> {
        if self.active_session(distributor_id).await?.is_some() {
            return Err(AppError::Conflict("Work already started".to_string()));
        }

        let session = work_sessions::ActiveModel {
            distributor_id: Set(distributor_id),
            start_time: Set(Utc::now()),
            end_time: Set(None),
            is_active: Set(true),
            distance_travelled: Set(0.0),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(|e| {
            AppError::unique_violation_as(e, AppError::Conflict("Work already started".to_string()))
        })?;

        Ok(WorkSessionResponse::from(session))
    }

    pub async fn end_work(&self, distributor_id: i64) -> AppResult<WorkSessionResponse> {
        let session = self
            .active_session(distributor_id)
            .await?
            .ok_or_else(|| AppError::ValidationError("No active session found".to_string()))?;

        let mut model = session.into_active_model();
        model.end_time = Set(Some(Utc::now()));
        model.is_active = Set(false);
        let session = model.update(self.pool.as_ref()).await?;

        Ok(WorkSessionResponse::from(session))
    }

    pub async fn work_status(&self, distributor_id: i64) -> AppResult<WorkStatusResponse> {
        let active = self.active_session(distributor_id).await?.is_some();
        Ok(WorkStatusResponse { active })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn active(id: i64, distributor_id: i64) -> work_sessions::Model {
        work_sessions::Model {
            id,
            distributor_id,
            start_time: Utc::now(),
            end_time: None,
            is_active: true,
            distance_travelled: 0.0,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_start_work_rejects_second_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![active(1, 5)]])
            .into_connection();
        let service = WorkSessionService::new(Arc::new(db));

        let err = service.start_work(5).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_start_work_opens_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<work_sessions::Model>::new()])
            .append_query_results(vec![vec![active(7, 5)]])
            .into_connection();
        let service = WorkSessionService::new(Arc::new(db));

        let session = service.start_work(5).await.unwrap();
        assert!(session.is_active);
        assert_eq!(session.end_time, None);
    }

    #[tokio::test]
    async fn test_end_work_without_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<work_sessions::Model>::new()])
            .into_connection();
        let service = WorkSessionService::new(Arc::new(db));

        let err = service.end_work(5).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_work_status_reflects_active_session() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![active(1, 5)]])
            .append_query_results(vec![Vec::<work_sessions::Model>::new()])
            .into_connection();
        let service = WorkSessionService::new(Arc::new(db));

        assert!(service.work_status(5).await.unwrap().active);
        assert!(!service.work_status(5).await.unwrap().active);
    }
}
