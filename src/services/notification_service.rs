use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;

use crate::entities::notifications;
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Clone)]
pub struct NotificationService {
    pool: Arc<DatabaseConnection>,
}

impl NotificationService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    pub async fn list_notifications(
        &self,
        user_id: i64,
        pagination: PaginationParams,
    ) -> AppResult<PaginatedResponse<NotificationResponse>> {
        let total = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .count(self.pool.as_ref())
            .await?;

        let items = notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .offset(pagination.get_offset() as u64)
            .limit(pagination.get_limit() as u64)
            .all(self.pool.as_ref())
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(NotificationResponse::from).collect(),
            pagination.page.unwrap_or(1).max(1),
            pagination.get_limit(),
            total as i64,
        ))
    }

    /// Scoped to the owner so one user cannot mark another's notification.
    pub async fn mark_read(
        &self,
        user_id: i64,
        notification_id: i64,
    ) -> AppResult<NotificationResponse> {
        let notification = notifications::Entity::find_by_id(notification_id)
            .filter(notifications::Column::UserId.eq(user_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;

        if notification.read {
            return Ok(NotificationResponse::from(notification));
        }

        let mut model = notification.into_active_model();
        model.read = Set(true);
        let updated = model.update(self.pool.as_ref()).await?;

        Ok(NotificationResponse::from(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    fn notification(id: i64, user_id: i64, read: bool) -> notifications::Model {
        notifications::Model {
            id,
            user_id,
            title: "New Visit Assigned".to_string(),
            message: "Visit Rampur, India on 1 Sep 2026 at 10:00 AM".to_string(),
            kind: "visit_assigned".to_string(),
            meta: json!({ "visit_id": 4 }),
            read,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_mark_read_scoped_to_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<notifications::Model>::new()])
            .into_connection();
        let service = NotificationService::new(Arc::new(db));

        let err = service.mark_read(2, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![notification(1, 2, true)]])
            .into_connection();
        let service = NotificationService::new(Arc::new(db));

        let n = service.mark_read(2, 1).await.unwrap();
        assert!(n.read);
    }
}
