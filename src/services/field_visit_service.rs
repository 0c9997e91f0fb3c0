use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde_json::json;
use std::sync::Arc;

use crate::entities::{assigned_visits, field_visits};
use crate::error::{AppError, AppResult};
use crate::models::*;

#[derive(Clone)]
pub struct FieldVisitService {
    pool: Arc<DatabaseConnection>,
}

impl FieldVisitService {
    pub fn new(pool: Arc<DatabaseConnection>) -> Self {
        Self { pool }
    }

    /// Persists a field report and, when it references an assigned visit,
    /// marks that assignment completed. A dangling assignment reference is
    /// ignored rather than failing the report.
    pub async fn create_field_visit(
        &self,
        distributor_id: i64,
        data: CreateFieldVisit,
    ) -> AppResult<FieldVisitResponse> {
        let visit_type = data
            .visit_type
            .ok_or_else(|| AppError::ValidationError("Visit type is required".to_string()))?;

        let (latitude, longitude) = match (data.latitude, data.longitude) {
            (Some(lat), Some(lng)) if lat.is_finite() && lng.is_finite() => (lat, lng),
            _ => {
                return Err(AppError::ValidationError(
                    "Invalid location coordinates".to_string(),
                ));
            }
        };

        let visit = field_visits::ActiveModel {
            distributor_id: Set(distributor_id),
            assigned_visit_id: Set(data.assigned_visit_id),
            visit_type: Set(visit_type),
            name: Set(data.name),
            village: Set(data.village),
            attendees: Set(data.attendees),
            category: Set(data.category),
            business_potential: Set(data.business_potential),
            notes: Set(data.notes),
            photo_urls: Set(json!(data.photo_urls)),
            latitude: Set(latitude),
            longitude: Set(longitude),
            sale_type: Set(data.sale_type),
            product_sku: Set(data.product_sku),
            pack_size: Set(data.pack_size),
            quantity: Set(data.quantity),
            buyer_type: Set(data.buyer_type),
            buyer_name: Set(data.buyer_name),
            repeat_order: Set(data.repeat_order),
            visit_outcome: Set(data.visit_outcome.unwrap_or(VisitOutcome::Interested)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        if let Some(assigned_visit_id) = visit.assigned_visit_id {
            self.complete_assignment(distributor_id, assigned_visit_id)
                .await?;
        }

        Ok(FieldVisitResponse::from(visit))
    }

    async fn complete_assignment(&self, distributor_id: i64, visit_id: i64) -> AppResult<()> {
        let assignment = assigned_visits::Entity::find_by_id(visit_id)
            .filter(assigned_visits::Column::DistributorId.eq(distributor_id))
            .filter(assigned_visits::Column::Status.eq(VisitStatus::Pending))
            .one(self.pool.as_ref())
            .await?;

        // Already completed or never existed; the report stands either way
        let Some(assignment) = assignment else {
            return Ok(());
        };

        let mut model = assignment.into_active_model();
        model.status = Set(VisitStatus::Completed);
        model.completed_at = Set(Some(Utc::now()));
        model.update(self.pool.as_ref()).await?;

        Ok(())
    }

    pub async fn visit_history(
        &self,
        distributor_id: i64,
        pagination: PaginationParams,
    ) -> AppResult<PaginatedResponse<FieldVisitResponse>> {
        let total = field_visits::Entity::find()
            .filter(field_visits::Column::DistributorId.eq(distributor_id))
            .count(self.pool.as_ref())
            .await?;

        let visits = field_visits::Entity::find()
            .filter(field_visits::Column::DistributorId.eq(distributor_id))
            .order_by_desc(field_visits::Column::CreatedAt)
            .offset(pagination.get_offset() as u64)
            .limit(pagination.get_limit() as u64)
            .all(self.pool.as_ref())
            .await?;

        Ok(PaginatedResponse::new(
            visits.into_iter().map(FieldVisitResponse::from).collect(),
            pagination.page.unwrap_or(1).max(1),
            pagination.get_limit(),
            total as i64,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn report() -> CreateFieldVisit {
        CreateFieldVisit {
            visit_type: Some(VisitType::OneOnOne),
            name: Some("Mohan".to_string()),
            village: Some("Rampur".to_string()),
            category: Some(Category::Farmer),
            latitude: Some(28.81),
            longitude: Some(79.02),
            ..Default::default()
        }
    }

    fn stored_visit(id: i64, assigned_visit_id: Option<i64>) -> field_visits::Model {
        field_visits::Model {
            id,
            distributor_id: 1,
            assigned_visit_id,
            visit_type: VisitType::OneOnOne,
            name: Some("Mohan".to_string()),
            village: Some("Rampur".to_string()),
            attendees: None,
            category: Some(Category::Farmer),
            business_potential: None,
            notes: None,
            photo_urls: json!([]),
            latitude: 28.81,
            longitude: 79.02,
            sale_type: None,
            product_sku: None,
            pack_size: None,
            quantity: None,
            buyer_type: None,
            buyer_name: None,
            repeat_order: false,
            visit_outcome: VisitOutcome::Interested,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_visit_type() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = FieldVisitService::new(Arc::new(db));

        let mut data = report();
        data.visit_type = None;
        let err = service.create_field_visit(1, data).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_requires_finite_coordinates() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = FieldVisitService::new(Arc::new(db));

        let mut data = report();
        data.latitude = Some(f64::NAN);
        let err = service.create_field_visit(1, data).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let service = FieldVisitService::new(Arc::new(db));
        let mut data = report();
        data.longitude = None;
        let err = service.create_field_visit(1, data).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_create_without_assignment_skips_completion() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored_visit(10, None)]])
            .into_connection();
        let service = FieldVisitService::new(Arc::new(db));

        let visit = service.create_field_visit(1, report()).await.unwrap();
        assert_eq!(visit.id, 10);
        assert_eq!(visit.assigned_visit_id, None);
    }

    #[tokio::test]
    async fn test_create_completes_linked_pending_assignment() {
        let pending = assigned_visits::Model {
            id: 5,
            distributor_id: 1,
            distributor_code: "DIST1001".to_string(),
            village: "Rampur, India".to_string(),
            notes: None,
            visit_date: Utc::now(),
            status: VisitStatus::Pending,
            longitude: 79.02,
            latitude: 28.81,
            completed_at: None,
            created_at: Utc::now(),
        };
        let mut completed = pending.clone();
        completed.status = VisitStatus::Completed;
        completed.completed_at = Some(Utc::now());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results(vec![vec![stored_visit(12, Some(5))]])
                .append_query_results(vec![vec![pending]])
                .append_query_results(vec![vec![completed]])
                .into_connection(),
        );
        let service = FieldVisitService::new(db.clone());

        let mut data = report();
        data.assigned_visit_id = Some(5);
        let visit = service.create_field_visit(1, data).await.unwrap();
        assert_eq!(visit.assigned_visit_id, Some(5));

        drop(service);
        let db = Arc::try_unwrap(db).expect("no other handles");
        let log = format!("{:?}", db.into_transaction_log()).replace("\\\"", "\"");
        assert!(log.contains(r#"UPDATE "assigned_visits""#));
        assert!(log.contains("completed"));
    }

    #[tokio::test]
    async fn test_create_tolerates_missing_assignment() {
        // Insert succeeds, assignment lookup comes back empty
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![stored_visit(11, Some(99))]])
            .append_query_results(vec![Vec::<assigned_visits::Model>::new()])
            .into_connection();
        let service = FieldVisitService::new(Arc::new(db));

        let mut data = report();
        data.assigned_visit_id = Some(99);
        let visit = service.create_field_visit(1, data).await.unwrap();
        assert_eq!(visit.assigned_visit_id, Some(99));
    }
}
