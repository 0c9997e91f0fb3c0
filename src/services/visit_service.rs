use chrono::{DateTime, Duration, Local, Utc};
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde_json::json;
use std::sync::{Arc, OnceLock};

use crate::entities::{assigned_visits, notifications, users};
use crate::error::{AppError, AppResult};
use crate::external::{GeocodedPlace, NominatimService};
use crate::models::*;
use crate::utils::local_day_bounds;

/// Admins occasionally assign a visit "for right now"; allow the clock to be
/// this far behind before calling the date a past date.
const PAST_TOLERANCE_SECONDS: i64 = 60;

fn comma_spacing() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*,\s*").expect("valid comma pattern"))
}

/// Canonical form fed to the geocoder. Collapses spacing around commas and
/// anchors the query to India so ambiguous village names resolve locally.
pub fn normalize_village(village: &str) -> String {
    let trimmed = village.trim();
    let collapsed = comma_spacing().replace_all(trimmed, ",");
    let mut normalized = collapsed.into_owned();
    if !normalized.to_lowercase().contains("india") {
        normalized.push_str(", India");
    }
    normalized
}

/// The geocoder's canonical display name is what gets stored and shown, not
/// the admin's raw input.
fn new_assignment(
    distributor_id: i64,
    distributor_code: String,
    notes: Option<String>,
    visit_date: DateTime<Utc>,
    place: &GeocodedPlace,
) -> assigned_visits::ActiveModel {
    assigned_visits::ActiveModel {
        distributor_id: Set(distributor_id),
        distributor_code: Set(distributor_code),
        village: Set(place.display_name.clone()),
        notes: Set(notes),
        visit_date: Set(visit_date),
        status: Set(VisitStatus::Pending),
        longitude: Set(place.longitude),
        latitude: Set(place.latitude),
        completed_at: Set(None),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
}

fn assignment_notice(village: &str, visit_date: DateTime<Utc>) -> String {
    let local = visit_date.with_timezone(&Local);
    format!("Visit {} on {}", village, local.format("%-d %b %Y at %-I:%M %p"))
}

#[derive(Clone)]
pub struct VisitService {
    pool: Arc<DatabaseConnection>,
    nominatim_service: NominatimService,
}

impl VisitService {
    pub fn new(pool: Arc<DatabaseConnection>, nominatim_service: NominatimService) -> Self {
        Self {
            pool,
            nominatim_service,
        }
    }

    pub async fn assign_visit(
        &self,
        request: AssignVisitRequest,
    ) -> AppResult<AssignedVisitResponse> {
        if request.distributor_code.trim().is_empty() || request.village.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Distributor, village and visit date are required".to_string(),
            ));
        }

        let visit_date = DateTime::parse_from_rfc3339(&request.visit_date)
            .map(|d| d.with_timezone(&Utc))
            .map_err(|_| AppError::ValidationError("Invalid visit date".to_string()))?;

        if visit_date < Utc::now() - Duration::seconds(PAST_TOLERANCE_SECONDS) {
            return Err(AppError::ValidationError(
                "Cannot assign a visit in the past".to_string(),
            ));
        }

        // Resolve the distributor before spending a geocoder call
        let code = request.distributor_code.trim().to_uppercase();
        let distributor = users::Entity::find()
            .filter(users::Column::DistributorCode.eq(code.clone()))
            .filter(users::Column::Role.eq(Role::Distributor))
            .filter(users::Column::Status.eq(UserStatus::Active))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Distributor not found".to_string()))?;

        let query = normalize_village(&request.village);
        let place = self
            .nominatim_service
            .geocode(&query)
            .await?
            .ok_or_else(|| AppError::ValidationError("Invalid village/location".to_string()))?;

        let visit = new_assignment(distributor.id, code, request.notes, visit_date, &place)
            .insert(self.pool.as_ref())
            .await?;

        notifications::ActiveModel {
            user_id: Set(distributor.id),
            title: Set("New Visit Assigned".to_string()),
            message: Set(assignment_notice(&visit.village, visit_date)),
            kind: Set("visit_assigned".to_string()),
            meta: Set(json!({ "visit_id": visit.id })),
            read: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await?;

        Ok(AssignedVisitResponse::from(visit))
    }

    /// Today's totals for the distributor home screen.
    pub async fn distributor_stats(&self, distributor_id: i64) -> AppResult<DistributorStats> {
        let (start, end) = local_day_bounds();

        let todays = assigned_visits::Entity::find()
            .filter(assigned_visits::Column::DistributorId.eq(distributor_id))
            .filter(assigned_visits::Column::VisitDate.gte(start))
            .filter(assigned_visits::Column::VisitDate.lt(end))
            .count(self.pool.as_ref())
            .await?;

        let completed = assigned_visits::Entity::find()
            .filter(assigned_visits::Column::DistributorId.eq(distributor_id))
            .filter(assigned_visits::Column::Status.eq(VisitStatus::Completed))
            .filter(assigned_visits::Column::VisitDate.gte(start))
            .filter(assigned_visits::Column::VisitDate.lt(end))
            .count(self.pool.as_ref())
            .await?;

        Ok(DistributorStats {
            todays_visits: todays as i64,
            completed: completed as i64,
            pending: todays as i64 - completed as i64,
        })
    }

    /// Pending visits scheduled for today, soonest first.
    pub async fn todays_visits(&self, distributor_id: i64) -> AppResult<Vec<AssignedVisitResponse>> {
        let (start, end) = local_day_bounds();

        let visits = assigned_visits::Entity::find()
            .filter(assigned_visits::Column::DistributorId.eq(distributor_id))
            .filter(assigned_visits::Column::Status.eq(VisitStatus::Pending))
            .filter(assigned_visits::Column::VisitDate.gte(start))
            .filter(assigned_visits::Column::VisitDate.lt(end))
            .order_by_asc(assigned_visits::Column::VisitDate)
            .all(self.pool.as_ref())
            .await?;

        Ok(visits.into_iter().map(AssignedVisitResponse::from).collect())
    }

    /// Pending visits whose date is already behind us.
    pub async fn overdue_visits(
        &self,
        distributor_id: i64,
    ) -> AppResult<Vec<AssignedVisitResponse>> {
        let (start, _) = local_day_bounds();

        let visits = assigned_visits::Entity::find()
            .filter(assigned_visits::Column::DistributorId.eq(distributor_id))
            .filter(assigned_visits::Column::Status.eq(VisitStatus::Pending))
            .filter(assigned_visits::Column::VisitDate.lt(start))
            .order_by_asc(assigned_visits::Column::VisitDate)
            .all(self.pool.as_ref())
            .await?;

        Ok(visits.into_iter().map(AssignedVisitResponse::from).collect())
    }

    pub async fn upcoming_visits(
        &self,
        distributor_id: i64,
    ) -> AppResult<Vec<AssignedVisitResponse>> {
        let (_, end) = local_day_bounds();

        let visits = assigned_visits::Entity::find()
            .filter(assigned_visits::Column::DistributorId.eq(distributor_id))
            .filter(assigned_visits::Column::Status.eq(VisitStatus::Pending))
            .filter(assigned_visits::Column::VisitDate.gte(end))
            .order_by_asc(assigned_visits::Column::VisitDate)
            .all(self.pool.as_ref())
            .await?;

        Ok(visits.into_iter().map(AssignedVisitResponse::from).collect())
    }

    /// Every pending visit with coordinates, for the route map.
    pub async fn map_visits(&self, distributor_id: i64) -> AppResult<Vec<MapVisitResponse>> {
        let visits = assigned_visits::Entity::find()
            .filter(assigned_visits::Column::DistributorId.eq(distributor_id))
            .filter(assigned_visits::Column::Status.eq(VisitStatus::Pending))
            .order_by_asc(assigned_visits::Column::VisitDate)
            .all(self.pool.as_ref())
            .await?;

        Ok(visits.into_iter().map(MapVisitResponse::from).collect())
    }

    /// Marks a visit completed. Idempotent: completing an already completed
    /// visit keeps the original completion time.
    pub async fn complete_visit(
        &self,
        distributor_id: i64,
        visit_id: i64,
    ) -> AppResult<AssignedVisitResponse> {
        let visit = assigned_visits::Entity::find_by_id(visit_id)
            .filter(assigned_visits::Column::DistributorId.eq(distributor_id))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound("Visit not found".to_string()))?;

        if visit.status == VisitStatus::Completed {
            return Ok(AssignedVisitResponse::from(visit));
        }

        let mut model = visit.into_active_model();
        model.status = Set(VisitStatus::Completed);
        model.completed_at = Set(Some(Utc::now()));
        let updated = model.update(self.pool.as_ref()).await?;

        Ok(AssignedVisitResponse::from(updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeocoderConfig;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn nominatim() -> NominatimService {
        NominatimService::new(GeocoderConfig {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "occamy-app".to_string(),
        })
    }

    fn service(db: DatabaseConnection) -> VisitService {
        VisitService::new(Arc::new(db), nominatim())
    }

    fn pending_visit(id: i64, distributor_id: i64) -> assigned_visits::Model {
        assigned_visits::Model {
            id,
            distributor_id,
            distributor_code: "DIST1001".to_string(),
            village: "Rampur, India".to_string(),
            notes: None,
            visit_date: Utc::now(),
            status: VisitStatus::Pending,
            longitude: 79.02,
            latitude: 28.81,
            completed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalize_village_collapses_commas_and_anchors_india() {
        assert_eq!(
            normalize_village(" Rampur ,  Dist X "),
            "Rampur,Dist X, India"
        );
        assert_eq!(normalize_village("Rampur"), "Rampur, India");
        assert_eq!(normalize_village("Rampur, INDIA"), "Rampur, INDIA");
    }

    #[test]
    fn test_assignment_stores_geocoded_display_name() {
        let place = GeocodedPlace {
            latitude: 28.81,
            longitude: 79.02,
            display_name: "Rampur, Moradabad Division, Uttar Pradesh, 244901, India".to_string(),
        };

        let model = new_assignment(1, "DIST1001".to_string(), None, Utc::now(), &place);
        assert_eq!(
            model.village.clone().unwrap(),
            "Rampur, Moradabad Division, Uttar Pradesh, 244901, India"
        );
        assert_eq!(model.longitude.clone().unwrap(), 79.02);
        assert_eq!(model.latitude.clone().unwrap(), 28.81);
    }

    #[test]
    fn test_assignment_notice_carries_display_name() {
        let notice = assignment_notice(
            "Rampur, Moradabad Division, Uttar Pradesh, 244901, India",
            Utc::now(),
        );
        assert!(notice.contains("Rampur, Moradabad Division"));
        assert!(notice.starts_with("Visit "));
    }

    #[tokio::test]
    async fn test_assign_visit_rejects_past_date() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let past = (Utc::now() - Duration::minutes(10)).to_rfc3339();

        let err = service(db)
            .assign_visit(AssignVisitRequest {
                distributor_code: "DIST1001".to_string(),
                village: "Rampur".to_string(),
                notes: None,
                visit_date: past,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_assign_visit_rejects_garbage_date() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let err = service(db)
            .assign_visit(AssignVisitRequest {
                distributor_code: "DIST1001".to_string(),
                village: "Rampur".to_string(),
                notes: None,
                visit_date: "tomorrow-ish".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_assign_visit_unknown_distributor() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<users::Model>::new()])
            .into_connection();
        let future = (Utc::now() + Duration::hours(2)).to_rfc3339();

        let err = service(db)
            .assign_visit(AssignVisitRequest {
                distributor_code: "DIST9999".to_string(),
                village: "Rampur".to_string(),
                notes: None,
                visit_date: future,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_complete_visit_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<assigned_visits::Model>::new()])
            .into_connection();

        let err = service(db).complete_visit(1, 42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_complete_visit_is_idempotent() {
        let mut done = pending_visit(7, 1);
        done.status = VisitStatus::Completed;
        let completed_at = Utc::now() - Duration::hours(3);
        done.completed_at = Some(completed_at);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![done]])
            .into_connection();

        let visit = service(db).complete_visit(1, 7).await.unwrap();
        assert_eq!(visit.completed_at, Some(completed_at));
    }

    #[tokio::test]
    async fn test_map_visits_projects_geojson() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![pending_visit(3, 1)]])
            .into_connection();

        let visits = service(db).map_visits(1).await.unwrap();
        assert_eq!(visits.len(), 1);
        assert_eq!(visits[0].location.coordinates, [79.02, 28.81]);
    }
}
