use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::DistributorUser;
use crate::models::*;
use crate::services::{FieldVisitService, VisitService};

#[utoipa::path(
    get,
    path = "/distributor/me",
    tag = "distributor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = DistributorProfile),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn profile(user: DistributorUser) -> Result<HttpResponse> {
    let user = user.0;
    let profile = DistributorProfile {
        id: user.id,
        name: user.name,
        distributor_code: user.distributor_code.unwrap_or_default(),
        mobile: user.mobile,
        state: user.state,
        district: user.district,
    };
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": profile
    })))
}

#[utoipa::path(
    get,
    path = "/distributor/stats",
    tag = "distributor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Today's visit totals", body = DistributorStats),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn stats(
    user: DistributorUser,
    visit_service: web::Data<VisitService>,
) -> Result<HttpResponse> {
    match visit_service.distributor_stats(user.0.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/distributor/assigned-visits",
    tag = "distributor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending visits scheduled for today"),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn todays_visits(
    user: DistributorUser,
    visit_service: web::Data<VisitService>,
) -> Result<HttpResponse> {
    match visit_service.todays_visits(user.0.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/distributor/pending-visits",
    tag = "distributor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending visits past their date"),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn overdue_visits(
    user: DistributorUser,
    visit_service: web::Data<VisitService>,
) -> Result<HttpResponse> {
    match visit_service.overdue_visits(user.0.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/distributor/upcoming-visits",
    tag = "distributor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending visits after today"),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn upcoming_visits(
    user: DistributorUser,
    visit_service: web::Data<VisitService>,
) -> Result<HttpResponse> {
    match visit_service.upcoming_visits(user.0.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/distributor/map-visits",
    tag = "distributor",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Pending visit coordinates for the route map"),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn map_visits(
    user: DistributorUser,
    visit_service: web::Data<VisitService>,
) -> Result<HttpResponse> {
    match visit_service.map_visits(user.0.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/visits/complete/{id}",
    tag = "distributor",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Assigned visit id")),
    responses(
        (status = 200, description = "Visit marked completed", body = AssignedVisitResponse),
        (status = 404, description = "Visit not found"),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn complete_visit(
    user: DistributorUser,
    visit_service: web::Data<VisitService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match visit_service
        .complete_visit(user.0.id, path.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/distributor/history",
    tag = "distributor",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("page_size" = Option<i64>, Query, description = "Rows per page, max 100")
    ),
    responses(
        (status = 200, description = "Submitted field reports, newest first"),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn visit_history(
    user: DistributorUser,
    field_visit_service: web::Data<FieldVisitService>,
    pagination: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match field_visit_service
        .visit_history(user.0.id, pagination.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn distributor_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/distributor")
            .route("/me", web::get().to(profile))
            .route("/stats", web::get().to(stats))
            .route("/assigned-visits", web::get().to(todays_visits))
            .route("/pending-visits", web::get().to(overdue_visits))
            .route("/upcoming-visits", web::get().to(upcoming_visits))
            .route("/map-visits", web::get().to(map_visits))
            .route("/history", web::get().to(visit_history)),
    );
    cfg.service(
        web::scope("/visits").route("/complete/{id}", web::patch().to(complete_visit)),
    );
}
