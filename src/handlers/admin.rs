use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::AdminUser;
use crate::models::*;
use crate::services::{AdminService, DashboardService, VisitService};

#[utoipa::path(
    post,
    path = "/admin/create-distributor",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateDistributorRequest,
    responses(
        (status = 200, description = "Distributor created", body = DistributorResponse),
        (status = 400, description = "Invalid or duplicate mobile/Aadhaar"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn create_distributor(
    _admin: AdminUser,
    admin_service: web::Data<AdminService>,
    request: web::Json<CreateDistributorRequest>,
) -> Result<HttpResponse> {
    match admin_service.create_distributor(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/admin/remove-distributor",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = RemoveDistributorRequest,
    responses(
        (status = 200, description = "Distributor disabled"),
        (status = 404, description = "Distributor not found"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn remove_distributor(
    _admin: AdminUser,
    admin_service: web::Data<AdminService>,
    request: web::Json<RemoveDistributorRequest>,
) -> Result<HttpResponse> {
    match admin_service
        .remove_distributor(&request.distributor_code)
        .await
    {
        Ok(()) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "message": "Distributor removed"
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/distributors",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All distributors with live session flags"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn list_distributors(
    _admin: AdminUser,
    admin_service: web::Data<AdminService>,
) -> Result<HttpResponse> {
    match admin_service.list_distributors().await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/search-distributors",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(("query" = Option<String>, Query, description = "Name or code fragment")),
    responses(
        (status = 200, description = "Matching distributors, at most ten"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn search_distributors(
    _admin: AdminUser,
    admin_service: web::Data<AdminService>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse> {
    match admin_service
        .search_distributors(query.query.as_deref())
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
    path = "/admin/active-distributors",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Count of distributors with an open work session", body = ActiveDistributorCount),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn active_distributors(
    _admin: AdminUser,
    admin_service: web::Data<AdminService>,
) -> Result<HttpResponse> {
    match admin_service.active_distributor_count().await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/dashboard-stats",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Org-wide activity for today", body = DashboardStats),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn dashboard_stats(
    _admin: AdminUser,
    dashboard_service: web::Data<DashboardService>,
) -> Result<HttpResponse> {
    match dashboard_service.dashboard_stats().await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/assign-visit",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = AssignVisitRequest,
    responses(
        (status = 200, description = "Visit assigned", body = AssignedVisitResponse),
        (status = 400, description = "Bad date or unresolvable village"),
        (status = 404, description = "Distributor not found"),
        (status = 403, description = "Admin access required")
    )
)]
pub async fn assign_visit(
    _admin: AdminUser,
    visit_service: web::Data<VisitService>,
    request: web::Json<AssignVisitRequest>,
) -> Result<HttpResponse> {
    match visit_service.assign_visit(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/create-distributor", web::post().to(create_distributor))
            .route("/remove-distributor", web::patch().to(remove_distributor))
            .route("/distributors", web::get().to(list_distributors))
            .route("/search-distributors", web::get().to(search_distributors))
            .route("/active-distributors", web::get().to(active_distributors))
            .route("/dashboard-stats", web::get().to(dashboard_stats))
            // Older app builds fetch the nested path
            .route("/dashboard/stats", web::get().to(dashboard_stats))
            .route("/assign-visit", web::post().to(assign_visit)),
    );
}
