use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::{AuthUser, DistributorUser};
use crate::models::*;
use crate::services::WorkSessionService;

#[utoipa::path(
    post,
    path = "/work/start",
    tag = "work",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session opened", body = WorkSessionResponse),
        (status = 409, description = "Work already started"),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn start_work(
    user: DistributorUser,
    work_session_service: web::Data<WorkSessionService>,
) -> Result<HttpResponse> {
    match work_session_service.start_work(user.0.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    patch,
    path = "/work/end",
    tag = "work",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Session closed", body = WorkSessionResponse),
        (status = 400, description = "No active session found"),
        (status = 403, description = "Distributor access required")
    )
)]
pub async fn end_work(
    user: DistributorUser,
    work_session_service: web::Data<WorkSessionService>,
) -> Result<HttpResponse> {
    match work_session_service.end_work(user.0.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/work/status",
    tag = "work",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Whether the caller has an open session", body = WorkStatusResponse)
    )
)]
pub async fn work_status(
    user: AuthUser,
    work_session_service: web::Data<WorkSessionService>,
) -> Result<HttpResponse> {
    match work_session_service.work_status(user.id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn work_session_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/work")
            .route("/start", web::post().to(start_work))
            .route("/end", web::patch().to(end_work))
            .route("/status", web::get().to(work_status)),
    );
}
