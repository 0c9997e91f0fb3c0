use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::middlewares::AuthUser;
use crate::models::*;
use crate::services::NotificationService;

#[utoipa::path(
    get,
    path = "/distributor/notifications",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(
        ("page" = Option<i64>, Query, description = "Page number, 1-based"),
        ("page_size" = Option<i64>, Query, description = "Rows per page, max 100")
    ),
    responses(
        (status = 200, description = "Own notifications, newest first")
    )
)]
pub async fn list_notifications(
    user: AuthUser,
    notification_service: web::Data<NotificationService>,
    pagination: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    match notification_service
        .list_notifications(user.id, pagination.into_inner())
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
    patch,
    path = "/distributor/notifications/{id}/read",
    tag = "notifications",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Notification id")),
    responses(
        (status = 200, description = "Notification marked read", body = NotificationResponse),
        (status = 404, description = "Notification not found")
    )
)]
pub async fn mark_read(
    user: AuthUser,
    notification_service: web::Data<NotificationService>,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    match notification_service
        .mark_read(user.id, path.into_inner())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn notification_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/distributor/notifications")
            .route("", web::get().to(list_notifications))
            .route("/{id}/read", web::patch().to(mark_read)),
    );
}
