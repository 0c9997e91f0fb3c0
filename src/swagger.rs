use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            )
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::send_otp,
        handlers::auth::verify_otp,
        handlers::admin::create_distributor,
        handlers::admin::remove_distributor,
        handlers::admin::list_distributors,
        handlers::admin::search_distributors,
        handlers::admin::active_distributors,
        handlers::admin::dashboard_stats,
        handlers::admin::assign_visit,
        handlers::distributor::profile,
        handlers::distributor::stats,
        handlers::distributor::todays_visits,
        handlers::distributor::overdue_visits,
        handlers::distributor::upcoming_visits,
        handlers::distributor::map_visits,
        handlers::distributor::complete_visit,
        handlers::distributor::visit_history,
        handlers::field_visit::create_field_visit,
        handlers::work_session::start_work,
        handlers::work_session::end_work,
        handlers::work_session::work_status,
        handlers::notification::list_notifications,
        handlers::notification::mark_read,
    ),
    components(
        schemas(
            Role,
            UserStatus,
            SendOtpRequest,
            SendOtpResponse,
            VerifyOtpRequest,
            VerifyOtpResponse,
            CreateDistributorRequest,
            RemoveDistributorRequest,
            DistributorResponse,
            DistributorListItem,
            DistributorSearchItem,
            DistributorProfile,
            VisitStatus,
            GeoPoint,
            AssignVisitRequest,
            AssignedVisitResponse,
            MapVisitResponse,
            DistributorStats,
            VisitType,
            Category,
            SaleType,
            VisitOutcome,
            FieldVisitResponse,
            WorkStatusResponse,
            WorkSessionResponse,
            NotificationResponse,
            DashboardStats,
            ActiveDistributorCount,
            PaginationParams,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "OTP login API"),
        (name = "admin", description = "Distributor management and assignment API"),
        (name = "distributor", description = "Distributor self-service API"),
        (name = "field-visits", description = "Field report capture API"),
        (name = "work", description = "Work session API"),
        (name = "notifications", description = "Notification inbox API"),
    ),
    info(
        title = "Occamy Backend API",
        version = "1.0.0",
        description = "Field force management REST API documentation"
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
