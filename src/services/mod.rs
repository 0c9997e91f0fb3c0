pub mod admin_service;
pub mod auth_service;
pub mod dashboard_service;
pub mod field_visit_service;
pub mod notification_service;
pub mod visit_service;
pub mod work_session_service;

pub use admin_service::AdminService;
pub use auth_service::AuthService;
pub use dashboard_service::DashboardService;
pub use field_visit_service::FieldVisitService;
pub use notification_service::NotificationService;
pub use visit_service::VisitService;
pub use work_session_service::WorkSessionService;
