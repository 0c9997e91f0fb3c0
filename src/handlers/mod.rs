pub mod admin;
pub mod auth;
pub mod distributor;
pub mod field_visit;
pub mod notification;
pub mod work_session;

pub use admin::admin_config;
pub use auth::auth_config;
pub use distributor::distributor_config;
pub use field_visit::field_visit_config;
pub use notification::notification_config;
pub use work_session::work_session_config;
