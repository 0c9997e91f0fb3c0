pub mod auth;
pub mod common;
pub mod dashboard;
pub mod field_visit;
pub mod notification;
pub mod pagination;
pub mod user;
pub mod visit;
pub mod work_session;

pub use auth::*;
pub use common::*;
pub use dashboard::*;
pub use field_visit::*;
pub use notification::*;
pub use pagination::*;
pub use user::*;
pub use visit::*;
pub use work_session::*;
