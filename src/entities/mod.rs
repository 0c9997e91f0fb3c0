pub mod assigned_visits;
pub mod field_visits;
pub mod notifications;
pub mod otps;
pub mod users;
pub mod work_sessions;
