pub mod code_generator;
pub mod jwt;
pub mod mobile;
pub mod time;

pub use code_generator::{generate_otp_code, generate_unique_distributor_code};
pub use jwt::*;
pub use mobile::*;
pub use time::local_day_bounds;
