pub mod connection;
pub mod seed;

pub use connection::{create_pool, run_migrations};
pub use seed::seed_demo_users;
