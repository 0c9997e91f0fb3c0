use crate::entities::users;
use crate::error::{AppError, AppResult};
use rand::Rng;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Uniformly random 6-digit OTP code.
pub fn generate_otp_code() -> String {
    let mut rng = rand::thread_rng();
    format!("{:06}", rng.gen_range(0..=999_999))
}

const DISTRIBUTOR_CODE_ATTEMPTS: usize = 20;

/// Allocates a `DIST` + 4 digit code not yet taken by any user. The retry
/// loop is bounded; the unique index on distributor_code is the real
/// guarantee under concurrent creation.
pub async fn generate_unique_distributor_code(db: &DatabaseConnection) -> AppResult<String> {
    for _ in 0..DISTRIBUTOR_CODE_ATTEMPTS {
        let candidate = {
            let mut rng = rand::thread_rng();
            format!("DIST{}", rng.gen_range(1000..=9999))
        };

        let existing = users::Entity::find()
            .filter(users::Column::DistributorCode.eq(candidate.clone()))
            .one(db)
            .await?;

        if existing.is_none() {
            return Ok(candidate);
        }
    }

    Err(AppError::InternalError(
        "Could not allocate a distributor code".to_string(),
    ))
}
