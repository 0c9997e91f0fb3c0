use crate::config::DemoConfig;
use crate::entities::users;
use crate::error::AppResult;
use crate::models::{Role, UserStatus};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

/// Seeds a demo admin and distributor so the app is usable out of the box
/// in demo deployments. Only runs when demo login mode is enabled.
pub async fn seed_demo_users(db: &DatabaseConnection, demo: &DemoConfig) -> AppResult<()> {
    if !demo.enabled {
        return Ok(());
    }

    let now = Utc::now();

    let admin_mobile = "9999999999";
    let admin_exists = users::Entity::find()
        .filter(users::Column::Mobile.eq(admin_mobile))
        .one(db)
        .await?;

    if admin_exists.is_none() {
        users::ActiveModel {
            name: Set("Demo Admin".to_string()),
            mobile: Set(admin_mobile.to_string()),
            role: Set(Role::Admin),
            distributor_code: Set(None),
            state: Set(None),
            district: Set(None),
            status: Set(UserStatus::Active),
            aadhaar: Set("111122223333".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        log::info!("Seeded demo admin ({admin_mobile})");
    }

    let distributor_mobile = "8888888888";
    let distributor_exists = users::Entity::find()
        .filter(users::Column::Mobile.eq(distributor_mobile))
        .one(db)
        .await?;

    if distributor_exists.is_none() {
        users::ActiveModel {
            name: Set("Demo Distributor".to_string()),
            mobile: Set(distributor_mobile.to_string()),
            role: Set(Role::Distributor),
            distributor_code: Set(Some("DIST1001".to_string())),
            state: Set(Some("Maharashtra".to_string())),
            district: Set(Some("Pune".to_string())),
            status: Set(UserStatus::Active),
            aadhaar: Set("444455556666".to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;

        log::info!("Seeded demo distributor ({distributor_mobile})");
    }

    Ok(())
}
