use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;

use crate::config::DemoConfig;
use crate::entities::{otps, users};
use crate::error::{AppError, AppResult};
use crate::external::TwilioService;
use crate::models::*;
use crate::utils::{JwtService, generate_otp_code, normalize_mobile, validate_mobile};

const OTP_TTL_SECONDS: i64 = 120;
const OTP_COOLDOWN_SECONDS: i64 = 30;

#[derive(Clone)]
pub struct AuthService {
    pool: Arc<DatabaseConnection>,
    jwt_service: JwtService,
    twilio_service: TwilioService,
    demo: DemoConfig,
}

impl AuthService {
    pub fn new(
        pool: Arc<DatabaseConnection>,
        jwt_service: JwtService,
        twilio_service: TwilioService,
        demo: DemoConfig,
    ) -> Self {
        Self {
            pool,
            jwt_service,
            twilio_service,
            demo,
        }
    }

    pub async fn send_otp(&self, request: SendOtpRequest) -> AppResult<SendOtpResponse> {
        let mobile = normalize_mobile(&request.mobile);
        validate_mobile(&mobile)?;

        let distributor_code = request
            .distributor_code
            .as_deref()
            .map(|c| c.trim().to_uppercase());

        // Resolve the user up front so unregistered or blocked mobiles never
        // consume an OTP slot
        self.resolve_user(&mobile, distributor_code.as_deref())
            .await?;

        // Demo mode short-circuits issuance with the fixed code
        if self.demo.allows(&mobile) {
            log::info!("Demo login OTP requested for {mobile}");
            return Ok(SendOtpResponse {
                expires_in: OTP_TTL_SECONDS,
                demo_otp: Some(self.demo.otp.clone()),
            });
        }

        let existing = otps::Entity::find()
            .filter(otps::Column::Mobile.eq(mobile.clone()))
            .one(self.pool.as_ref())
            .await?;

        if let Some(record) = existing {
            let elapsed = (Utc::now() - record.created_at).num_seconds();
            if elapsed < OTP_COOLDOWN_SECONDS {
                return Err(AppError::RateLimited {
                    seconds: OTP_COOLDOWN_SECONDS - elapsed,
                });
            }
            otps::Entity::delete_by_id(record.id).exec(self.pool.as_ref()).await?;
        }

        let code = generate_otp_code();
        let now = Utc::now();

        otps::ActiveModel {
            mobile: Set(mobile.clone()),
            code: Set(code.clone()),
            expires_at: Set(now + Duration::seconds(OTP_TTL_SECONDS)),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(|e| {
            // A concurrent issue for the same mobile trips the unique index
            AppError::unique_violation_as(
                e,
                AppError::RateLimited {
                    seconds: OTP_COOLDOWN_SECONDS,
                },
            )
        })?;

        // SMS delivery is best-effort: the code is persisted, so a carrier
        // hiccup must not fail the request
        if let Err(e) = self.twilio_service.send_otp_sms(&mobile, &code).await {
            log::warn!("OTP SMS to {mobile} failed, code still issued: {e}");
        }

        Ok(SendOtpResponse {
            expires_in: OTP_TTL_SECONDS,
            demo_otp: None,
        })
    }

    pub async fn verify_otp(&self, request: VerifyOtpRequest) -> AppResult<VerifyOtpResponse> {
        let mobile = normalize_mobile(&request.mobile);
        validate_mobile(&mobile)?;

        if request.otp.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Mobile and OTP required".to_string(),
            ));
        }

        let distributor_code = request
            .distributor_code
            .as_deref()
            .map(|c| c.trim().to_uppercase());

        // Demo mode accepts the fixed code without a stored record
        if self.demo.allows(&mobile) && request.otp == self.demo.otp {
            let user = self
                .resolve_user(&mobile, distributor_code.as_deref())
                .await?;
            return self.login_response(user);
        }

        let record = otps::Entity::find()
            .filter(otps::Column::Mobile.eq(mobile.clone()))
            .filter(otps::Column::Code.eq(request.otp.clone()))
            .one(self.pool.as_ref())
            .await?;

        let record = match record {
            Some(r) if r.expires_at >= Utc::now() => r,
            _ => {
                return Err(AppError::ValidationError(
                    "Invalid or expired OTP".to_string(),
                ));
            }
        };

        let user = self
            .resolve_user(&mobile, distributor_code.as_deref())
            .await?;

        // One-time use
        otps::Entity::delete_by_id(record.id).exec(self.pool.as_ref()).await?;

        self.login_response(user)
    }

    /// Shared lookup rule: a distributor code scopes the search to that
    /// distributor, otherwise the mobile must belong to an admin.
    async fn resolve_user(
        &self,
        mobile: &str,
        distributor_code: Option<&str>,
    ) -> AppResult<users::Model> {
        let query = match distributor_code {
            Some(code) => users::Entity::find()
                .filter(users::Column::Mobile.eq(mobile))
                .filter(users::Column::DistributorCode.eq(code))
                .filter(users::Column::Role.eq(Role::Distributor)),
            None => users::Entity::find()
                .filter(users::Column::Mobile.eq(mobile))
                .filter(users::Column::Role.eq(Role::Admin)),
        };

        let user = query.one(self.pool.as_ref()).await?.ok_or_else(|| {
            AppError::NotFound("User not registered. Contact admin.".to_string())
        })?;

        if user.status != UserStatus::Active {
            return Err(AppError::Forbidden(
                "Login blocked. Contact admin.".to_string(),
            ));
        }

        Ok(user)
    }

    fn login_response(&self, user: users::Model) -> AppResult<VerifyOtpResponse> {
        let token = self.jwt_service.generate_token(user.id, user.role)?;
        Ok(VerifyOtpResponse {
            token,
            role: user.role,
            user_id: user.id,
            name: user.name,
        })
    }

    /// Deletes expired OTP rows; run periodically from a background task.
    pub async fn purge_expired_otps(&self) -> AppResult<u64> {
        let result = otps::Entity::delete_many()
            .filter(otps::Column::ExpiresAt.lt(Utc::now()))
            .exec(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn jwt() -> JwtService {
        JwtService::new("test-secret", 3600)
    }

    fn twilio() -> TwilioService {
        TwilioService::new(crate::config::TwilioConfig {
            account_sid: String::new(),
            auth_token: String::new(),
            from_phone: String::new(),
            country_prefix: "+91".to_string(),
        })
    }

    fn distributor(id: i64) -> users::Model {
        users::Model {
            id,
            name: "Ravi Kumar".to_string(),
            mobile: "9000000001".to_string(),
            role: Role::Distributor,
            distributor_code: Some("DIST1001".to_string()),
            state: Some("Maharashtra".to_string()),
            district: Some("Pune".to_string()),
            status: UserStatus::Active,
            aadhaar: "123456789012".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn otp_record(created_secs_ago: i64, expires_in_secs: i64) -> otps::Model {
        otps::Model {
            id: 1,
            mobile: "9000000001".to_string(),
            code: "123456".to_string(),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
            created_at: Utc::now() - Duration::seconds(created_secs_ago),
        }
    }

    fn service(db: DatabaseConnection) -> AuthService {
        AuthService::new(Arc::new(db), jwt(), twilio(), DemoConfig::default())
    }

    #[tokio::test]
    async fn test_send_otp_within_cooldown_is_rate_limited() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![distributor(1)]])
            .append_query_results(vec![vec![otp_record(10, 110)]])
            .into_connection();

        let err = service(db)
            .send_otp(SendOtpRequest {
                mobile: "9000000001".to_string(),
                distributor_code: Some("DIST1001".to_string()),
            })
            .await
            .unwrap_err();

        match err {
            AppError::RateLimited { seconds } => assert!(seconds > 0 && seconds <= 30),
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_otp_unknown_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<users::Model>::new()])
            .into_connection();

        let err = service(db)
            .send_otp(SendOtpRequest {
                mobile: "7000000000".to_string(),
                distributor_code: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_verify_otp_expired_code_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![otp_record(180, -60)]])
            .into_connection();

        let err = service(db)
            .verify_otp(VerifyOtpRequest {
                mobile: "9000000001".to_string(),
                distributor_code: Some("DIST1001".to_string()),
                otp: "123456".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_verify_otp_missing_code_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<otps::Model>::new()])
            .into_connection();

        let err = service(db)
            .verify_otp(VerifyOtpRequest {
                mobile: "9000000001".to_string(),
                distributor_code: Some("DIST1001".to_string()),
                otp: "999999".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_verify_otp_success_consumes_code() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![otp_record(10, 110)]])
            .append_query_results(vec![vec![distributor(7)]])
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let response = service(db)
            .verify_otp(VerifyOtpRequest {
                mobile: "9000000001".to_string(),
                distributor_code: Some("DIST1001".to_string()),
                otp: "123456".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user_id, 7);
        assert_eq!(response.role, Role::Distributor);
        assert_eq!(response.name, "Ravi Kumar");
        assert!(!response.token.is_empty());
    }

    #[tokio::test]
    async fn test_verify_otp_blocked_user_forbidden() {
        let mut blocked = distributor(3);
        blocked.status = UserStatus::Disabled;

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![otp_record(10, 110)]])
            .append_query_results(vec![vec![blocked]])
            .into_connection();

        let err = service(db)
            .verify_otp(VerifyOtpRequest {
                mobile: "9000000001".to_string(),
                distributor_code: Some("DIST1001".to_string()),
                otp: "123456".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_demo_login_disabled_falls_through_to_stored_otp() {
        // Demo config off: the fixed code must not authenticate
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![Vec::<otps::Model>::new()])
            .into_connection();

        let err = service(db)
            .verify_otp(VerifyOtpRequest {
                mobile: "9999999999".to_string(),
                distributor_code: None,
                otp: "111111".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_demo_login_enabled_mints_token() {
        let demo = DemoConfig {
            enabled: true,
            mobiles: vec!["9000000001".to_string()],
            otp: "111111".to_string(),
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![distributor(5)]])
            .into_connection();

        let auth = AuthService::new(Arc::new(db), jwt(), twilio(), demo);
        let response = auth
            .verify_otp(VerifyOtpRequest {
                mobile: "9000000001".to_string(),
                distributor_code: Some("DIST1001".to_string()),
                otp: "111111".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(response.user_id, 5);
    }
}
