use actix_files::Files;
use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use occamy_backend::{
    config::Config,
    database::{create_pool, run_migrations, seed_demo_users},
    external::{NominatimService, TwilioService},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    let config = Config::from_toml().expect("Failed to load configuration");

    let pool = Arc::new(
        create_pool(&config.database)
            .await
            .expect("Failed to create database connection pool"),
    );

    run_migrations(pool.as_ref())
        .await
        .expect("Failed to run database migrations");

    seed_demo_users(pool.as_ref(), &config.demo)
        .await
        .expect("Failed to seed demo users");

    std::fs::create_dir_all(&config.storage.upload_dir).expect("Failed to create upload dir");

    let jwt_service = JwtService::new(&config.jwt.secret, config.jwt.token_expires_in);

    let twilio_service = TwilioService::new(config.twilio.clone());
    let nominatim_service = NominatimService::new(config.geocoder.clone());

    let auth_service = AuthService::new(
        pool.clone(),
        jwt_service.clone(),
        twilio_service.clone(),
        config.demo.clone(),
    );
    let admin_service = AdminService::new(pool.clone(), twilio_service.clone());
    let visit_service = VisitService::new(pool.clone(), nominatim_service);
    let field_visit_service = FieldVisitService::new(pool.clone());
    let work_session_service = WorkSessionService::new(pool.clone());
    let notification_service = NotificationService::new(pool.clone());
    let dashboard_service = DashboardService::new(pool.clone());

    // Expired OTP sweeper; the 2 minute TTL is enforced at verify time, this
    // just keeps dead rows from piling up
    {
        let auth_service_clone = auth_service.clone();
        tokio::spawn(async move {
            loop {
                match auth_service_clone.purge_expired_otps().await {
                    Ok(0) => {}
                    Ok(n) => log::info!("Purged {n} expired OTPs"),
                    Err(e) => log::error!("Failed to purge expired OTPs: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            }
        });
    }

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(config.clone()))
            .app_data(web::Data::from(pool.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(admin_service.clone()))
            .app_data(web::Data::new(visit_service.clone()))
            .app_data(web::Data::new(field_visit_service.clone()))
            .app_data(web::Data::new(work_session_service.clone()))
            .app_data(web::Data::new(notification_service.clone()))
            .app_data(web::Data::new(dashboard_service.clone()))
            .service(Files::new("/uploads", config.storage.upload_dir.clone()))
            .configure(swagger_config)
            .configure(handlers::auth_config)
            .configure(handlers::admin_config)
            .configure(handlers::distributor_config)
            .configure(handlers::field_visit_config)
            .configure(handlers::work_session_config)
            .configure(handlers::notification_config)
    })
    .bind((server_host.as_str(), server_port))?
    .run()
    .await
}
