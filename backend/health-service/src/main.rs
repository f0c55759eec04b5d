use actix_cors::Cors;
use actix_web::{http, middleware::Logger, web, App, HttpServer};
use std::io;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use health_service::config::{Config, CorsConfig};
use health_service::db::{create_pool, run_migrations};
use health_service::middleware::JwtAuth;
use health_service::routes::configure_routes;
use health_service::security::jwt::TokenService;
use health_service::services::broadcast::{EventPublisher, FeedHub};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");

    tracing::info!("Starting health-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Create database connection pool
    let db_pool = create_pool(&config.database.url, config.database.max_connections)
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool created with {} max connections",
        config.database.max_connections
    );

    // Run migrations in non-production unless explicitly skipped
    let run_migrations_env = std::env::var("RUN_MIGRATIONS").unwrap_or_else(|_| "true".into());
    if !config.is_production() && run_migrations_env != "false" {
        tracing::info!("Running database migrations...");
        run_migrations(&db_pool)
            .await
            .expect("Failed to run database migrations");
        tracing::info!("Database migrations completed");
    } else {
        tracing::info!(
            "Skipping database migrations (RUN_MIGRATIONS={})",
            run_migrations_env
        );
    }

    // Token codec holds the shared signing secret; the auth gate and the
    // login/register handlers are the only consumers.
    let token_service = TokenService::from_secret(&config.jwt.secret, config.jwt.access_token_ttl);
    let jwt_auth = JwtAuth::new(token_service.clone());

    // Real-time fan-out hub for community feed listeners
    let feed_hub = Arc::new(FeedHub::new());
    let publisher: Arc<dyn EventPublisher> = feed_hub.clone();

    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!("Listening on {}:{}", config.app.host, config.app.port);

    let app_config = config.clone();
    HttpServer::new(move || {
        let cors = build_cors(&app_config.cors);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(app_config.clone()))
            .app_data(web::Data::new(token_service.clone()))
            .app_data(web::Data::from(feed_hub.clone()))
            .app_data(web::Data::from(publisher.clone()))
            .configure(|cfg| configure_routes(cfg, &jwt_auth))
    })
    .bind(bind_addr)?
    .run()
    .await
}

fn build_cors(config: &CorsConfig) -> Cors {
    let cors = if config.allowed_origins.trim() == "*" {
        Cors::default().allow_any_origin()
    } else {
        config
            .allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PATCH", "DELETE"])
        .allowed_headers(vec![http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .max_age(config.max_age as usize)
}
