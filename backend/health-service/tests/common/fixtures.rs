/// Shared fixtures for integration tests.
///
/// These tests need a live Postgres reachable through DATABASE_URL and are
/// compiled only with `--features pg_integration_tests`.
use sqlx::PgPool;
use uuid::Uuid;

use health_service::config::{
    AppConfig, Config, CorsConfig, DatabaseConfig, JwtConfig, UploadConfig,
};
use health_service::db::{create_pool, run_migrations, user_repo};
use health_service::models::User;
use health_service::security::jwt::TokenService;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-32-chars!!";

pub async fn create_test_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for pg_integration_tests");

    let pool = create_pool(&url, 5)
        .await
        .expect("Failed to connect to test database");

    run_migrations(&pool)
        .await
        .expect("Failed to run migrations on test database");

    pool
}

pub fn token_service() -> TokenService {
    TokenService::from_secret(TEST_JWT_SECRET, 3600)
}

pub fn test_config(database_url: &str, upload_dir: &str) -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_ttl: 3600,
        },
        cors: CorsConfig {
            allowed_origins: "*".to_string(),
            max_age: 3600,
        },
        uploads: UploadConfig {
            dir: upload_dir.to_string(),
            public_base_url: "/uploads".to_string(),
            max_bytes: 5 * 1024 * 1024,
        },
    }
}

/// Insert a user with a unique email/username. The password hash is a
/// placeholder; these tests authenticate with issued tokens, not logins.
pub async fn create_test_user(pool: &PgPool) -> User {
    let suffix = Uuid::new_v4().simple().to_string();

    user_repo::create_user(
        pool,
        &format!("user-{}@example.com", &suffix[..12]),
        &format!("user_{}", &suffix[..12]),
        "$argon2id$v=19$m=19456,t=2,p=1$placeholder$placeholder",
    )
    .await
    .expect("Failed to create test user")
}
