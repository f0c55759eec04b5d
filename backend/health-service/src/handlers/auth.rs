use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::models::UserProfile;
use crate::security::jwt::TokenService;
use crate::security::password;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 3, max = 50))]
    pub username: String,

    #[validate(length(min = 8))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
}

/// POST /api/v1/auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    if user_repo::find_by_email(pool.get_ref(), &req.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("email already registered".to_string()));
    }

    if user_repo::find_by_username(pool.get_ref(), &req.username)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("username already taken".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;
    let user = user_repo::create_user(pool.get_ref(), &req.email, &req.username, &password_hash)
        .await?;

    tracing::info!(user_id = %user.id, "user registered");

    let access_token = tokens
        .issue_access_token(user.id)
        .map_err(|e| AppError::Internal(format!("failed to issue access token: {}", e)))?;

    Ok(HttpResponse::Created().json(AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.access_token_ttl(),
        user: user.into(),
    }))
}

/// POST /api/v1/auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    // Unknown email and wrong password are indistinguishable to the caller
    let user = user_repo::find_by_email(pool.get_ref(), &req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    password::verify_password(&req.password, &user.password_hash)?;

    let access_token = tokens
        .issue_access_token(user.id)
        .map_err(|e| AppError::Internal(format!("failed to issue access token: {}", e)))?;

    Ok(HttpResponse::Ok().json(AuthResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: tokens.access_token_ttl(),
        user: user.into(),
    }))
}
