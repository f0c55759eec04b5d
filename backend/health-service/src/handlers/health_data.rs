use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::db::health_repo;
use crate::error::{AppError, Result};
use crate::middleware::UserId;

#[derive(Debug, Deserialize, Validate)]
pub struct RecordDietEntryRequest {
    #[validate(length(min = 1, max = 255))]
    pub meal: String,

    #[validate(range(min = 0, max = 10000))]
    pub calories: Option<i32>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordSymptomRequest {
    #[validate(length(min = 1, max = 255))]
    pub symptom: String,

    #[validate(range(min = 1, max = 10))]
    pub severity: Option<i32>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RecordVitalsRequest {
    #[validate(range(min = 20, max = 300))]
    pub heart_rate: i32,

    #[validate(range(min = 0, max = 200000))]
    pub steps: i32,

    #[validate(range(min = 0, max = 100))]
    pub sleep_score: i32,
}

// Health records are personal; a caller may only touch their own.
fn ensure_owner(user: UserId, target: Uuid) -> Result<()> {
    if user.0 != target {
        tracing::warn!(requester = %user.0, target = %target, "cross-user health data access denied");
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// GET /api/v1/diet/history/{user_id}
pub async fn diet_history(
    user: UserId,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    ensure_owner(user, target)?;

    let entries = health_repo::diet_history(pool.get_ref(), target).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// POST /api/v1/diet/history
pub async fn record_diet_entry(
    user: UserId,
    pool: web::Data<PgPool>,
    req: web::Json<RecordDietEntryRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let entry = health_repo::record_diet_entry(
        pool.get_ref(),
        user.0,
        &req.meal,
        req.calories,
        req.notes.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(entry))
}

/// GET /api/v1/users/{id}/symptom-history
pub async fn symptom_history(
    user: UserId,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    ensure_owner(user, target)?;

    let entries = health_repo::symptom_history(pool.get_ref(), target).await?;
    Ok(HttpResponse::Ok().json(entries))
}

/// POST /api/v1/users/{id}/symptom-history
pub async fn record_symptom_entry(
    user: UserId,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    req: web::Json<RecordSymptomRequest>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    ensure_owner(user, target)?;
    req.validate()?;

    let entry = health_repo::record_symptom_entry(
        pool.get_ref(),
        target,
        &req.symptom,
        req.severity,
        req.notes.as_deref(),
    )
    .await?;

    Ok(HttpResponse::Created().json(entry))
}

/// GET /api/v1/users/{id}/report-history
pub async fn report_history(
    user: UserId,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    ensure_owner(user, target)?;

    let reports = health_repo::report_history(pool.get_ref(), target).await?;
    Ok(HttpResponse::Ok().json(reports))
}

/// GET /api/v1/users/{id}/metrics
pub async fn latest_vitals(
    user: UserId,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    ensure_owner(user, target)?;

    let vitals = health_repo::latest_vitals(pool.get_ref(), target)
        .await?
        .ok_or_else(|| AppError::NotFound("no vitals recorded".to_string()))?;

    Ok(HttpResponse::Ok().json(vitals))
}

/// POST /api/v1/users/{id}/metrics
pub async fn record_vitals(
    user: UserId,
    path: web::Path<Uuid>,
    pool: web::Data<PgPool>,
    req: web::Json<RecordVitalsRequest>,
) -> Result<HttpResponse> {
    let target = path.into_inner();
    ensure_owner(user, target)?;
    req.validate()?;

    let snapshot = health_repo::record_vitals(
        pool.get_ref(),
        target,
        req.heart_rate,
        req.steps,
        req.sleep_score,
    )
    .await?;

    Ok(HttpResponse::Created().json(snapshot))
}
