/// Health history repository - diet, symptom, report and vitals records
use crate::models::{DietEntry, HealthReport, SymptomEntry, VitalsSnapshot};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

pub async fn diet_history(pool: &PgPool, user_id: Uuid) -> Result<Vec<DietEntry>, sqlx::Error> {
    sqlx::query_as::<_, DietEntry>(
        r#"
        SELECT id, user_id, meal, calories, notes, recorded_at
        FROM diet_entries
        WHERE user_id = $1
        ORDER BY recorded_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn record_diet_entry(
    pool: &PgPool,
    user_id: Uuid,
    meal: &str,
    calories: Option<i32>,
    notes: Option<&str>,
) -> Result<DietEntry, sqlx::Error> {
    sqlx::query_as::<_, DietEntry>(
        r#"
        INSERT INTO diet_entries (id, user_id, meal, calories, notes, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, meal, calories, notes, recorded_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(meal)
    .bind(calories)
    .bind(notes)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

pub async fn symptom_history(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SymptomEntry>, sqlx::Error> {
    sqlx::query_as::<_, SymptomEntry>(
        r#"
        SELECT id, user_id, symptom, severity, notes, recorded_at
        FROM symptom_entries
        WHERE user_id = $1
        ORDER BY recorded_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn record_symptom_entry(
    pool: &PgPool,
    user_id: Uuid,
    symptom: &str,
    severity: Option<i32>,
    notes: Option<&str>,
) -> Result<SymptomEntry, sqlx::Error> {
    sqlx::query_as::<_, SymptomEntry>(
        r#"
        INSERT INTO symptom_entries (id, user_id, symptom, severity, notes, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, symptom, severity, notes, recorded_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(symptom)
    .bind(severity)
    .bind(notes)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}

/// Report metadata list. Report files land here through a separate
/// ingestion pipeline; this service only reads them.
pub async fn report_history(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<HealthReport>, sqlx::Error> {
    sqlx::query_as::<_, HealthReport>(
        r#"
        SELECT id, user_id, title, file_url, created_at
        FROM health_reports
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn latest_vitals(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<VitalsSnapshot>, sqlx::Error> {
    sqlx::query_as::<_, VitalsSnapshot>(
        r#"
        SELECT id, user_id, heart_rate, steps, sleep_score, recorded_at
        FROM vitals_snapshots
        WHERE user_id = $1
        ORDER BY recorded_at DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub async fn record_vitals(
    pool: &PgPool,
    user_id: Uuid,
    heart_rate: i32,
    steps: i32,
    sleep_score: i32,
) -> Result<VitalsSnapshot, sqlx::Error> {
    sqlx::query_as::<_, VitalsSnapshot>(
        r#"
        INSERT INTO vitals_snapshots (id, user_id, heart_rate, steps, sleep_score, recorded_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, heart_rate, steps, sleep_score, recorded_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(heart_rate)
    .bind(steps)
    .bind(sleep_score)
    .bind(Utc::now())
    .fetch_one(pool)
    .await
}
