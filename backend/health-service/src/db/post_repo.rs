/// Post repository - database operations for community posts
use crate::models::Post;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Persist a new post. The creation timestamp is assigned here, at write
/// time.
pub async fn create_post(
    pool: &PgPool,
    user_id: Uuid,
    content: &str,
) -> Result<Post, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (id, user_id, content, created_at)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, content, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(content)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// All posts, newest first
pub async fn list_posts(pool: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, content, created_at
        FROM posts
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}
