use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::db::post_repo;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::PostResponse;
use crate::services::broadcast::{EventPublisher, FeedEvent};

pub const MAX_POST_CONTENT_LENGTH: usize = 2000;

#[derive(Debug, Deserialize, Serialize, Validate)]
pub struct CreatePostRequest {
    #[validate(length(min = 1, max = 2000))]
    pub content: String,
}

/// List all community posts
/// GET /api/v1/community/posts
///
/// Public read; no authentication required.
pub async fn list_posts(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let posts = post_repo::list_posts(pool.get_ref()).await?;
    let responses: Vec<PostResponse> = posts.into_iter().map(PostResponse::from).collect();

    Ok(HttpResponse::Ok().json(responses))
}

/// Create a community post and announce it to connected listeners
/// POST /api/v1/community/posts
/// Protected: the auth gate must have resolved an identity
pub async fn create_post(
    user: UserId,
    pool: web::Data<PgPool>,
    publisher: web::Data<dyn EventPublisher>,
    req: web::Json<CreatePostRequest>,
) -> Result<HttpResponse> {
    req.validate()?;
    if req.content.trim().is_empty() {
        return Err(AppError::Validation("content must not be blank".to_string()));
    }

    // Fully persisted before any listener hears about it. A failed insert
    // propagates here and nothing is published.
    let post = post_repo::create_post(pool.get_ref(), user.0, &req.content).await?;
    tracing::info!(post_id = %post.id, author = %post.user_id, "community post created");

    let response = PostResponse::from(post);
    publisher.publish(FeedEvent::post_created(&response));

    Ok(HttpResponse::Created().json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_length_bounds() {
        let ok = CreatePostRequest {
            content: "a".repeat(MAX_POST_CONTENT_LENGTH),
        };
        assert!(ok.validate().is_ok());

        let too_long = CreatePostRequest {
            content: "a".repeat(MAX_POST_CONTENT_LENGTH + 1),
        };
        assert!(too_long.validate().is_err());

        let empty = CreatePostRequest {
            content: String::new(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_request_deserialization() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"content":"feeling great after the run"}"#).unwrap();
        assert_eq!(req.content, "feeling great after the run");

        // Unknown shape is rejected
        assert!(serde_json::from_str::<CreatePostRequest>(r#"{"body":"x"}"#).is_err());
    }
}
