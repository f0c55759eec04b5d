use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures_util::StreamExt;
use sqlx::PgPool;
use std::path::Path;
use uuid::Uuid;

use crate::config::Config;
use crate::db::user_repo;
use crate::error::{AppError, Result};
use crate::middleware::UserId;
use crate::models::{PublicUser, UserProfile};

/// Multipart field name the dashboard sends the image under
const PROFILE_IMAGE_FIELD: &str = "profileImage";

/// GET /api/v1/users/me
pub async fn get_current_user(user: UserId, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let profile = user_repo::find_by_id(pool.get_ref(), user.0)
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserProfile::from(profile)))
}

/// GET /api/v1/users/{id}
pub async fn get_user(path: web::Path<Uuid>, pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let user = user_repo::find_by_id(pool.get_ref(), path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("user not found".to_string()))?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}

/// Upload a new profile image
/// POST /api/v1/users/me/profile-image
///
/// Stores the file under the configured uploads directory and records its
/// public URL on the user. Serving the bytes is left to the CDN / reverse
/// proxy in front of this service.
pub async fn upload_profile_image(
    user: UserId,
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    mut payload: Multipart,
) -> Result<HttpResponse> {
    let mut upload: Option<(&'static str, Vec<u8>)> = None;

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::BadRequest(format!("invalid multipart payload: {}", e)))?;

        if field.name() != PROFILE_IMAGE_FIELD {
            continue;
        }

        let content_type = field.content_type().clone();
        let extension = if content_type == mime::IMAGE_JPEG {
            "jpg"
        } else if content_type == mime::IMAGE_PNG {
            "png"
        } else if content_type.type_() == mime::IMAGE && content_type.subtype() == "webp" {
            "webp"
        } else {
            return Err(AppError::BadRequest(format!(
                "unsupported image type: {}",
                content_type
            )));
        };

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk =
                chunk.map_err(|e| AppError::BadRequest(format!("failed to read upload: {}", e)))?;
            if bytes.len() + chunk.len() > config.uploads.max_bytes {
                return Err(AppError::BadRequest(format!(
                    "image exceeds maximum size of {} bytes",
                    config.uploads.max_bytes
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        if bytes.is_empty() {
            return Err(AppError::BadRequest("uploaded image is empty".to_string()));
        }

        upload = Some((extension, bytes));
        break;
    }

    let (extension, bytes) = upload.ok_or_else(|| {
        AppError::BadRequest(format!("missing {} field", PROFILE_IMAGE_FIELD))
    })?;

    tokio::fs::create_dir_all(&config.uploads.dir)
        .await
        .map_err(|e| AppError::Internal(format!("failed to create uploads dir: {}", e)))?;

    let filename = format!("{}.{}", user.0, extension);
    let destination = Path::new(&config.uploads.dir).join(&filename);
    tokio::fs::write(&destination, &bytes)
        .await
        .map_err(|e| AppError::Internal(format!("failed to store profile image: {}", e)))?;

    let public_url = format!(
        "{}/{}",
        config.uploads.public_base_url.trim_end_matches('/'),
        filename
    );
    let updated = user_repo::update_profile_image(pool.get_ref(), user.0, &public_url).await?;

    tracing::info!(user_id = %user.0, url = %public_url, "profile image updated");

    // The dashboard reads the refreshed profile from a `user` envelope
    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": UserProfile::from(updated) })))
}
