use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Community post. Immutable once created; there is no update or delete.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DietEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub meal: String,
    pub calories: Option<i32>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct SymptomEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub symptom: String,
    pub severity: Option<i32>,
    pub notes: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct HealthReport {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub file_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct VitalsSnapshot {
    pub id: Uuid,
    pub user_id: Uuid,
    pub heart_rate: i32,
    pub steps: i32,
    pub sleep_score: i32,
    pub recorded_at: DateTime<Utc>,
}

// ============================================
// Response Structs
// ============================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<Post> for PostResponse {
    fn from(post: Post) -> Self {
        PostResponse {
            id: post.id.to_string(),
            user_id: post.user_id.to_string(),
            content: post.content,
            created_at: post.created_at.to_rfc3339(),
        }
    }
}

/// Profile returned to the account owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub created_at: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            id: user.id.to_string(),
            email: user.email,
            username: user.username,
            profile_image_url: user.profile_image_url,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Profile visible to other users. Never exposes the email address.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUser {
    pub id: String,
    pub username: String,
    pub profile_image_url: Option<String>,
    pub created_at: String,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        PublicUser {
            id: user.id.to_string(),
            username: user.username,
            profile_image_url: user.profile_image_url,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_response_from_post() {
        let post = Post {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            content: "Morning walk done, 4km".to_string(),
            created_at: Utc::now(),
        };

        let response = PostResponse::from(post.clone());
        assert_eq!(response.id, post.id.to_string());
        assert_eq!(response.user_id, post.user_id.to_string());
        assert_eq!(response.content, post.content);

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("Morning walk done"));
    }

    #[test]
    fn test_user_serialization_hides_password_hash() {
        let user = User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            username: "testuser".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            profile_image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_public_user_has_no_email() {
        let user = User {
            id: Uuid::new_v4(),
            email: "private@example.com".to_string(),
            username: "testuser".to_string(),
            password_hash: "hash".to_string(),
            profile_image_url: Some("/uploads/x.png".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(!json.contains("private@example.com"));
        assert!(json.contains("testuser"));
    }
}
