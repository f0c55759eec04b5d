/// Integration tests for the community post flow.
/// Requires a live Postgres (DATABASE_URL); compiled only with
/// `--features pg_integration_tests`.
mod common;

use actix_web::{http::header, http::StatusCode, test, web, App};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

use health_service::middleware::JwtAuth;
use health_service::models::{PostResponse, UserProfile};
use health_service::routes::configure_routes;
use health_service::security::jwt::TokenService;
use health_service::services::broadcast::{EventPublisher, FeedHub};

use crate::common::fixtures;

async fn setup_test_app(
    pool: PgPool,
    hub: Arc<FeedHub>,
    codec: TokenService,
    upload_dir: &str,
) -> impl actix_web::dev::Service<
    actix_http::Request,
    Response = actix_web::dev::ServiceResponse,
    Error = actix_web::Error,
> {
    let database_url = std::env::var("DATABASE_URL").unwrap_or_default();
    let config = fixtures::test_config(&database_url, upload_dir);
    let publisher: Arc<dyn EventPublisher> = hub.clone();
    let auth = JwtAuth::new(codec.clone());

    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(config))
            .app_data(web::Data::new(codec))
            .app_data(web::Data::from(hub))
            .app_data(web::Data::from(publisher))
            .configure(|cfg| configure_routes(cfg, &auth)),
    )
    .await
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

#[actix_web::test]
async fn test_create_without_header_is_rejected_and_nothing_persists() {
    let pool = fixtures::create_test_pool().await;
    let hub = Arc::new(FeedHub::new());
    let user = fixtures::create_test_user(&pool).await;
    let app = setup_test_app(pool.clone(), hub, fixtures::token_service(), "/tmp").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/community/posts")
        .set_json(serde_json::json!({"content": "should never land"}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .expect("count query failed");
    assert_eq!(count, 0);
}

#[actix_web::test]
async fn test_create_persists_and_broadcasts_exactly_once() {
    let pool = fixtures::create_test_pool().await;
    let hub = Arc::new(FeedHub::new());
    let codec = fixtures::token_service();
    let user = fixtures::create_test_user(&pool).await;
    let token = codec.issue_access_token(user.id).expect("token issue failed");

    // Listener connected before the write
    let (_connection_id, mut rx) = hub.subscribe();

    let app = setup_test_app(pool.clone(), hub.clone(), codec, "/tmp").await;

    let req = test::TestRequest::post()
        .uri("/api/v1/community/posts")
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({"content": "first run of the week done"}))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let created: PostResponse = test::read_body_json(resp).await;
    assert_eq!(created.user_id, user.id.to_string());
    assert_eq!(created.content, "first run of the week done");

    // Exactly one event, carrying the created post
    let event = rx.recv().await.expect("no broadcast event received");
    assert_eq!(event.event_type, "post_created");
    assert_eq!(event.payload["id"], serde_json::json!(created.id));
    assert_eq!(
        event.payload["content"],
        serde_json::json!("first run of the week done")
    );

    assert!(
        tokio::time::timeout(Duration::from_millis(50), rx.recv())
            .await
            .is_err(),
        "a single create must publish a single event"
    );

    // The row is really there
    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE id = $1::uuid")
        .bind(uuid::Uuid::parse_str(&created.id).expect("invalid id"))
        .fetch_one(&pool)
        .await
        .expect("count query failed");
    assert_eq!(stored, 1);
}

#[actix_web::test]
async fn test_list_is_public_and_includes_new_posts() {
    let pool = fixtures::create_test_pool().await;
    let hub = Arc::new(FeedHub::new());
    let codec = fixtures::token_service();
    let user = fixtures::create_test_user(&pool).await;
    let token = codec.issue_access_token(user.id).expect("token issue failed");
    let app = setup_test_app(pool.clone(), hub, codec, "/tmp").await;

    let create = test::TestRequest::post()
        .uri("/api/v1/community/posts")
        .insert_header(bearer(&token))
        .set_json(serde_json::json!({"content": "hydration reminder"}))
        .to_request();
    let resp = test::call_service(&app, create).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: PostResponse = test::read_body_json(resp).await;

    // No Authorization header on the read
    let list = test::TestRequest::get()
        .uri("/api/v1/community/posts")
        .to_request();
    let resp = test::call_service(&app, list).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let posts: Vec<PostResponse> = test::read_body_json(resp).await;
    assert!(posts.iter().any(|p| p.id == created.id));
}

#[actix_web::test]
async fn test_concurrent_creates_keep_their_authors() {
    let pool = fixtures::create_test_pool().await;
    let hub = Arc::new(FeedHub::new());
    let codec = fixtures::token_service();
    let alice = fixtures::create_test_user(&pool).await;
    let bob = fixtures::create_test_user(&pool).await;
    let alice_token = codec.issue_access_token(alice.id).expect("token issue failed");
    let bob_token = codec.issue_access_token(bob.id).expect("token issue failed");
    let app = setup_test_app(pool.clone(), hub, codec, "/tmp").await;

    let alice_req = test::TestRequest::post()
        .uri("/api/v1/community/posts")
        .insert_header(bearer(&alice_token))
        .set_json(serde_json::json!({"content": "alice was here"}))
        .to_request();
    let bob_req = test::TestRequest::post()
        .uri("/api/v1/community/posts")
        .insert_header(bearer(&bob_token))
        .set_json(serde_json::json!({"content": "bob was here"}))
        .to_request();

    let (alice_resp, bob_resp) = futures::future::join(
        test::call_service(&app, alice_req),
        test::call_service(&app, bob_req),
    )
    .await;

    assert_eq!(alice_resp.status(), StatusCode::CREATED);
    assert_eq!(bob_resp.status(), StatusCode::CREATED);

    let alice_post: PostResponse = test::read_body_json(alice_resp).await;
    let bob_post: PostResponse = test::read_body_json(bob_resp).await;

    assert_ne!(alice_post.id, bob_post.id);
    assert_eq!(alice_post.user_id, alice.id.to_string());
    assert_eq!(bob_post.user_id, bob.id.to_string());
    assert_eq!(alice_post.content, "alice was here");
    assert_eq!(bob_post.content, "bob was here");
}

#[actix_web::test]
async fn test_profile_image_upload_roundtrip() {
    let pool = fixtures::create_test_pool().await;
    let hub = Arc::new(FeedHub::new());
    let codec = fixtures::token_service();
    let user = fixtures::create_test_user(&pool).await;
    let token = codec.issue_access_token(user.id).expect("token issue failed");

    let upload_dir = tempfile::tempdir().expect("failed to create temp dir");
    let app = setup_test_app(
        pool.clone(),
        hub,
        codec,
        upload_dir.path().to_str().expect("non-utf8 temp dir"),
    )
    .await;

    let boundary = "------------------------test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"profileImage\"; filename=\"avatar.png\"\r\nContent-Type: image/png\r\n\r\nfake-png-bytes\r\n--{b}--\r\n",
        b = boundary
    );

    let req = test::TestRequest::post()
        .uri("/api/v1/users/me/profile-image")
        .insert_header(bearer(&token))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        ))
        .set_payload(body)
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let envelope: serde_json::Value = test::read_body_json(resp).await;
    let profile: UserProfile =
        serde_json::from_value(envelope["user"].clone()).expect("missing user envelope");
    let image_url = profile.profile_image_url.expect("profile image url not set");
    assert_eq!(image_url, format!("/uploads/{}.png", user.id));

    // The bytes landed where the config pointed
    let stored = upload_dir.path().join(format!("{}.png", user.id));
    assert_eq!(
        std::fs::read(stored).expect("stored image missing"),
        b"fake-png-bytes"
    );
}
