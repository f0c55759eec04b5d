//! Route configuration
//!
//! Centralized route setup; each domain manages its own routes. The auth
//! gate instance is threaded through so every gated scope shares the same
//! injected signing secret.

use crate::handlers;
use crate::middleware::JwtAuth;
use actix_web::web;

/// Configure all routes for the application
pub fn configure_routes(cfg: &mut web::ServiceConfig, auth: &JwtAuth) {
    cfg
        // API routes
        .service(
            web::scope("/api/v1")
                .route("/health", web::get().to(handlers::health_check))
                .route("/health/live", web::get().to(handlers::liveness_check))
                // Modular route configuration
                .configure(routes::auth::configure)
                .configure(|c| routes::users::configure(c, auth))
                .configure(|c| routes::community::configure(c, auth))
                .configure(|c| routes::diet::configure(c, auth)),
        )
        // WebSocket endpoints (outside /api/v1)
        .service(web::scope("/ws").route("/community", web::get().to(handlers::community_feed_ws)));
}

// Sub-modules for each domain
mod routes {
    use super::*;

    pub mod auth {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig) {
            cfg.service(
                web::scope("/auth")
                    .route("/register", web::post().to(handlers::register))
                    .route("/login", web::post().to(handlers::login)),
            );
        }
    }

    pub mod users {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig, auth: &JwtAuth) {
            cfg.service(
                web::scope("/users/me")
                    .wrap(auth.clone())
                    .route("", web::get().to(handlers::get_current_user))
                    .route(
                        "/profile-image",
                        web::post().to(handlers::upload_profile_image),
                    ),
            )
            .service(
                web::scope("/users")
                    .route("/{id}", web::get().to(handlers::get_user))
                    .service(
                        web::scope("")
                            .wrap(auth.clone())
                            .route(
                                "/{id}/symptom-history",
                                web::get().to(handlers::symptom_history),
                            )
                            .route(
                                "/{id}/symptom-history",
                                web::post().to(handlers::record_symptom_entry),
                            )
                            .route(
                                "/{id}/report-history",
                                web::get().to(handlers::report_history),
                            )
                            .route("/{id}/metrics", web::get().to(handlers::latest_vitals))
                            .route("/{id}/metrics", web::post().to(handlers::record_vitals)),
                    ),
            );
        }
    }

    pub mod community {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig, auth: &JwtAuth) {
            cfg.service(
                web::scope("/community")
                    // Public read: listing never requires a credential
                    .route("/posts", web::get().to(handlers::list_posts))
                    .service(
                        web::scope("")
                            .wrap(auth.clone())
                            .route("/posts", web::post().to(handlers::create_post)),
                    ),
            );
        }
    }

    pub mod diet {
        use super::*;
        pub fn configure(cfg: &mut web::ServiceConfig, auth: &JwtAuth) {
            cfg.service(
                web::scope("/diet")
                    .wrap(auth.clone())
                    .route("/history", web::post().to(handlers::record_diet_entry))
                    .route("/history/{user_id}", web::get().to(handlers::diet_history)),
            );
        }
    }
}
