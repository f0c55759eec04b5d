/// JWT authentication middleware for Bearer token validation
/// Extracts user_id from JWT claims and adds it to request extensions
use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    http::header,
    Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::security::jwt::{Subject, TokenService};

const BEARER_PREFIX: &str = "Bearer ";

// Clients that lose their token sometimes serialize the missing value as
// literal text instead of omitting the header. Those credentials must be
// rejected before any cryptographic check.
const SENTINEL_TOKENS: &[&str] = &["null", "undefined"];

/// User ID extracted from JWT token
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

/// Why a request was turned away. Logged for operators; the caller always
/// sees the same uniform 401 body regardless of the reason.
#[derive(Debug)]
enum Rejection {
    MissingHeader,
    MalformedScheme,
    SentinelToken,
    InvalidToken,
    MissingIdentifier,
}

fn authorize(codec: &TokenService, header: Option<&str>) -> Result<Uuid, Rejection> {
    let value = header.ok_or(Rejection::MissingHeader)?;

    let credential = value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(Rejection::MalformedScheme)?;

    if credential.is_empty() || SENTINEL_TOKENS.contains(&credential) {
        return Err(Rejection::SentinelToken);
    }

    let token_data = codec.decode(credential).map_err(|e| {
        tracing::debug!(error = %e, "bearer token failed verification");
        Rejection::InvalidToken
    })?;

    Subject::from_claims(&token_data.claims)
        .map(Subject::user_id)
        .ok_or(Rejection::MissingIdentifier)
}

/// JWT authentication middleware factory.
///
/// Holds the token codec (and with it the shared signing secret) injected
/// at construction, so route setup decides which scopes are gated and
/// tests can run against fixture secrets.
#[derive(Clone)]
pub struct JwtAuth {
    codec: Arc<TokenService>,
}

impl JwtAuth {
    pub fn new(codec: TokenService) -> Self {
        Self {
            codec: Arc::new(codec),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtAuthService {
            service: Rc::new(service),
            codec: self.codec.clone(),
        }))
    }
}

/// JWT authentication middleware service
pub struct JwtAuthService<S> {
    service: Rc<S>,
    codec: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let codec = self.codec.clone();

        Box::pin(async move {
            // Owned copy of the header before any mutable access to the
            // request extensions.
            let auth_header = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .map(str::to_owned);

            match authorize(&codec, auth_header.as_deref()) {
                Ok(user_id) => {
                    req.extensions_mut().insert(UserId(user_id));
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(reason) => {
                    tracing::warn!(?reason, path = %req.path(), "rejected unauthenticated request");
                    // Terminal response at the boundary; downstream
                    // services are never invoked.
                    let (request, _) = req.into_parts();
                    let response = AppError::Unauthorized.error_response().map_into_right_body();
                    Ok(ServiceResponse::new(request, response))
                }
            }
        })
    }
}

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<UserId>().copied() {
            Some(user_id) => ready(Ok(user_id)),
            // The gate guarantees the identity is present on gated routes;
            // reaching this branch is a wiring bug, not an auth failure.
            None => ready(Err(AppError::Internal(
                "user identity missing from request extensions".to_string(),
            )
            .into())),
        }
    }
}
