/// Request authentication for Axum
///
/// This module turns the `Authorization` header of an inbound request into
/// a trusted, request-scoped [`Identity`], and provides the role-gate layer
/// built on top of it.
///
/// # Status mapping
///
/// - Missing header or wrong scheme: 401 (nothing was presented)
/// - Malformed, tampered, or expired token: 403 (something was presented
///   and it failed verification)
/// - Role outside an endpoint's allowed set: 403
///
/// # Trust model
///
/// The role inside a verified token is trusted directly; it is never
/// re-checked against the credential store. A role change therefore takes
/// effect only once the holder's existing tokens expire.

use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::authorization::authorize;
use super::jwt::{Claims, TokenError, TokenService};
use crate::models::user::Role;

/// Verified identity of the caller, derived from a token
///
/// Created per-request by [`authenticate`], carried in request extensions,
/// and discarded with the response. Handlers extract it with Axum's
/// `Extension` extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Subject id (the caller's user id)
    pub subject_id: Uuid,

    /// Email asserted by the token
    pub email: String,

    /// Role asserted by the token
    pub role: Role,

    /// When the token was issued (Unix timestamp)
    pub issued_at: i64,

    /// When the token expires (Unix timestamp)
    pub expires_at: i64,
}

impl Identity {
    /// Builds an identity from verified claims
    pub fn from_claims(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            email: claims.email,
            role: claims.role,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No credential was presented (missing header or wrong scheme)
    #[error("Access token required")]
    MissingCredential,

    /// A credential was presented but failed verification
    #[error("Invalid or expired token")]
    Unauthenticated(#[source] TokenError),

    /// The verified identity's role is not admitted by this endpoint
    #[error("Access denied")]
    Denied,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code) = match self {
            AuthError::MissingCredential => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AuthError::Unauthenticated(_) => (StatusCode::FORBIDDEN, "forbidden"),
            AuthError::Denied => (StatusCode::FORBIDDEN, "forbidden"),
        };

        let body = Json(json!({
            "error": error_code,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

/// Authenticates a raw `Authorization` header value
///
/// Extracts the bearer credential and verifies it with the token service.
/// Absence of the header or a non-`Bearer` scheme is
/// [`AuthError::MissingCredential`]; any verification failure is
/// [`AuthError::Unauthenticated`].
pub fn authenticate(tokens: &TokenService, raw_header: Option<&str>) -> Result<Identity, AuthError> {
    let raw = raw_header.ok_or(AuthError::MissingCredential)?;

    let token = raw
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingCredential)?;

    let claims = tokens.verify(token).map_err(AuthError::Unauthenticated)?;

    Ok(Identity::from_claims(claims))
}

/// Reads the `Authorization` header of a request, if any
pub fn authorization_header(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
}

/// Creates a role-gate middleware admitting only the given roles
///
/// Must run after authentication has placed an [`Identity`] in the request
/// extensions; a request without one is rejected outright.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use taskvault_shared::auth::middleware::require_roles;
/// use taskvault_shared::models::user::Role;
///
/// let app: Router = Router::new()
///     .route("/users", get(|| async { "admins only" }))
///     .layer(middleware::from_fn(require_roles(&[Role::Admin])));
/// ```
pub fn require_roles(
    allowed_roles: &'static [Role],
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Result<Response, AuthError>> + Send>> + Clone
{
    move |req, next| {
        Box::pin(async move {
            let identity = req
                .extensions()
                .get::<Identity>()
                .cloned()
                .ok_or(AuthError::MissingCredential)?;

            authorize(&identity, allowed_roles).map_err(|_| AuthError::Denied)?;

            Ok(next.run(req).await)
        })
    }
}
