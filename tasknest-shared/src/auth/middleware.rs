/// Authentication middleware for Axum
///
/// This module provides the request-level guard that protects task routes.
/// The middleware extracts a bearer token from the `Authorization` header,
/// validates it, and adds the resolved identity to request extensions.
/// It runs before every protected handler and short-circuits with 401 on
/// failure, so no downstream handler executes for an unauthenticated request.
///
/// The caller is never told *why* authentication failed: a missing header, a
/// malformed token, a bad signature, and an expired token all surface as the
/// same 401 response.
///
/// # Request Extensions
///
/// After successful authentication, middleware adds:
/// - `AuthContext`: Contains the authenticated user's id
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use tasknest_shared::auth::middleware::{create_bearer_auth, AuthContext};
///
/// async fn protected_handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// let app: Router = Router::new()
///     .route("/tasks", get(protected_handler))
///     .layer(middleware::from_fn(create_bearer_auth("your-jwt-secret")));
/// ```

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

use super::jwt::validate_token;

/// Authentication context added to request extensions
///
/// Handlers extract it with Axum's `Extension` extractor and use `user_id`
/// as the owner for every store operation. Owner identity always comes from
/// here, never from client-supplied input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context for a verified user
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for authentication middleware
///
/// Both variants map to 401; the distinction exists for logs only.
#[derive(Debug)]
pub enum AuthError {
    /// Missing authorization header
    MissingToken,

    /// Token validation failed (malformed, bad signature, or expired)
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Access denied. No token provided.",
            AuthError::InvalidToken => "Invalid token",
        };

        let body = Json(json!({
            "error": "unauthorized",
            "message": message,
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Strips a `Bearer ` scheme prefix if present
///
/// Some clients send the raw token without a scheme; both forms are accepted.
fn strip_bearer(header_value: &str) -> &str {
    header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value)
        .trim()
}

/// Bearer-token authentication middleware
///
/// Validates tokens from the `Authorization: Bearer <token>` header and
/// injects an [`AuthContext`] into request extensions on success.
///
/// # Errors
///
/// Returns 401 Unauthorized if the header is absent or the token fails
/// validation for any reason.
pub async fn bearer_auth_middleware(
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Extract Authorization header
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingToken)?;

    let token = strip_bearer(auth_header);

    // Signature is checked before any claim is trusted. Expired and
    // malformed tokens are indistinguishable to the caller.
    let claims = validate_token(token, &secret).map_err(|_| AuthError::InvalidToken)?;

    req.extensions_mut().insert(AuthContext::new(claims.sub));

    Ok(next.run(req).await)
}

/// Creates a bearer authentication middleware closure
///
/// Helper that captures the signing secret and returns a middleware function
/// suitable for `axum::middleware::from_fn`.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use tasknest_shared::auth::middleware::create_bearer_auth;
///
/// let app: Router = Router::new()
///     .route("/tasks", get(|| async { "OK" }))
///     .layer(middleware::from_fn(create_bearer_auth("secret")));
/// ```
pub fn create_bearer_auth(
    secret: impl Into<String>,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    let secret = secret.into();
    move |req, next| {
        let secret = secret.clone();
        Box::pin(bearer_auth_middleware(secret, req, next))
    }
}
