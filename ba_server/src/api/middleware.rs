//! Authentication middleware for protected endpoints.
//!
//! `auth_middleware` validates the signed token, re-checks the account it
//! names, and injects [`AccessTokenClaims`] carrying the stored role into
//! request extensions; `require_admin` is layered on top of it for
//! administrative routes.
//!
//! # Extracting Claims
//!
//! ```rust,no_run
//! use axum::extract::Extension;
//! use betting_admin::{AdminError, ErrorKind, auth::AccessTokenClaims};
//!
//! async fn protected_handler(Extension(claims): Extension<AccessTokenClaims>) -> String {
//!     format!("Authenticated as user {}", claims.user_id)
//! }
//! # let _ = protected_handler;
//! ```

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
    },
    middleware::Next,
    response::Response,
};
use betting_admin::{AdminError, ErrorKind, auth::AccessTokenClaims};

use super::AppState;
use super::response::ApiError;
use crate::logging::log_security_event;

/// Cookie carrying the access token for browser clients
pub const TOKEN_COOKIE: &str = "token";

/// Token from `Authorization: Bearer <token>`, else from the `token` cookie
pub fn extract_token(headers: &HeaderMap) -> Option<&str> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if bearer.is_some() {
        return bearer;
    }

    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, token)| token)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware that validates tokens and injects claims.
///
/// - **Success**: Token valid, account Active → claims in request extensions → next handler
/// - **Missing or invalid token**: `401` failure envelope
/// - **Suspended or deactivated account**: `403` failure envelope
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers())
        .ok_or_else(|| ApiError::unauthorized("Authentication token missing"))?;

    let claims = match state.auth_manager.authenticate(token).await {
        Ok(claims) => claims,
        Err(AdminError::Forbidden(reason)) => {
            log_security_event("inactive_account_token", None, &reason);
            return Err(ApiError::forbidden(reason));
        }
        Err(e) if e.kind() == ErrorKind::Internal => return Err(e.into()),
        Err(e) => {
            log_security_event("invalid_token", None, &e.to_string());
            return Err(ApiError::unauthorized("Invalid or expired token"));
        }
    };

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Reject callers whose role is not `admin` or `super-admin`.
///
/// Must run after [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    let claims = request
        .extensions()
        .get::<AccessTokenClaims>()
        .ok_or_else(|| ApiError::unauthorized("Authentication token missing"))?;

    if !claims.is_admin() {
        log_security_event(
            "forbidden_admin_route",
            Some(claims.user_id),
            &format!("{} {}", request.method(), request.uri().path()),
        );
        return Err(ApiError::forbidden("Admin access required"));
    }

    Ok(next.run(request).await)
}
