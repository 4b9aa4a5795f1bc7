//! Authentication API handlers.
//!
//! - Registration runs the referral cascade and logs the new account in
//! - Login by email and password
//! - Logout clears the token cookie
//!
//! Successful registration and login return the signed token in the body and
//! set it as the `token` cookie.
//!
//! # Examples
//!
//! Register with a promo code:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/register \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Asha", "email": "asha@example.com", "password": "Secret123", "promoCode": "AB12CD"}'
//! ```
//!
//! Login:
//! ```bash
//! curl -X POST http://localhost:8080/api/v1/auth/login \
//!   -H "Content-Type: application/json" \
//!   -d '{"email": "asha@example.com", "password": "Secret123"}'
//! ```

use axum::{
    extract::State,
    http::{HeaderValue, header::SET_COOKIE},
    response::Response,
};
use betting_admin::{
    AdminError,
    auth::{LoginRequest, LoginResponse, RegisterRequest},
};

use super::AppState;
use super::middleware::TOKEN_COOKIE;
use super::response::{self, ApiJson, ApiResult};
use crate::{logging::log_security_event, metrics};

/// Token cookie lifetime, matching the token expiry
const COOKIE_MAX_AGE_SECS: i64 = 24 * 60 * 60;

fn with_cookie(mut response: Response, value: String) -> Response {
    if let Ok(header) = HeaderValue::from_str(&value) {
        response.headers_mut().insert(SET_COOKIE, header);
    }
    response
}

fn token_cookie(token: &str) -> String {
    format!(
        "{TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={COOKIE_MAX_AGE_SECS}"
    )
}

/// Register a new user account and log it in.
///
/// # Request Body
///
/// ```json
/// {
///   "name": "Asha",
///   "email": "asha@example.com",
///   "password": "Secret123",
///   "phone": "9876543210",      // Optional
///   "promoCode": "AB12CD"       // Optional, falls back to the default referrer
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Invalid fields or email already registered
/// - `404 Not Found`: A referral setting the cascade needs is missing
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult {
    let email = request.email.clone();
    let password = request.password.clone();

    let registration = state.auth_manager.register(request).await?;
    metrics::registrations_total(registration.referrer.is_some());

    let (user, token) = state
        .auth_manager
        .login(LoginRequest { email, password })
        .await?;

    let cookie = token_cookie(&token);
    let response = response::created("Registration successful", LoginResponse { token, user })?;
    Ok(with_cookie(response, cookie))
}

/// Log in with email and password.
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password
/// - `403 Forbidden`: Account is not active
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult {
    let email = request.email.clone();

    match state.auth_manager.login(request).await {
        Ok((user, token)) => {
            metrics::login_attempts_total(true);
            let cookie = token_cookie(&token);
            let response = response::ok("Login successful", LoginResponse { token, user })?;
            Ok(with_cookie(response, cookie))
        }
        Err(e) => {
            metrics::login_attempts_total(false);
            if matches!(e, AdminError::Unauthorized(_) | AdminError::Forbidden(_)) {
                log_security_event("failed_login", None, &format!("email={email}: {e}"));
            }
            Err(e.into())
        }
    }
}

/// Clear the token cookie. Tokens are stateless, so a copied token stays
/// valid until it expires.
pub async fn logout() -> ApiResult {
    let response = response::done("Logged out")?;
    Ok(with_cookie(
        response,
        format!("{TOKEN_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    ))
}
