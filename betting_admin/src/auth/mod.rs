//! Authentication: registration, login and token verification.
//!
//! This module implements:
//! - Argon2id password hashing with server-side pepper
//! - HS256 JWT access tokens carrying `{userId, email, objectId, role}`
//! - Registration through the referral cascade
//! - Bootstrap of the first admin account
//!
//! ## Example
//!
//! ```no_run
//! use betting_admin::auth::{AuthManager, RegisterRequest};
//! use betting_admin::db::{MemoryStore, SharedStore};
//! use betting_admin::referral::ReferralManager;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: SharedStore = Arc::new(MemoryStore::new());
//!     let auth = AuthManager::new(
//!         store.clone(),
//!         ReferralManager::new(store),
//!         "secret_pepper_value".to_string(),
//!         "jwt_secret_that_is_at_least_32_chars".to_string(),
//!     );
//!
//!     let request = RegisterRequest {
//!         name: "Player One".to_string(),
//!         email: "player@example.com".to_string(),
//!         password: "SecurePass123".to_string(),
//!         phone: None,
//!         reference_code: None,
//!     };
//!
//!     let registration = auth.register(request).await?;
//!     println!("Registered user: {}", registration.user.user_id);
//!     Ok(())
//! }
//! ```

pub mod manager;
pub mod models;

pub use manager::{AuthManager, validate_email, validate_password};
pub use models::{AccessTokenClaims, LoginRequest, LoginResponse, RegisterRequest};
