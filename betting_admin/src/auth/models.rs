//! Authentication data models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{Role, User, UserId};

/// User registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    /// Promo code of the referring account
    #[serde(alias = "promoCode")]
    pub reference_code: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signed token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub email: String,
    /// Storage id of the user
    #[serde(rename = "objectId")]
    pub object_id: Uuid,
    pub role: Role,
    pub exp: i64, // Expiration timestamp
    pub iat: i64, // Issued at timestamp
}

impl AccessTokenClaims {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
