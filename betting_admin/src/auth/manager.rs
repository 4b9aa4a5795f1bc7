//! Authentication manager implementation.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::models::{AccessTokenClaims, LoginRequest, RegisterRequest};
use crate::accounts::{AccountStatus, NewUser, Role, User};
use crate::db::SharedStore;
use crate::error::{AdminError, AdminResult};
use crate::ids::{random_promo_code, random_public_id, retry_on_duplicate};
use crate::referral::{ReferralManager, Registration, Signup};

/// Authentication manager
#[derive(Clone)]
pub struct AuthManager {
    store: SharedStore,
    referrals: ReferralManager,
    pepper: String,
    jwt_secret: String,
    token_duration: Duration,
}

impl AuthManager {
    /// Create a new authentication manager
    ///
    /// # Arguments
    ///
    /// * `store` - Storage backend
    /// * `referrals` - Referral cascade run on registration
    /// * `pepper` - Server-side pepper for password hashing
    /// * `jwt_secret` - Secret key for JWT signing
    pub fn new(
        store: SharedStore,
        referrals: ReferralManager,
        pepper: String,
        jwt_secret: String,
    ) -> Self {
        Self {
            store,
            referrals,
            pepper,
            jwt_secret,
            token_duration: Duration::hours(24),
        }
    }

    /// Register a `user` account
    ///
    /// # Errors
    ///
    /// * `AdminError::Validation` - Bad name, email or weak password, or the
    ///   email is taken
    /// * `AdminError::NotFound` - A referral setting is missing
    pub async fn register(&self, request: RegisterRequest) -> AdminResult<Registration> {
        self.register_with_role(request, Role::User).await
    }

    /// Register an account with an explicit role (admin-created accounts)
    pub async fn register_with_role(
        &self,
        request: RegisterRequest,
        role: Role,
    ) -> AdminResult<Registration> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AdminError::validation("Name must not be empty"));
        }
        let email = request.email.trim();
        validate_email(email)?;
        validate_password(&request.password)?;

        let password_hash = self.hash_password(&request.password)?;

        self.referrals
            .register(Signup {
                name: name.to_string(),
                email: email.to_string(),
                phone: request.phone,
                password_hash,
                role,
                reference_code: request.reference_code,
            })
            .await
    }

    /// Check credentials and issue a token
    ///
    /// # Errors
    ///
    /// * `AdminError::Unauthorized` - Unknown email or wrong password
    /// * `AdminError::Forbidden` - Account is not active
    pub async fn login(&self, request: LoginRequest) -> AdminResult<(User, String)> {
        let (user, password_hash) = self
            .store
            .find_credentials(request.email.trim())
            .await?
            .ok_or_else(|| AdminError::Unauthorized("Invalid email or password".into()))?;

        self.verify_password(&request.password, &password_hash)?;

        if user.status != AccountStatus::Active {
            return Err(AdminError::Forbidden(format!("Account is {}", user.status)));
        }

        let token = self.generate_access_token(&user)?;
        Ok((user, token))
    }

    /// Verify an access token
    pub fn verify_access_token(&self, token: &str) -> AdminResult<AccessTokenClaims> {
        let token_data = decode::<AccessTokenClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    /// Verify an access token and re-check it against the stored account
    ///
    /// Role and email in the returned claims come from storage, so suspending
    /// or demoting an account takes effect before its tokens expire.
    ///
    /// # Errors
    ///
    /// * `AdminError::Jwt` - Bad signature or expired token
    /// * `AdminError::Unauthorized` - Account no longer exists
    /// * `AdminError::Forbidden` - Account is not active
    pub async fn authenticate(&self, token: &str) -> AdminResult<AccessTokenClaims> {
        let mut claims = self.verify_access_token(token)?;
        let user = self
            .store
            .find_user(claims.user_id)
            .await?
            .ok_or_else(|| AdminError::Unauthorized("Account no longer exists".into()))?;

        if user.status != AccountStatus::Active {
            return Err(AdminError::Forbidden(format!("Account is {}", user.status)));
        }

        claims.role = user.role;
        claims.email = user.email;
        Ok(claims)
    }

    /// Create the bootstrap admin unless an account with `email` exists.
    /// Bypasses the referral cascade. Returns the created account.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> AdminResult<Option<User>> {
        let email = email.trim();
        if self.store.find_credentials(email).await?.is_some() {
            return Ok(None);
        }
        validate_email(email)?;
        validate_password(password)?;

        let password_hash = self.hash_password(password)?;
        let registration = retry_on_duplicate(&["user_id", "promo_code"], || {
            let store = self.store.clone();
            let admin = NewUser {
                user_id: random_public_id(),
                name: "Administrator".to_string(),
                email: email.to_string(),
                phone: None,
                password_hash: password_hash.clone(),
                role: Role::Admin,
                promo_code: random_promo_code(),
                reference_code: None,
                referred_by: None,
                accessible_games: Vec::new(),
            };
            async move { store.create_user(admin, None).await }
        })
        .await?;

        log::info!("Created admin account {}", registration.user.user_id);
        Ok(Some(registration.user))
    }

    /// Generate JWT access token
    fn generate_access_token(&self, user: &User) -> AdminResult<String> {
        let now = Utc::now();
        let claims = AccessTokenClaims {
            user_id: user.user_id,
            email: user.email.clone(),
            object_id: user.id,
            role: user.role,
            exp: (now + self.token_duration).timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Hash password with Argon2id + pepper
    fn hash_password(&self, password: &str) -> AdminResult<String> {
        let peppered = format!("{}{}", password, self.pepper);
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        Ok(argon2
            .hash_password(peppered.as_bytes(), &salt)
            .map_err(|_| AdminError::HashingFailed)?
            .to_string())
    }

    /// Verify password against hash
    fn verify_password(&self, password: &str, hash: &str) -> AdminResult<()> {
        let peppered = format!("{}{}", password, self.pepper);
        let parsed_hash = PasswordHash::new(hash).map_err(|_| AdminError::HashingFailed)?;
        let argon2 = Argon2::default();

        argon2
            .verify_password(peppered.as_bytes(), &parsed_hash)
            .map_err(|_| AdminError::Unauthorized("Invalid email or password".into()))
    }
}

/// Validate email shape: `local@domain.tld` without whitespace
pub fn validate_email(email: &str) -> AdminResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.split('.').count() >= 2
                && domain.split('.').all(|part| !part.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AdminError::validation("Invalid email address"))
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> AdminResult<()> {
    if password.len() < 8 {
        return Err(AdminError::validation(
            "Password must be at least 8 characters",
        ));
    }

    // Check for at least one number, one uppercase, one lowercase
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_uppercase = password.chars().any(|c| c.is_ascii_uppercase());
    let has_lowercase = password.chars().any(|c| c.is_ascii_lowercase());

    if !has_digit || !has_uppercase || !has_lowercase {
        return Err(AdminError::validation(
            "Password must contain at least one number, one uppercase and one lowercase letter",
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(validate_email("player@example.com").is_ok());
        assert!(validate_email("a.b@sub.example.in").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@localhost").is_err());
        assert!(validate_email("user@example..com").is_err());
        assert!(validate_email("us er@example.com").is_err());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password("SecurePass123").is_ok());
        assert!(validate_password("Short1").is_err());
        assert!(validate_password("alllowercase1").is_err());
        assert!(validate_password("ALLUPPERCASE1").is_err());
        assert!(validate_password("NoDigitsHere").is_err());
    }
}
