//! Integration tests for registration, login and signed tokens.

mod common;

use betting_admin::AdminError;
use betting_admin::accounts::{AccountLedger, AccountStatus, Role, UserUpdate};
use betting_admin::auth::{AuthManager, LoginRequest, RegisterRequest};
use betting_admin::db::{SharedStore, UserRepository};
use betting_admin::referral::ReferralManager;
use common::{memory_store, seed_referral_settings};

const PEPPER: &str = "test-pepper-0123456789";
const SECRET: &str = "test-jwt-secret-that-is-long-enough-for-hs256";

fn auth_manager(store: &SharedStore) -> AuthManager {
    AuthManager::new(
        store.clone(),
        ReferralManager::new(store.clone()),
        PEPPER.to_string(),
        SECRET.to_string(),
    )
}

fn register_request(email: &str, password: &str, code: Option<String>) -> RegisterRequest {
    RegisterRequest {
        name: "Ravi Kumar".to_string(),
        email: email.to_string(),
        password: password.to_string(),
        phone: Some("9000000000".to_string()),
        reference_code: code,
    }
}

fn login(email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn test_register_and_login() {
    let store = memory_store();
    let auth = auth_manager(&store);

    let registration = auth
        .register(register_request("ravi@example.com", "SecurePass123", None))
        .await
        .unwrap();
    let user = registration.user;
    assert_eq!(user.role, Role::User);
    assert_eq!(user.status, AccountStatus::Active);
    assert!((100_000..=999_999).contains(&user.user_id));
    assert_eq!(user.wallet(), 0);

    // Password is stored hashed, never in clear
    let (_, hash) = store
        .find_credentials("ravi@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(!hash.contains("SecurePass123"));

    let (logged_in, token) = auth
        .login(login("RAVI@example.com", "SecurePass123"))
        .await
        .unwrap();
    assert_eq!(logged_in.user_id, user.user_id);

    let claims = auth.verify_access_token(&token).unwrap();
    assert_eq!(claims.user_id, user.user_id);
    assert_eq!(claims.object_id, user.id);
    assert_eq!(claims.email, "ravi@example.com");
    assert_eq!(claims.role, Role::User);
    assert!(!claims.is_admin());
    assert!(claims.exp > claims.iat);
}

#[tokio::test]
async fn test_bad_credentials_are_unauthorized() {
    let store = memory_store();
    let auth = auth_manager(&store);
    auth.register(register_request("ravi@example.com", "SecurePass123", None))
        .await
        .unwrap();

    assert!(matches!(
        auth.login(login("ravi@example.com", "WrongPass123")).await,
        Err(AdminError::Unauthorized(_))
    ));
    assert!(matches!(
        auth.login(login("nobody@example.com", "SecurePass123")).await,
        Err(AdminError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_token_from_other_secret_is_rejected() {
    let store = memory_store();
    let auth = auth_manager(&store);
    auth.register(register_request("ravi@example.com", "SecurePass123", None))
        .await
        .unwrap();
    let (_, token) = auth
        .login(login("ravi@example.com", "SecurePass123"))
        .await
        .unwrap();

    let other = AuthManager::new(
        store.clone(),
        ReferralManager::new(store.clone()),
        PEPPER.to_string(),
        "a-completely-different-secret-value-here".to_string(),
    );
    assert!(other.verify_access_token(&token).is_err());
    assert!(auth.verify_access_token("not.a.token").is_err());
}

#[tokio::test]
async fn test_inactive_account_is_forbidden() {
    let store = memory_store();
    let auth = auth_manager(&store);
    let user = auth
        .register(register_request("ravi@example.com", "SecurePass123", None))
        .await
        .unwrap()
        .user;

    AccountLedger::new(store.clone())
        .set_status(user.user_id, AccountStatus::Suspended)
        .await
        .unwrap();

    assert!(matches!(
        auth.login(login("ravi@example.com", "SecurePass123")).await,
        Err(AdminError::Forbidden(_))
    ));
}

#[tokio::test]
async fn test_authenticate_reloads_account_state() {
    let store = memory_store();
    let auth = auth_manager(&store);
    let ledger = AccountLedger::new(store.clone());
    let user = auth
        .register(register_request("mira@example.com", "SecurePass123", None))
        .await
        .unwrap()
        .user;
    let token = auth
        .login(login("mira@example.com", "SecurePass123"))
        .await
        .unwrap()
        .1;

    let claims = auth.authenticate(&token).await.unwrap();
    assert_eq!(claims.user_id, user.user_id);
    assert_eq!(claims.role, Role::User);

    ledger
        .update_user(
            user.user_id,
            UserUpdate {
                role: Some(Role::Admin),
                ..UserUpdate::default()
            },
        )
        .await
        .unwrap();
    let claims = auth.authenticate(&token).await.unwrap();
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(auth.verify_access_token(&token).unwrap().role, Role::User);

    ledger
        .set_status(user.user_id, AccountStatus::Deactive)
        .await
        .unwrap();
    assert!(matches!(
        auth.authenticate(&token).await,
        Err(AdminError::Forbidden(_))
    ));
    assert!(matches!(
        auth.authenticate("not.a.token").await,
        Err(AdminError::Jwt(_))
    ));
}

#[tokio::test]
async fn test_registration_validation() {
    let store = memory_store();
    let auth = auth_manager(&store);

    for (email, password) in [
        ("ravi@example.com", "short1A"),
        ("ravi@example.com", "nouppercase123"),
        ("not-an-email", "SecurePass123"),
    ] {
        assert!(matches!(
            auth.register(register_request(email, password, None)).await,
            Err(AdminError::Validation(_))
        ));
    }

    let mut blank_name = register_request("ravi@example.com", "SecurePass123", None);
    blank_name.name = "   ".into();
    assert!(matches!(
        auth.register(blank_name).await,
        Err(AdminError::Validation(_))
    ));

    auth.register(register_request("ravi@example.com", "SecurePass123", None))
        .await
        .unwrap();
    assert!(matches!(
        auth.register(register_request("ravi@example.com", "SecurePass123", None))
            .await,
        Err(AdminError::Validation(_))
    ));
}

#[tokio::test]
async fn test_ensure_admin_is_idempotent() {
    let store = memory_store();
    let auth = auth_manager(&store);

    let created = auth
        .ensure_admin("root@example.com", "AdminPass123")
        .await
        .unwrap()
        .expect("admin created on first run");
    assert_eq!(created.role, Role::Admin);
    assert_eq!(created.referred_by, None);

    assert!(auth
        .ensure_admin("root@example.com", "AdminPass123")
        .await
        .unwrap()
        .is_none());

    let (_, token) = auth
        .login(login("root@example.com", "AdminPass123"))
        .await
        .unwrap();
    assert!(auth.verify_access_token(&token).unwrap().is_admin());
}

#[tokio::test]
async fn test_registration_runs_referral_cascade() {
    let store = memory_store();
    seed_referral_settings(&store).await;
    let auth = auth_manager(&store);
    let admin = auth
        .ensure_admin("root@example.com", "AdminPass123")
        .await
        .unwrap()
        .unwrap();

    let referred = auth
        .register(register_request(
            "ravi@example.com",
            "SecurePass123",
            Some(admin.promo_code.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(referred.user.referred_by, Some(admin.user_id));

    let admin = store.find_user(admin.user_id).await.unwrap().unwrap();
    assert_eq!(admin.number_of_referrals, 1);
    assert_eq!(admin.balances.bonus_amount, 50);
    // Admin referrers earn no commission tier
    assert_eq!(admin.commission_percentage, 0.0);
}
