//! Account handlers: the caller's own profile and wallet, and user
//! administration for admins.

use axum::extract::{Extension, OriginalUri, State};
use betting_admin::{
    PageRequest,
    accounts::{AccountStatus, BalanceField, Role, UserFilter, UserId, UserUpdate, WalletSummary},
    auth::{AccessTokenClaims, RegisterRequest},
};
use serde::Deserialize;

use super::AppState;
use super::response::{self, ApiError, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::logging::{log_ledger_event, log_security_event};

/// Admin-created account
#[derive(Debug, Deserialize)]
pub struct CreateUserPayload {
    #[serde(flatten)]
    pub account: RegisterRequest,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: AccountStatus,
}

/// Manual ledger adjustment; negative deltas debit
#[derive(Debug, Deserialize)]
pub struct BalancePayload {
    pub field: BalanceField,
    pub delta: i64,
}

/// Only a super-admin may hand out the super-admin role
fn check_role_grant(claims: &AccessTokenClaims, role: Role) -> Result<(), ApiError> {
    if role == Role::SuperAdmin && claims.role != Role::SuperAdmin {
        log_security_event(
            "role_escalation_refused",
            Some(claims.user_id),
            "attempted to grant super-admin",
        );
        return Err(ApiError::forbidden("Only a super-admin may grant that role"));
    }
    Ok(())
}

pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
) -> ApiResult {
    let user = state.ledger.get_user(claims.user_id).await?;
    response::ok("Profile fetched", user)
}

pub async fn my_wallet(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
) -> ApiResult {
    let wallet = state.ledger.get_wallet(claims.user_id).await?;
    response::ok("Wallet fetched", wallet)
}

/// `GET /admin/users?role=&status=&search=&pageNumber=&perpage=`
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<UserFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult {
    let users = state.ledger.list_users(&filter, page.normalized()).await?;
    response::paginated("Users listed", users, uri.path())
}

/// Create an account with an explicit role. Runs the same referral cascade as
/// self-registration.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiJson(payload): ApiJson<CreateUserPayload>,
) -> ApiResult {
    check_role_grant(&claims, payload.role)?;

    let registration = state
        .auth_manager
        .register_with_role(payload.account, payload.role)
        .await?;
    crate::metrics::registrations_total(registration.referrer.is_some());
    tracing::info!(
        admin_id = claims.user_id,
        user_id = registration.user.user_id,
        role = %registration.user.role,
        "Account created by admin"
    );
    response::created("User created", registration.user)
}

pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult {
    let user = state.ledger.get_user(user_id).await?;
    response::ok("User fetched", user)
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult {
    if let Some(role) = update.role {
        check_role_grant(&claims, role)?;
    }
    let user = state.ledger.update_user(user_id, update).await?;
    response::ok("User updated", user)
}

pub async fn set_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(payload): ApiJson<StatusPayload>,
) -> ApiResult {
    let user = state.ledger.set_status(user_id, payload.status).await?;
    tracing::info!(
        admin_id = claims.user_id,
        user_id,
        status = %user.status,
        "Account status changed"
    );
    response::ok("Status updated", user)
}

pub async fn user_wallet(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> ApiResult {
    let wallet = state.ledger.get_wallet(user_id).await?;
    response::ok("Wallet fetched", wallet)
}

/// Apply a signed delta to one balance field
pub async fn adjust_balance(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(payload): ApiJson<BalancePayload>,
) -> ApiResult {
    let user = state
        .ledger
        .adjust_balance(user_id, payload.field, payload.delta)
        .await?;
    log_ledger_event(
        &format!("adjust_{}", payload.field.column()),
        claims.user_id,
        user_id,
        payload.delta,
    );
    response::ok("Balance updated", WalletSummary::from(&user))
}
