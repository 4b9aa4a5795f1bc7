//! Bank record handlers for the caller's own records, plus the public list of
//! accounts recharges are paid into.

use axum::extract::{Extension, State};
use betting_admin::{
    auth::AccessTokenClaims,
    bank::{BankDetails, BankDetailsUpdate, NewBankDetails},
};
use serde::Serialize;
use uuid::Uuid;

use super::AppState;
use super::response::{self, ApiJson, ApiPath, ApiResult};

/// Outcome of a removal
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedBank {
    pub removed: Uuid,
    /// Record that took over the primary flag
    pub promoted: Option<BankDetails>,
}

pub async fn list(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
) -> ApiResult {
    let banks = state.banks.list(claims.user_id).await?;
    response::ok("Bank details listed", banks)
}

/// Add a record. The first record, or one sent with `"primary": "Yes"`,
/// becomes the primary record.
pub async fn add(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiJson(bank): ApiJson<NewBankDetails>,
) -> ApiResult {
    let record = state.banks.add(claims.user_id, bank).await?;
    response::created("Bank details added", record)
}

pub async fn get(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult {
    let record = state.banks.get(claims.user_id, id).await?;
    response::ok("Bank details fetched", record)
}

pub async fn update(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(update): ApiJson<BankDetailsUpdate>,
) -> ApiResult {
    let record = state.banks.update(claims.user_id, id, update).await?;
    response::ok("Bank details updated", record)
}

pub async fn set_primary(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult {
    let record = state.banks.set_primary(claims.user_id, id).await?;
    response::ok("Primary bank updated", record)
}

pub async fn remove(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult {
    let promoted = state.banks.remove(claims.user_id, id).await?;
    response::ok(
        "Bank details removed",
        RemovedBank {
            removed: id,
            promoted,
        },
    )
}

/// Admin bank accounts shown to users for recharges
pub async fn payment_accounts(State(state): State<AppState>) -> ApiResult {
    let accounts = state.banks.payment_accounts().await?;
    response::ok("Payment accounts listed", accounts)
}
