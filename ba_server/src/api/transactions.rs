//! Recharge and withdrawal handlers.
//!
//! Users file requests; admins approve or reject them. Approval applies the
//! ledger effect in the same store call that changes the status: a recharge
//! credits `depositAmount`, a withdrawal debits `winningsAmount`.

use axum::{
    body::Bytes,
    extract::{Extension, OriginalUri, State},
};
use betting_admin::{
    PageRequest,
    accounts::WalletSummary,
    auth::AccessTokenClaims,
    transactions::{
        DecisionRequest, MoneyTransaction, RechargeRequest, TransactionFilter, TransactionKind,
        TransactionStatus, WithdrawalRequest,
    },
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use super::response::{self, ApiError, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::{logging::log_ledger_event, metrics};

/// Own transaction listing filter
#[derive(Debug, Default, Deserialize)]
pub struct MyTransactionFilter {
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
}

/// Decided transaction and, on approval, the wallet it changed
#[derive(Debug, Serialize)]
pub struct DecisionOutcome {
    pub transaction: MoneyTransaction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet: Option<WalletSummary>,
}

/// Decision body is optional; an empty body means no reference and no remark
fn parse_decision(body: &[u8]) -> Result<DecisionRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(DecisionRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| ApiError::bad_request(format!("Invalid decision body: {e}")))
}

pub async fn request_recharge(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiJson(request): ApiJson<RechargeRequest>,
) -> ApiResult {
    let txn = state
        .transactions
        .request_recharge(claims.user_id, request)
        .await?;
    response::created("Recharge requested", txn)
}

pub async fn request_withdrawal(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiJson(request): ApiJson<WithdrawalRequest>,
) -> ApiResult {
    let txn = state
        .transactions
        .request_withdrawal(claims.user_id, request)
        .await?;
    response::created("Withdrawal requested", txn)
}

pub async fn my_transactions(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiQuery(filter): ApiQuery<MyTransactionFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult {
    let filter = TransactionFilter {
        kind: filter.kind,
        status: filter.status,
        user_id: Some(claims.user_id),
    };
    let txns = state.transactions.list(&filter, page.normalized()).await?;
    response::paginated("Transactions listed", txns, uri.path())
}

/// `GET /admin/transactions?kind=&status=&userId=&pageNumber=&perpage=`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<TransactionFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult {
    let txns = state.transactions.list(&filter, page.normalized()).await?;
    response::paginated("Transactions listed", txns, uri.path())
}

pub async fn get(State(state): State<AppState>, ApiPath(id): ApiPath<Uuid>) -> ApiResult {
    let txn = state.transactions.get(id).await?;
    response::ok("Transaction fetched", txn)
}

/// Approve a pending transaction. A withdrawal larger than the current
/// winnings fails and stays pending.
pub async fn approve(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(id): ApiPath<Uuid>,
    body: Bytes,
) -> ApiResult {
    let request = parse_decision(&body)?;
    let (txn, user) = state.transactions.approve(id, request).await?;

    metrics::transaction_decisions_total(txn.kind.as_str(), "approved");
    let signed = match txn.kind {
        TransactionKind::Recharge => txn.amount,
        TransactionKind::Withdrawal => -txn.amount,
    };
    log_ledger_event(
        &format!("approve_{}", txn.kind.as_str().to_lowercase()),
        claims.user_id,
        txn.user_id,
        signed,
    );

    response::ok(
        "Transaction approved",
        DecisionOutcome {
            transaction: txn,
            wallet: user.as_ref().map(WalletSummary::from),
        },
    )
}

pub async fn reject(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(id): ApiPath<Uuid>,
    body: Bytes,
) -> ApiResult {
    let request = parse_decision(&body)?;
    let txn = state.transactions.reject(id, request).await?;

    metrics::transaction_decisions_total(txn.kind.as_str(), "rejected");
    tracing::info!(
        admin_id = claims.user_id,
        transaction_id = %txn.id,
        kind = %txn.kind,
        "Transaction rejected"
    );

    response::ok(
        "Transaction rejected",
        DecisionOutcome {
            transaction: txn,
            wallet: None,
        },
    )
}
