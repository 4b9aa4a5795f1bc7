//! Bet placement and settlement handlers.
//!
//! Every betting record in a response carries its derived `weightage`.
//! Placement and settlement also return the user's wallet after the change.

use axum::extract::{Extension, OriginalUri, State};
use betting_admin::{
    PageRequest,
    accounts::{User, WalletSummary},
    auth::AccessTokenClaims,
    betting::{BetFilter, BetStatus, Betting, BettingId, BettingView, PlaceBetRequest},
};
use serde::{Deserialize, Serialize};

use super::AppState;
use super::response::{self, ApiJson, ApiPath, ApiQuery, ApiResult};
use crate::metrics;

/// Bet placed by the caller
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetPayload {
    pub amount: i64,
    #[serde(default)]
    pub win_amount: i64,
    pub game: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BetStatusPayload {
    pub status: BetStatus,
}

/// Own bet listing filter
#[derive(Debug, Default, Deserialize)]
pub struct MyBetFilter {
    pub status: Option<BetStatus>,
}

/// Bet together with the wallet it affected
#[derive(Debug, Serialize)]
pub struct BetReceipt {
    pub betting: BettingView,
    pub wallet: WalletSummary,
}

impl BetReceipt {
    fn new(betting: Betting, user: &User) -> Self {
        Self {
            betting: betting.into(),
            wallet: user.into(),
        }
    }
}

async fn place(state: &AppState, request: PlaceBetRequest) -> ApiResult {
    let (betting, user) = state.bets.place_bet(request).await?;
    metrics::bet_settlements_total(betting.status.as_str());
    response::created("Bet placed", BetReceipt::new(betting, &user))
}

/// `POST /bets` for the caller's own account
pub async fn place_bet(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiJson(payload): ApiJson<BetPayload>,
) -> ApiResult {
    place(
        &state,
        PlaceBetRequest {
            user_id: claims.user_id,
            amount: payload.amount,
            win_amount: payload.win_amount,
            game: payload.game,
        },
    )
    .await
}

/// `POST /admin/bets` on behalf of any user
pub async fn place_for_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<PlaceBetRequest>,
) -> ApiResult {
    place(&state, request).await
}

pub async fn my_bets(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiQuery(filter): ApiQuery<MyBetFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult {
    let filter = BetFilter {
        user_id: Some(claims.user_id),
        status: filter.status,
    };
    let bets = state.bets.list(&filter, page.normalized()).await?;
    response::paginated("Bets listed", bets.map(BettingView::from), uri.path())
}

/// `GET /admin/bets?userId=&status=&pageNumber=&perpage=`
pub async fn list(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<BetFilter>,
    ApiQuery(page): ApiQuery<PageRequest>,
    OriginalUri(uri): OriginalUri,
) -> ApiResult {
    let bets = state.bets.list(&filter, page.normalized()).await?;
    response::paginated("Bets listed", bets.map(BettingView::from), uri.path())
}

pub async fn get(
    State(state): State<AppState>,
    ApiPath(betting_id): ApiPath<BettingId>,
) -> ApiResult {
    let betting = state.bets.get(betting_id).await?;
    response::ok("Bet fetched", BettingView::from(betting))
}

/// Settle a bet: `BetCancelled` releases the played amount, `BetWon` credits
/// the win amount to winnings.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<AccessTokenClaims>,
    ApiPath(betting_id): ApiPath<BettingId>,
    ApiJson(payload): ApiJson<BetStatusPayload>,
) -> ApiResult {
    let (betting, user) = state.bets.update_status(betting_id, payload.status).await?;
    metrics::bet_settlements_total(betting.status.as_str());
    tracing::info!(
        admin_id = claims.user_id,
        betting_id,
        status = %betting.status,
        "Bet settled"
    );
    response::ok("Bet status updated", BetReceipt::new(betting, &user))
}
