//! HTTP JSON API for the betting administration backend.
//!
//! # Modules
//!
//! - [`auth`]: Registration, login and logout
//! - [`accounts`]: Own profile and wallet; admin user management and balance adjustments
//! - [`bets`]: Bet placement and settlement
//! - [`transactions`]: Recharge and withdrawal requests and their approval
//! - [`banks`]: Bank records with a single primary record
//! - [`settings`]: Named amount settings
//! - [`catalog`]: Bonuses, banners, games and support queries
//! - [`middleware`]: Token authentication and the admin gate
//! - [`response`]: Envelope, error mapping and extractors
//!
//! # Endpoints Overview
//!
//! ```text
//! GET    /health
//!
//! POST   /api/v1/auth/register | /auth/login | /auth/logout
//! GET    /api/v1/banners | /games | /deposit-bonuses | /festival-bonuses | /payment-accounts
//!
//! (token required)
//! GET    /api/v1/me | /me/wallet | /me/bets | /me/transactions | /me/queries
//! POST   /api/v1/bets | /recharges | /withdrawals | /queries
//! GET    /api/v1/me/banks            POST /api/v1/me/banks
//! GET    /api/v1/me/banks/{id}       PATCH, DELETE
//! POST   /api/v1/me/banks/{id}/primary
//!
//! (admin role required, under /api/v1/admin)
//! GET, POST          /users
//! GET, PATCH         /users/{user_id}
//! POST               /users/{user_id}/status | /users/{user_id}/balance
//! GET                /users/{user_id}/wallet
//! GET, POST          /bets
//! GET                /bets/{betting_id}
//! POST               /bets/{betting_id}/status
//! GET                /transactions | /transactions/{id}
//! POST               /transactions/{id}/approve | /transactions/{id}/reject
//! GET, POST          /settings
//! GET, PATCH, DELETE /settings/{name}
//! GET, POST          /deposit-bonuses | /festival-bonuses | /banners | /games
//! GET, PUT, DELETE   /deposit-bonuses/{public_id} (and the other three)
//! GET                /queries | /queries/{public_id}
//! POST               /queries/{public_id}/reply
//! ```
//!
//! Tokens are read from `Authorization: Bearer <token>` or the `token` cookie.
//! List endpoints take `pageNumber` and `perpage` query parameters.

pub mod accounts;
pub mod auth;
pub mod banks;
pub mod bets;
pub mod catalog;
pub mod middleware;
pub mod request_id;
pub mod response;
pub mod settings;
pub mod transactions;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
    routing::{get, post},
};
use betting_admin::{
    accounts::{AccountLedger, UserId},
    auth::AuthManager,
    bank::BankManager,
    betting::BettingManager,
    catalog::{AvailableGame, Banner, CatalogManager, DepositBonus, FestivalBonus, SupportQuery},
    db::SharedStore,
    referral::ReferralManager,
    settings::SettingsManager,
    transactions::TransactionManager,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::config::SecurityConfig;
use response::{ApiError, ApiResult};

/// Application state shared across all HTTP handlers.
///
/// Cloned for each request; every manager sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub auth_manager: Arc<AuthManager>,
    pub ledger: Arc<AccountLedger>,
    pub bets: Arc<BettingManager>,
    pub transactions: Arc<TransactionManager>,
    pub banks: Arc<BankManager>,
    pub settings: Arc<SettingsManager>,
    pub deposit_bonuses: Arc<CatalogManager<DepositBonus>>,
    pub festival_bonuses: Arc<CatalogManager<FestivalBonus>>,
    pub banners: Arc<CatalogManager<Banner>>,
    pub games: Arc<CatalogManager<AvailableGame>>,
    pub queries: Arc<CatalogManager<SupportQuery>>,
}

impl AppState {
    /// Build every manager over one store
    pub fn new(
        store: SharedStore,
        security: &SecurityConfig,
        default_referrer: Option<UserId>,
    ) -> Self {
        let referrals =
            ReferralManager::new(store.clone()).with_default_referrer(default_referrer);
        let auth_manager = AuthManager::new(
            store.clone(),
            referrals,
            security.password_pepper.clone(),
            security.jwt_secret.clone(),
        );

        Self {
            auth_manager: Arc::new(auth_manager),
            ledger: Arc::new(AccountLedger::new(store.clone())),
            bets: Arc::new(BettingManager::new(store.clone())),
            transactions: Arc::new(TransactionManager::new(store.clone())),
            banks: Arc::new(BankManager::new(store.clone())),
            settings: Arc::new(SettingsManager::new(store.clone())),
            deposit_bonuses: Arc::new(CatalogManager::new(store.clone())),
            festival_bonuses: Arc::new(CatalogManager::new(store.clone())),
            banners: Arc::new(CatalogManager::new(store.clone())),
            games: Arc::new(CatalogManager::new(store.clone())),
            queries: Arc::new(CatalogManager::new(store.clone())),
            store,
        }
    }
}

/// Create the complete API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// # use ba_server::api::{create_router, AppState};
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// # let state: AppState = unimplemented!();
/// let app = create_router(state);
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    let v1_routes = create_v1_router(state.clone());

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1_routes)
        .fallback(not_found)
        .layer(from_fn(request_id::request_id_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn create_v1_router(state: AppState) -> Router<AppState> {
    // Public routes (no authentication middleware)
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/banners", get(catalog::public_list::<Banner>))
        .route("/games", get(catalog::public_list::<AvailableGame>))
        .route("/deposit-bonuses", get(catalog::public_list::<DepositBonus>))
        .route("/festival-bonuses", get(catalog::public_list::<FestivalBonus>))
        .route("/payment-accounts", get(banks::payment_accounts));

    // Routes acting on the caller's own account
    let user_routes = Router::new()
        .route("/me", get(accounts::me))
        .route("/me/wallet", get(accounts::my_wallet))
        .route("/me/bets", get(bets::my_bets))
        .route("/bets", post(bets::place_bet))
        .route("/me/banks", get(banks::list).post(banks::add))
        .route(
            "/me/banks/{id}",
            get(banks::get).patch(banks::update).delete(banks::remove),
        )
        .route("/me/banks/{id}/primary", post(banks::set_primary))
        .route("/recharges", post(transactions::request_recharge))
        .route("/withdrawals", post(transactions::request_withdrawal))
        .route("/me/transactions", get(transactions::my_transactions))
        .route("/queries", post(catalog::open_query))
        .route("/me/queries", get(catalog::my_queries))
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    let admin_routes = Router::new()
        .route(
            "/users",
            get(accounts::list_users).post(accounts::create_user),
        )
        .route(
            "/users/{user_id}",
            get(accounts::get_user).patch(accounts::update_user),
        )
        .route("/users/{user_id}/status", post(accounts::set_status))
        .route("/users/{user_id}/wallet", get(accounts::user_wallet))
        .route("/users/{user_id}/balance", post(accounts::adjust_balance))
        .route("/bets", get(bets::list).post(bets::place_for_user))
        .route("/bets/{betting_id}", get(bets::get))
        .route("/bets/{betting_id}/status", post(bets::update_status))
        .route("/transactions", get(transactions::list))
        .route("/transactions/{id}", get(transactions::get))
        .route("/transactions/{id}/approve", post(transactions::approve))
        .route("/transactions/{id}/reject", post(transactions::reject))
        .route("/settings", get(settings::list).post(settings::create))
        .route(
            "/settings/{name}",
            get(settings::get)
                .patch(settings::update)
                .delete(settings::delete),
        )
        .merge(catalog::admin_routes::<DepositBonus>())
        .merge(catalog::admin_routes::<FestivalBonus>())
        .merge(catalog::admin_routes::<Banner>())
        .merge(catalog::admin_routes::<AvailableGame>())
        .route("/queries", get(catalog::list_queries))
        .route("/queries/{public_id}", get(catalog::get_query))
        .route("/queries/{public_id}/reply", post(catalog::reply_query))
        // Outer layer authenticates, inner layer checks the role
        .layer(from_fn(middleware::require_admin))
        .layer(from_fn_with_state(state, middleware::auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .nest("/admin", admin_routes)
}

#[derive(Serialize)]
struct Health {
    healthy: bool,
    version: &'static str,
    timestamp: String,
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable` otherwise.
async fn health_check(State(state): State<AppState>) -> ApiResult {
    match state.store.health_check().await {
        Ok(()) => response::ok(
            "Service is healthy",
            Health {
                healthy: true,
                version: env!("CARGO_PKG_VERSION"),
                timestamp: chrono::Utc::now().to_rfc3339(),
            },
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service is unhealthy",
            ))
        }
    }
}

async fn not_found() -> impl IntoResponse {
    ApiError::new(StatusCode::NOT_FOUND, "Route not found")
}
