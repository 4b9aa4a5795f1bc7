//! # Betting Admin
//!
//! Ledger, settlement and administration core for a betting platform backend.
//!
//! The library owns every rule that moves money: per-user balances, bet
//! placement and settlement, the referral commission cascade, and the approval
//! of recharges and withdrawals. Storage sits behind the [`db::Store`] trait
//! with a PostgreSQL backend and an in-memory backend; each multi-record
//! change is a single atomic store call.
//!
//! ## Core Modules
//!
//! - [`accounts`]: Users, balances and the account ledger
//! - [`betting`]: Bet placement with configured bounds, and settlement
//! - [`referral`]: Referrer credit and commission tiers on registration
//! - [`transactions`]: Recharge/withdrawal requests and their approval
//! - [`bank`]: Bank records with a single primary record per user
//! - [`settings`]: Named numeric settings (bet bounds, referral amounts)
//! - [`catalog`]: Bonuses, banners, games and support queries
//! - [`auth`]: Password hashing, login and signed tokens
//! - [`db`]: Repository traits and the storage backends
//!
//! ## Example
//!
//! ```
//! use betting_admin::accounts::{AccountLedger, BalanceField};
//! use betting_admin::db::{MemoryStore, SharedStore};
//! use std::sync::Arc;
//!
//! # tokio_test();
//! # fn tokio_test() {
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store: SharedStore = Arc::new(MemoryStore::new());
//! let ledger = AccountLedger::new(store);
//!
//! // Unknown users are reported, not created
//! let result = ledger.adjust_balance(123456, BalanceField::Deposit, 100).await;
//! assert!(result.is_err());
//! # });
//! # }
//! ```

pub mod accounts;
pub mod auth;
pub mod bank;
pub mod betting;
pub mod catalog;
pub mod db;
pub mod error;
pub mod ids;
pub mod pagination;
pub mod referral;
pub mod settings;
pub mod transactions;

pub use error::{AdminError, AdminResult, ErrorKind};
pub use pagination::{Page, PageRequest};
