//! User accounts and the per-user balance ledger.
//!
//! Every balance change is an atomic increment in the store, so concurrent
//! adjustments to one user never overwrite each other. The wallet is derived
//! from the four spendable balances and never stored.

pub mod ledger;
pub mod models;

pub use ledger::AccountLedger;
pub use models::{
    AccountStatus, BalanceField, Balances, NewUser, Role, User, UserFilter, UserId, UserUpdate,
    WalletSummary,
};
