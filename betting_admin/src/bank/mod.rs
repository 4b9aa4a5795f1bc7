//! Per-user bank records with a single primary record.

pub mod manager;
pub mod models;

pub use manager::BankManager;
pub use models::{BankDetails, BankDetailsUpdate, NewBankDetails, yes_no};
