//! Recharge and withdrawal requests and their approval.
//!
//! A transaction starts `Pending` and ends `Approved` or `Rejected`. Approval
//! flips the status and moves the money in one atomic store call, so a
//! transaction can never be credited twice or credited without being marked.

pub mod manager;
pub mod models;

pub use manager::TransactionManager;
pub use models::{
    Decision, DecisionRequest, MoneyTransaction, NewTransaction, RechargeRequest,
    TransactionFilter, TransactionKind, TransactionStatus, WithdrawalRequest,
};
