//! Deposit (recharge) and withdrawal transaction models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::accounts::{BalanceField, UserId};
use crate::error::AdminError;

/// Transaction kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
    Recharge,
    Withdrawal,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Recharge => "Recharge",
            TransactionKind::Withdrawal => "Withdrawal",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionKind {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Recharge" => Ok(TransactionKind::Recharge),
            "Withdrawal" => Ok(TransactionKind::Withdrawal),
            other => Err(AdminError::validation(format!(
                "Unknown transaction kind: {other}"
            ))),
        }
    }
}

/// Transaction status. `Approved` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Pending,
    Approved,
    Rejected,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Approved => "Approved",
            TransactionStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TransactionStatus::Pending)
    }

    /// Only `Pending → Approved` and `Pending → Rejected` are allowed
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        matches!(
            (self, next),
            (
                TransactionStatus::Pending,
                TransactionStatus::Approved | TransactionStatus::Rejected
            )
        )
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(TransactionStatus::Pending),
            "Approved" => Ok(TransactionStatus::Approved),
            "Rejected" => Ok(TransactionStatus::Rejected),
            other => Err(AdminError::validation(format!(
                "Unknown transaction status: {other}"
            ))),
        }
    }
}

/// Recharge or withdrawal record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyTransaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub user_id: UserId,
    /// Admin account paid into (recharge) or user account paid out to (withdrawal)
    pub bank_account_id: Uuid,
    pub amount: i64,
    pub status: TransactionStatus,
    /// Payment reference from the user (recharge) or stamped on approval (withdrawal)
    pub reference: Option<String>,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl MoneyTransaction {
    /// Ledger effect of moving to `to`: `None` when the transition carries no
    /// balance change, an error when the transition is not allowed.
    pub fn settlement(
        &self,
        to: TransactionStatus,
    ) -> Result<Option<(BalanceField, i64)>, AdminError> {
        if !self.status.can_transition_to(to) {
            return Err(AdminError::InvalidTransition {
                from: self.status.to_string(),
                to: to.to_string(),
            });
        }

        Ok(match (self.kind, to) {
            (TransactionKind::Recharge, TransactionStatus::Approved) => {
                Some((BalanceField::Deposit, self.amount))
            }
            (TransactionKind::Withdrawal, TransactionStatus::Approved) => {
                Some((BalanceField::Winnings, -self.amount))
            }
            _ => None,
        })
    }
}

/// Fields for inserting a transaction
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub user_id: UserId,
    pub bank_account_id: Uuid,
    pub amount: i64,
    pub reference: Option<String>,
}

/// Admin decision on a pending transaction
#[derive(Debug, Clone)]
pub struct Decision {
    pub status: TransactionStatus,
    /// Replaces the stored reference when present
    pub reference: Option<String>,
    pub remark: Option<String>,
}

/// Body of an approve/reject call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    /// Transaction reference stamped on approval
    pub reference: Option<String>,
    pub remark: Option<String>,
}

/// Recharge request from a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RechargeRequest {
    pub amount: i64,
    /// Admin bank record the money was sent to
    pub bank_account_id: Uuid,
    pub reference: Option<String>,
}

/// Withdrawal request from a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalRequest {
    pub amount: i64,
    pub bank_account_id: Uuid,
}

/// Filter for transaction listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionFilter {
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub user_id: Option<UserId>,
}
