//! Betting data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::accounts::{BalanceField, UserId};
use crate::error::AdminError;

/// Six-digit public betting id
pub type BettingId = i64;

/// Bet lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BetStatus {
    BetApplied,
    BetCancelled,
    BetWon,
}

impl BetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BetStatus::BetApplied => "BetApplied",
            BetStatus::BetCancelled => "BetCancelled",
            BetStatus::BetWon => "BetWon",
        }
    }

    /// Cancelled and won bets never change again
    pub fn is_terminal(&self) -> bool {
        !matches!(self, BetStatus::BetApplied)
    }
}

impl std::fmt::Display for BetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BetStatus {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BetApplied" => Ok(BetStatus::BetApplied),
            "BetCancelled" => Ok(BetStatus::BetCancelled),
            "BetWon" => Ok(BetStatus::BetWon),
            other => Err(AdminError::validation(format!("Unknown bet status: {other}"))),
        }
    }
}

/// Betting record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Betting {
    pub id: Uuid,
    pub betting_id: BettingId,
    pub user_id: UserId,
    pub game: Option<String>,
    pub amount: i64,
    pub win_amount: i64,
    pub status: BetStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Betting {
    /// Percentage gain of `win_amount` over the stake
    pub fn weightage(&self) -> f64 {
        weightage(self.amount, self.win_amount)
    }

    /// Balance delta produced by moving this bet to `to`.
    ///
    /// Returns the transition error when `to` is not reachable from the
    /// current status.
    pub fn settlement(&self, to: BetStatus) -> Result<(BalanceField, i64), AdminError> {
        match (self.status, to) {
            (BetStatus::BetApplied, BetStatus::BetCancelled) => {
                Ok((BalanceField::Played, -self.amount))
            }
            (BetStatus::BetApplied, BetStatus::BetWon) => {
                Ok((BalanceField::Winnings, self.win_amount))
            }
            (from, to) => Err(AdminError::InvalidTransition {
                from: from.to_string(),
                to: to.to_string(),
            }),
        }
    }
}

/// `(win_amount - amount) / amount * 100`, or 0 for a zero stake
pub fn weightage(amount: i64, win_amount: i64) -> f64 {
    if amount == 0 {
        return 0.0;
    }
    (win_amount - amount) as f64 / amount as f64 * 100.0
}

/// Fields for inserting a betting record
#[derive(Debug, Clone)]
pub struct NewBet {
    pub betting_id: BettingId,
    pub user_id: UserId,
    pub game: Option<String>,
    pub amount: i64,
    pub win_amount: i64,
}

/// Bet placement request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetRequest {
    pub user_id: UserId,
    pub amount: i64,
    #[serde(default)]
    pub win_amount: i64,
    pub game: Option<String>,
}

/// Filter for bet listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BetFilter {
    pub user_id: Option<UserId>,
    pub status: Option<BetStatus>,
}

/// Betting record with its derived weightage, as returned to clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BettingView {
    #[serde(flatten)]
    pub betting: Betting,
    pub weightage: f64,
}

impl From<Betting> for BettingView {
    fn from(betting: Betting) -> Self {
        let weightage = betting.weightage();
        Self { betting, weightage }
    }
}
