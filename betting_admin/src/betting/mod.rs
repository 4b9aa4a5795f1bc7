//! Bet placement and settlement.
//!
//! Placing a bet records it as `BetApplied` and adds the stake to the user's
//! played amount. Cancelling returns the stake; winning credits `winAmount`
//! to winnings. The record write and the balance change always land together.

pub mod manager;
pub mod models;

pub use manager::{BettingManager, check_bet_bounds};
pub use models::{
    BetFilter, BetStatus, Betting, BettingId, BettingView, NewBet, PlaceBetRequest, weightage,
};
