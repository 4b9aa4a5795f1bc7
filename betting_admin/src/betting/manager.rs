//! Betting manager implementation.

use super::models::{BetFilter, BetStatus, Betting, BettingId, NewBet, PlaceBetRequest};
use crate::accounts::User;
use crate::db::SharedStore;
use crate::error::{AdminError, AdminResult};
use crate::ids::with_unique_id;
use crate::pagination::{Page, PageRequest};
use crate::settings::{MAXIMUM_BET_AMOUNT, MINIMUM_BET_AMOUNT, SettingsManager};

/// Reject amounts outside the open interval `(min, max)`
pub fn check_bet_bounds(amount: i64, min: f64, max: f64) -> AdminResult<()> {
    let value = amount as f64;
    if value > min && value < max {
        Ok(())
    } else {
        Err(AdminError::validation(format!(
            "Bet amount must be greater than {min} and less than {max}"
        )))
    }
}

/// Betting manager
#[derive(Clone)]
pub struct BettingManager {
    store: SharedStore,
    settings: SettingsManager,
}

impl BettingManager {
    pub fn new(store: SharedStore) -> Self {
        let settings = SettingsManager::new(store.clone());
        Self { store, settings }
    }

    /// Place a bet after the validation gate passes
    ///
    /// # Errors
    ///
    /// * `AdminError::Validation` - Non-positive amount, or amount outside the
    ///   configured bounds
    /// * `AdminError::NotFound` - A bound setting or the user is missing
    pub async fn place_bet(&self, request: PlaceBetRequest) -> AdminResult<(Betting, User)> {
        if request.amount <= 0 {
            return Err(AdminError::validation("Bet amount must be positive"));
        }
        if request.win_amount < 0 {
            return Err(AdminError::validation("Win amount must not be negative"));
        }

        let min = self.settings.require(MINIMUM_BET_AMOUNT).await?;
        let max = self.settings.require(MAXIMUM_BET_AMOUNT).await?;
        check_bet_bounds(request.amount, min, max)?;

        if self.store.find_user(request.user_id).await?.is_none() {
            return Err(AdminError::not_found("User", request.user_id));
        }

        let (betting, user) = with_unique_id("betting_id", |betting_id| {
            let store = self.store.clone();
            let bet = NewBet {
                betting_id,
                user_id: request.user_id,
                game: request.game.clone(),
                amount: request.amount,
                win_amount: request.win_amount,
            };
            async move { store.place_bet(bet).await }
        })
        .await?;

        log::info!(
            "Bet {} placed by user {} for {} (played now {})",
            betting.betting_id,
            user.user_id,
            betting.amount,
            user.balances.played_amount
        );
        Ok((betting, user))
    }

    /// Move a bet to `status` and settle it
    pub async fn update_status(
        &self,
        betting_id: BettingId,
        status: BetStatus,
    ) -> AdminResult<(Betting, User)> {
        match self.store.transition_bet(betting_id, status).await {
            Ok((betting, user)) => {
                log::info!(
                    "Bet {} of user {} is now {}",
                    betting_id,
                    user.user_id,
                    betting.status
                );
                Ok((betting, user))
            }
            Err(e @ AdminError::InvalidTransition { .. }) => {
                log::warn!("Refused status change of bet {}: {}", betting_id, e);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn get(&self, betting_id: BettingId) -> AdminResult<Betting> {
        self.store
            .find_bet(betting_id)
            .await?
            .ok_or_else(|| AdminError::not_found("Betting", betting_id))
    }

    pub async fn list(&self, filter: &BetFilter, page: PageRequest) -> AdminResult<Page<Betting>> {
        let (bets, total) = self.store.list_bets(filter, &page).await?;
        Ok(Page::new(bets, page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_are_exclusive() {
        assert!(check_bet_bounds(10, 10.0, 10_000.0).is_err());
        assert!(check_bet_bounds(11, 10.0, 10_000.0).is_ok());
        assert!(check_bet_bounds(9_999, 10.0, 10_000.0).is_ok());
        assert!(check_bet_bounds(10_000, 10.0, 10_000.0).is_err());
    }

    #[test]
    fn test_bounds_error_is_validation() {
        let err = check_bet_bounds(5, 10.0, 100.0).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }
}
