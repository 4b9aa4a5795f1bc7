//! Account ledger and user administration.

use super::models::{AccountStatus, BalanceField, User, UserFilter, UserId, UserUpdate, WalletSummary};
use crate::db::SharedStore;
use crate::error::{AdminError, AdminResult};
use crate::pagination::{Page, PageRequest};

/// Account ledger
#[derive(Clone)]
pub struct AccountLedger {
    store: SharedStore,
}

impl AccountLedger {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Add `delta` to one balance field of a user
    ///
    /// # Errors
    ///
    /// * `AdminError::Validation` - `delta` is zero or `i64::MIN`
    /// * `AdminError::NotFound` - User doesn't exist
    /// * `AdminError::InsufficientBalance` - The field would go negative
    /// * `AdminError::BalanceOverflow` - The field or the wallet total would
    ///   exceed `i64::MAX`
    pub async fn adjust_balance(
        &self,
        user_id: UserId,
        field: BalanceField,
        delta: i64,
    ) -> AdminResult<User> {
        if delta == 0 {
            return Err(AdminError::validation("Adjustment amount must not be zero"));
        }
        if delta == i64::MIN {
            return Err(AdminError::validation("Adjustment amount is out of range"));
        }

        let user = self.store.increment_balance(user_id, field, delta).await?;
        log::info!(
            "Adjusted {} of user {} by {} (now {})",
            field,
            user_id,
            delta,
            user.balances.get(field)
        );
        Ok(user)
    }

    /// Balances and derived wallet total of a user
    pub async fn get_wallet(&self, user_id: UserId) -> AdminResult<WalletSummary> {
        let user = self.get_user(user_id).await?;
        Ok(WalletSummary::from(&user))
    }

    pub async fn get_user(&self, user_id: UserId) -> AdminResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AdminError::not_found("User", user_id))
    }

    pub async fn list_users(
        &self,
        filter: &UserFilter,
        page: PageRequest,
    ) -> AdminResult<Page<User>> {
        let (users, total) = self.store.list_users(filter, &page).await?;
        Ok(Page::new(users, page, total))
    }

    /// Apply a partial update to profile, role or status fields
    pub async fn update_user(&self, user_id: UserId, update: UserUpdate) -> AdminResult<User> {
        if update.is_empty() {
            return Err(AdminError::validation("Nothing to update"));
        }
        if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(AdminError::validation("Name must not be empty"));
        }

        let user = self.store.update_user(user_id, &update).await?;
        log::info!("Updated user {}", user_id);
        Ok(user)
    }

    pub async fn set_status(&self, user_id: UserId, status: AccountStatus) -> AdminResult<User> {
        let update = UserUpdate {
            status: Some(status),
            ..Default::default()
        };
        let user = self.store.update_user(user_id, &update).await?;
        log::info!("User {} is now {}", user_id, status);
        Ok(user)
    }
}
