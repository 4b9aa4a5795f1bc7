//! Bank record management.
//!
//! The first record a user adds is primary. A record added or marked as
//! primary takes the flag from the previous one, and removing the primary
//! record promotes the earliest remaining record. Each of these is a single
//! store call, so a user never has two primary records.

use uuid::Uuid;

use super::models::{BankDetails, BankDetailsUpdate, NewBankDetails};
use crate::accounts::UserId;
use crate::db::SharedStore;
use crate::error::{AdminError, AdminResult};

fn require_field(name: &str, value: &str) -> AdminResult<()> {
    if value.trim().is_empty() {
        return Err(AdminError::validation(format!("{name} must not be empty")));
    }
    Ok(())
}

/// Bank record manager
#[derive(Clone)]
pub struct BankManager {
    store: SharedStore,
}

impl BankManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub async fn add(&self, user_id: UserId, bank: NewBankDetails) -> AdminResult<BankDetails> {
        require_field("accountHolder", &bank.account_holder)?;
        require_field("bankName", &bank.bank_name)?;
        require_field("accountNumber", &bank.account_number)?;
        require_field("ifscCode", &bank.ifsc_code)?;

        let record = self.store.add_bank(user_id, bank).await?;
        log::info!(
            "Added bank record {} for user {} (primary: {})",
            record.id,
            user_id,
            record.is_primary
        );
        Ok(record)
    }

    /// User's records, primary first
    pub async fn list(&self, user_id: UserId) -> AdminResult<Vec<BankDetails>> {
        self.store.list_banks(user_id).await
    }

    /// Fetch one of the user's records
    pub async fn get(&self, user_id: UserId, id: Uuid) -> AdminResult<BankDetails> {
        self.store
            .find_bank(id)
            .await?
            .filter(|b| b.user_id == user_id)
            .ok_or_else(|| AdminError::not_found("BankDetails", id))
    }

    /// Primary record of the user, if any
    pub async fn primary(&self, user_id: UserId) -> AdminResult<Option<BankDetails>> {
        Ok(self
            .store
            .list_banks(user_id)
            .await?
            .into_iter()
            .find(|b| b.is_primary))
    }

    /// Bank records of the earliest admin, where users send recharges
    pub async fn payment_accounts(&self) -> AdminResult<Vec<BankDetails>> {
        match self.store.find_first_admin().await? {
            Some(admin) => self.store.list_banks(admin.user_id).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn update(
        &self,
        user_id: UserId,
        id: Uuid,
        update: BankDetailsUpdate,
    ) -> AdminResult<BankDetails> {
        for (name, value) in [
            ("accountHolder", &update.account_holder),
            ("bankName", &update.bank_name),
            ("accountNumber", &update.account_number),
            ("ifscCode", &update.ifsc_code),
        ] {
            if let Some(value) = value {
                require_field(name, value)?;
            }
        }

        self.store.update_bank(user_id, id, &update).await
    }

    /// Make `id` the user's only primary record
    pub async fn set_primary(&self, user_id: UserId, id: Uuid) -> AdminResult<BankDetails> {
        let record = self.store.set_primary_bank(user_id, id).await?;
        log::info!("Bank record {} is now primary for user {}", id, user_id);
        Ok(record)
    }

    /// Remove a record; returns the record promoted to primary, if any
    pub async fn remove(&self, user_id: UserId, id: Uuid) -> AdminResult<Option<BankDetails>> {
        let promoted = self.store.remove_bank(user_id, id).await?;
        match &promoted {
            Some(next) => log::info!(
                "Removed primary bank record {} of user {}, promoted {}",
                id,
                user_id,
                next.id
            ),
            None => log::info!("Removed bank record {} of user {}", id, user_id),
        }
        Ok(promoted)
    }
}
