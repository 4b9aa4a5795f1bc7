//! Repository trait definitions for testability and dependency injection.
//!
//! Every method that touches more than one record is a single atomic unit in
//! each backend: either all of its writes land or none do. Managers never
//! compose two mutating calls where a partial result would break a ledger
//! invariant.

use async_trait::async_trait;
use uuid::Uuid;

use crate::accounts::{BalanceField, NewUser, User, UserFilter, UserId, UserUpdate};
use crate::bank::{BankDetails, BankDetailsUpdate, NewBankDetails};
use crate::betting::{BetFilter, BetStatus, Betting, BettingId, NewBet};
use crate::catalog::{DocumentFilter, StoredDocument};
use crate::error::AdminResult;
use crate::pagination::PageRequest;
use crate::referral::{ReferralCredit, Registration};
use crate::settings::AmountSetting;
use crate::transactions::{Decision, MoneyTransaction, NewTransaction, TransactionFilter};

/// Trait for user account operations
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a user and, in the same atomic step, credit the referrer:
    /// referral count +1, bonus +`credit.bonus`, and for `user`-role
    /// referrers the commission percentage of the tier met by the new count.
    ///
    /// Fails with `Duplicate("user_id" | "email" | "promo_code")` on a taken
    /// unique field and with `NotFound` when the referrer vanished.
    async fn create_user(
        &self,
        user: NewUser,
        referral: Option<ReferralCredit>,
    ) -> AdminResult<Registration>;

    /// Find user by six-digit id
    async fn find_user(&self, user_id: UserId) -> AdminResult<Option<User>>;

    /// Find user and password hash by email (case-insensitive)
    async fn find_credentials(&self, email: &str) -> AdminResult<Option<(User, String)>>;

    /// Find user by own promo code (case-insensitive exact match)
    async fn find_by_promo_code(&self, code: &str) -> AdminResult<Option<User>>;

    /// Earliest created admin or super-admin account
    async fn find_first_admin(&self) -> AdminResult<Option<User>>;

    /// List users, newest first, with the total match count
    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<User>, i64)>;

    /// Apply a partial profile update
    async fn update_user(&self, user_id: UserId, update: &UserUpdate) -> AdminResult<User>;

    /// Atomically add `delta` to one balance field.
    ///
    /// Fails with `InsufficientBalance` when the field would go negative.
    async fn increment_balance(
        &self,
        user_id: UserId,
        field: BalanceField,
        delta: i64,
    ) -> AdminResult<User>;
}

/// Trait for betting operations
#[async_trait]
pub trait BettingRepository: Send + Sync {
    /// Insert a `BetApplied` record and add its amount to the user's
    /// played amount, atomically
    async fn place_bet(&self, bet: NewBet) -> AdminResult<(Betting, User)>;

    /// Move a bet to `to` and apply [`Betting::settlement`], atomically
    async fn transition_bet(
        &self,
        betting_id: BettingId,
        to: BetStatus,
    ) -> AdminResult<(Betting, User)>;

    async fn find_bet(&self, betting_id: BettingId) -> AdminResult<Option<Betting>>;

    async fn list_bets(
        &self,
        filter: &BetFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<Betting>, i64)>;
}

/// Trait for recharge/withdrawal operations
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Insert a `Pending` transaction
    async fn create_transaction(&self, txn: NewTransaction) -> AdminResult<MoneyTransaction>;

    async fn find_transaction(&self, id: Uuid) -> AdminResult<Option<MoneyTransaction>>;

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<MoneyTransaction>, i64)>;

    /// Flip a `Pending` transaction to the decided status and apply
    /// [`MoneyTransaction::settlement`] in the same atomic step. Returns the
    /// user when a balance changed.
    async fn decide_transaction(
        &self,
        id: Uuid,
        decision: Decision,
    ) -> AdminResult<(MoneyTransaction, Option<User>)>;
}

/// Trait for bank record operations
#[async_trait]
pub trait BankRepository: Send + Sync {
    /// Insert a record. It becomes primary when requested or when the user has
    /// no other record; any previous primary is cleared in the same step.
    async fn add_bank(&self, user_id: UserId, bank: NewBankDetails) -> AdminResult<BankDetails>;

    async fn find_bank(&self, id: Uuid) -> AdminResult<Option<BankDetails>>;

    /// User's records, primary first then oldest first
    async fn list_banks(&self, user_id: UserId) -> AdminResult<Vec<BankDetails>>;

    async fn update_bank(
        &self,
        user_id: UserId,
        id: Uuid,
        update: &BankDetailsUpdate,
    ) -> AdminResult<BankDetails>;

    /// Make `id` the user's only primary record
    async fn set_primary_bank(&self, user_id: UserId, id: Uuid) -> AdminResult<BankDetails>;

    /// Delete a record; when it was primary, promote the earliest remaining
    /// record and return it
    async fn remove_bank(&self, user_id: UserId, id: Uuid) -> AdminResult<Option<BankDetails>>;
}

/// Trait for AmountSetup operations
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn create_setting(&self, name: &str, value: f64) -> AdminResult<AmountSetting>;

    async fn find_setting(&self, name: &str) -> AdminResult<Option<AmountSetting>>;

    async fn list_settings(&self) -> AdminResult<Vec<AmountSetting>>;

    async fn update_setting(&self, id: Uuid, value: f64) -> AdminResult<AmountSetting>;

    async fn delete_setting(&self, id: Uuid) -> AdminResult<bool>;
}

/// Trait for schemaless collection operations
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Fails with `Duplicate("public_id")` when the id is taken in the collection
    async fn insert_document(
        &self,
        collection: &str,
        public_id: i64,
        body: serde_json::Value,
    ) -> AdminResult<StoredDocument>;

    async fn find_document(
        &self,
        collection: &str,
        public_id: i64,
    ) -> AdminResult<Option<StoredDocument>>;

    async fn list_documents(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<StoredDocument>, i64)>;

    async fn replace_document(
        &self,
        collection: &str,
        public_id: i64,
        body: serde_json::Value,
    ) -> AdminResult<Option<StoredDocument>>;

    async fn delete_document(&self, collection: &str, public_id: i64) -> AdminResult<bool>;
}

/// Complete storage backend
#[async_trait]
pub trait Store:
    UserRepository
    + BettingRepository
    + TransactionRepository
    + BankRepository
    + SettingsRepository
    + DocumentRepository
{
    /// Check that the backend answers
    async fn health_check(&self) -> AdminResult<()>;
}
