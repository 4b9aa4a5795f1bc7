//! In-process storage backend.
//!
//! All state sits behind one async mutex, so every trait method runs as a
//! single atomic step. Mutating methods stage changes on clones and write them
//! back only after every check passed.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::repository::{
    BankRepository, BettingRepository, DocumentRepository, SettingsRepository, Store,
    TransactionRepository, UserRepository,
};
use crate::accounts::{
    AccountStatus, BalanceField, Balances, NewUser, Role, User, UserFilter, UserId, UserUpdate,
};
use crate::bank::{BankDetails, BankDetailsUpdate, NewBankDetails};
use crate::betting::{BetFilter, BetStatus, Betting, BettingId, NewBet};
use crate::catalog::{DocumentFilter, StoredDocument};
use crate::error::{AdminError, AdminResult};
use crate::pagination::{PageRequest, slice_page};
use crate::referral::{ReferralCredit, Registration, commission_for};
use crate::settings::AmountSetting;
use crate::transactions::{
    Decision, MoneyTransaction, NewTransaction, TransactionFilter, TransactionStatus,
};

struct UserRecord {
    user: User,
    password_hash: String,
}

#[derive(Default)]
struct Inner {
    users: Vec<UserRecord>,
    bets: Vec<Betting>,
    transactions: Vec<MoneyTransaction>,
    banks: Vec<BankDetails>,
    settings: Vec<AmountSetting>,
    documents: Vec<(String, StoredDocument)>,
}

impl Inner {
    fn user(&self, user_id: UserId) -> AdminResult<&User> {
        self.users
            .iter()
            .map(|r| &r.user)
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| AdminError::not_found("User", user_id))
    }

    fn user_mut(&mut self, user_id: UserId) -> AdminResult<&mut User> {
        self.users
            .iter_mut()
            .map(|r| &mut r.user)
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| AdminError::not_found("User", user_id))
    }

    fn banks_of(&mut self, user_id: UserId) -> impl Iterator<Item = &mut BankDetails> {
        self.banks.iter_mut().filter(move |b| b.user_id == user_id)
    }
}

/// Add `delta` to `field`, refusing to go below zero
fn apply_delta(user: &mut User, field: BalanceField, delta: i64) -> AdminResult<()> {
    let current = user.balances.get(field);
    let next = current
        .checked_add(delta)
        .ok_or(AdminError::BalanceOverflow)?;
    if next < 0 {
        return Err(AdminError::InsufficientBalance {
            available: current,
            required: delta.saturating_neg(),
        });
    }
    let mut balances = user.balances;
    *balances.get_mut(field) = next;
    if balances.checked_wallet().is_none() {
        return Err(AdminError::BalanceOverflow);
    }
    user.balances = balances;
    user.updated_at = Utc::now();
    Ok(())
}

/// Newest-first page of the items passing `keep`
fn newest_first<T: Clone>(
    items: &[T],
    keep: impl Fn(&T) -> bool,
    page: &PageRequest,
) -> (Vec<T>, i64) {
    let matching: Vec<T> = items.iter().rev().filter(|i| keep(i)).cloned().collect();
    let total = matching.len() as i64;
    (slice_page(&matching, page), total)
}

/// In-memory [`Store`]
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(
        &self,
        new_user: NewUser,
        referral: Option<ReferralCredit>,
    ) -> AdminResult<Registration> {
        let mut inner = self.inner.lock().await;

        for record in &inner.users {
            let u = &record.user;
            if u.user_id == new_user.user_id {
                return Err(AdminError::Duplicate("user_id".into()));
            }
            if u.email.eq_ignore_ascii_case(&new_user.email) {
                return Err(AdminError::Duplicate("email".into()));
            }
            if u.promo_code.eq_ignore_ascii_case(&new_user.promo_code) {
                return Err(AdminError::Duplicate("promo_code".into()));
            }
        }

        let referrer = match &referral {
            Some(credit) => {
                let mut referrer = inner.user(credit.referrer_id)?.clone();
                referrer.number_of_referrals += 1;
                apply_delta(&mut referrer, BalanceField::Bonus, credit.bonus)?;
                if referrer.role == Role::User {
                    if let Some(pct) = commission_for(referrer.number_of_referrals, &credit.tiers)
                    {
                        referrer.commission_percentage = pct;
                    }
                }
                Some(referrer)
            }
            None => None,
        };

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            user_id: new_user.user_id,
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
            role: new_user.role,
            status: AccountStatus::Active,
            promo_code: new_user.promo_code,
            reference_code: new_user.reference_code,
            referred_by: new_user.referred_by,
            number_of_referrals: 0,
            commission_percentage: 0.0,
            accessible_games: new_user.accessible_games,
            balances: Balances::default(),
            created_at: now,
            updated_at: now,
        };

        if let Some(updated) = &referrer {
            *inner.user_mut(updated.user_id)? = updated.clone();
        }
        inner.users.push(UserRecord {
            user: user.clone(),
            password_hash: new_user.password_hash,
        });

        Ok(Registration { user, referrer })
    }

    async fn find_user(&self, user_id: UserId) -> AdminResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner.user(user_id).ok().cloned())
    }

    async fn find_credentials(&self, email: &str) -> AdminResult<Option<(User, String)>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .iter()
            .find(|r| r.user.email.eq_ignore_ascii_case(email))
            .map(|r| (r.user.clone(), r.password_hash.clone())))
    }

    async fn find_by_promo_code(&self, code: &str) -> AdminResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .iter()
            .find(|r| r.user.promo_code.eq_ignore_ascii_case(code))
            .map(|r| r.user.clone()))
    }

    async fn find_first_admin(&self) -> AdminResult<Option<User>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .iter()
            .find(|r| r.user.role.is_admin())
            .map(|r| r.user.clone()))
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<User>, i64)> {
        let inner = self.inner.lock().await;
        let users: Vec<User> = inner.users.iter().map(|r| r.user.clone()).collect();
        let search = filter.search.as_deref().map(str::to_lowercase);

        Ok(newest_first(
            &users,
            |u| {
                filter.role.is_none_or(|r| u.role == r)
                    && filter.status.is_none_or(|s| u.status == s)
                    && search.as_deref().is_none_or(|q| {
                        u.name.to_lowercase().contains(q) || u.email.to_lowercase().contains(q)
                    })
            },
            page,
        ))
    }

    async fn update_user(&self, user_id: UserId, update: &UserUpdate) -> AdminResult<User> {
        let mut inner = self.inner.lock().await;
        let user = inner.user_mut(user_id)?;

        if let Some(name) = &update.name {
            user.name = name.clone();
        }
        if let Some(phone) = &update.phone {
            user.phone = Some(phone.clone());
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(status) = update.status {
            user.status = status;
        }
        if let Some(games) = &update.accessible_games {
            user.accessible_games = games.clone();
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn increment_balance(
        &self,
        user_id: UserId,
        field: BalanceField,
        delta: i64,
    ) -> AdminResult<User> {
        let mut inner = self.inner.lock().await;
        let user = inner.user_mut(user_id)?;
        apply_delta(user, field, delta)?;
        Ok(user.clone())
    }
}

#[async_trait]
impl BettingRepository for MemoryStore {
    async fn place_bet(&self, bet: NewBet) -> AdminResult<(Betting, User)> {
        let mut inner = self.inner.lock().await;

        if inner.bets.iter().any(|b| b.betting_id == bet.betting_id) {
            return Err(AdminError::Duplicate("betting_id".into()));
        }

        let mut user = inner.user(bet.user_id)?.clone();
        apply_delta(&mut user, BalanceField::Played, bet.amount)?;

        let now = Utc::now();
        let betting = Betting {
            id: Uuid::new_v4(),
            betting_id: bet.betting_id,
            user_id: bet.user_id,
            game: bet.game,
            amount: bet.amount,
            win_amount: bet.win_amount,
            status: BetStatus::BetApplied,
            created_at: now,
            updated_at: now,
        };

        *inner.user_mut(user.user_id)? = user.clone();
        inner.bets.push(betting.clone());

        Ok((betting, user))
    }

    async fn transition_bet(
        &self,
        betting_id: BettingId,
        to: BetStatus,
    ) -> AdminResult<(Betting, User)> {
        let mut inner = self.inner.lock().await;

        let index = inner
            .bets
            .iter()
            .position(|b| b.betting_id == betting_id)
            .ok_or_else(|| AdminError::not_found("Betting", betting_id))?;
        let mut betting = inner.bets[index].clone();
        let (field, delta) = betting.settlement(to)?;

        let mut user = inner.user(betting.user_id)?.clone();
        apply_delta(&mut user, field, delta)?;

        betting.status = to;
        betting.updated_at = Utc::now();
        *inner.user_mut(user.user_id)? = user.clone();
        inner.bets[index] = betting.clone();

        Ok((betting, user))
    }

    async fn find_bet(&self, betting_id: BettingId) -> AdminResult<Option<Betting>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .bets
            .iter()
            .find(|b| b.betting_id == betting_id)
            .cloned())
    }

    async fn list_bets(
        &self,
        filter: &BetFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<Betting>, i64)> {
        let inner = self.inner.lock().await;
        Ok(newest_first(
            &inner.bets,
            |b| {
                filter.user_id.is_none_or(|u| b.user_id == u)
                    && filter.status.is_none_or(|s| b.status == s)
            },
            page,
        ))
    }
}

#[async_trait]
impl TransactionRepository for MemoryStore {
    async fn create_transaction(&self, txn: NewTransaction) -> AdminResult<MoneyTransaction> {
        let mut inner = self.inner.lock().await;
        inner.user(txn.user_id)?;

        let now = Utc::now();
        let record = MoneyTransaction {
            id: Uuid::new_v4(),
            kind: txn.kind,
            user_id: txn.user_id,
            bank_account_id: txn.bank_account_id,
            amount: txn.amount,
            status: TransactionStatus::Pending,
            reference: txn.reference,
            remark: None,
            created_at: now,
            updated_at: now,
        };
        inner.transactions.push(record.clone());

        Ok(record)
    }

    async fn find_transaction(&self, id: Uuid) -> AdminResult<Option<MoneyTransaction>> {
        let inner = self.inner.lock().await;
        Ok(inner.transactions.iter().find(|t| t.id == id).cloned())
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<MoneyTransaction>, i64)> {
        let inner = self.inner.lock().await;
        Ok(newest_first(
            &inner.transactions,
            |t| {
                filter.kind.is_none_or(|k| t.kind == k)
                    && filter.status.is_none_or(|s| t.status == s)
                    && filter.user_id.is_none_or(|u| t.user_id == u)
            },
            page,
        ))
    }

    async fn decide_transaction(
        &self,
        id: Uuid,
        decision: Decision,
    ) -> AdminResult<(MoneyTransaction, Option<User>)> {
        let mut inner = self.inner.lock().await;

        let index = inner
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AdminError::not_found("Transaction", id))?;
        let mut txn = inner.transactions[index].clone();

        let user = match txn.settlement(decision.status)? {
            Some((field, delta)) => {
                let mut user = inner.user(txn.user_id)?.clone();
                apply_delta(&mut user, field, delta)?;
                Some(user)
            }
            None => None,
        };

        txn.status = decision.status;
        if decision.reference.is_some() {
            txn.reference = decision.reference;
        }
        if decision.remark.is_some() {
            txn.remark = decision.remark;
        }
        txn.updated_at = Utc::now();

        if let Some(user) = &user {
            *inner.user_mut(user.user_id)? = user.clone();
        }
        inner.transactions[index] = txn.clone();

        Ok((txn, user))
    }
}

#[async_trait]
impl BankRepository for MemoryStore {
    async fn add_bank(&self, user_id: UserId, bank: NewBankDetails) -> AdminResult<BankDetails> {
        let mut inner = self.inner.lock().await;
        inner.user(user_id)?;

        let has_records = inner.banks.iter().any(|b| b.user_id == user_id);
        let is_primary = bank.is_primary || !has_records;
        if is_primary {
            for existing in inner.banks_of(user_id) {
                existing.is_primary = false;
            }
        }

        let now = Utc::now();
        let record = BankDetails {
            id: Uuid::new_v4(),
            user_id,
            account_holder: bank.account_holder,
            bank_name: bank.bank_name,
            account_number: bank.account_number,
            ifsc_code: bank.ifsc_code,
            upi_id: bank.upi_id,
            is_primary,
            created_at: now,
            updated_at: now,
        };
        inner.banks.push(record.clone());

        Ok(record)
    }

    async fn find_bank(&self, id: Uuid) -> AdminResult<Option<BankDetails>> {
        let inner = self.inner.lock().await;
        Ok(inner.banks.iter().find(|b| b.id == id).cloned())
    }

    async fn list_banks(&self, user_id: UserId) -> AdminResult<Vec<BankDetails>> {
        let inner = self.inner.lock().await;
        let mut banks: Vec<BankDetails> = inner
            .banks
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        banks.sort_by_key(|b| !b.is_primary);
        Ok(banks)
    }

    async fn update_bank(
        &self,
        user_id: UserId,
        id: Uuid,
        update: &BankDetailsUpdate,
    ) -> AdminResult<BankDetails> {
        let mut inner = self.inner.lock().await;
        let bank = inner
            .banks_of(user_id)
            .find(|b| b.id == id)
            .ok_or_else(|| AdminError::not_found("BankDetails", id))?;

        if let Some(v) = &update.account_holder {
            bank.account_holder = v.clone();
        }
        if let Some(v) = &update.bank_name {
            bank.bank_name = v.clone();
        }
        if let Some(v) = &update.account_number {
            bank.account_number = v.clone();
        }
        if let Some(v) = &update.ifsc_code {
            bank.ifsc_code = v.clone();
        }
        if let Some(v) = &update.upi_id {
            bank.upi_id = Some(v.clone());
        }
        bank.updated_at = Utc::now();

        Ok(bank.clone())
    }

    async fn set_primary_bank(&self, user_id: UserId, id: Uuid) -> AdminResult<BankDetails> {
        let mut inner = self.inner.lock().await;

        if !inner.banks.iter().any(|b| b.user_id == user_id && b.id == id) {
            return Err(AdminError::not_found("BankDetails", id));
        }

        let now = Utc::now();
        let mut chosen = None;
        for bank in inner.banks_of(user_id) {
            let primary = bank.id == id;
            if bank.is_primary != primary {
                bank.is_primary = primary;
                bank.updated_at = now;
            }
            if primary {
                chosen = Some(bank.clone());
            }
        }

        chosen.ok_or_else(|| AdminError::not_found("BankDetails", id))
    }

    async fn remove_bank(&self, user_id: UserId, id: Uuid) -> AdminResult<Option<BankDetails>> {
        let mut inner = self.inner.lock().await;

        let index = inner
            .banks
            .iter()
            .position(|b| b.user_id == user_id && b.id == id)
            .ok_or_else(|| AdminError::not_found("BankDetails", id))?;
        let removed = inner.banks.remove(index);

        if !removed.is_primary {
            return Ok(None);
        }

        Ok(inner.banks_of(user_id).next().map(|next| {
            next.is_primary = true;
            next.updated_at = Utc::now();
            next.clone()
        }))
    }
}

#[async_trait]
impl SettingsRepository for MemoryStore {
    async fn create_setting(&self, name: &str, value: f64) -> AdminResult<AmountSetting> {
        let mut inner = self.inner.lock().await;

        if inner.settings.iter().any(|s| s.name == name) {
            return Err(AdminError::Duplicate("name".into()));
        }

        let now = Utc::now();
        let setting = AmountSetting {
            id: Uuid::new_v4(),
            name: name.to_string(),
            value,
            created_at: now,
            updated_at: now,
        };
        inner.settings.push(setting.clone());

        Ok(setting)
    }

    async fn find_setting(&self, name: &str) -> AdminResult<Option<AmountSetting>> {
        let inner = self.inner.lock().await;
        Ok(inner.settings.iter().find(|s| s.name == name).cloned())
    }

    async fn list_settings(&self) -> AdminResult<Vec<AmountSetting>> {
        let inner = self.inner.lock().await;
        let mut settings = inner.settings.clone();
        settings.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(settings)
    }

    async fn update_setting(&self, id: Uuid, value: f64) -> AdminResult<AmountSetting> {
        let mut inner = self.inner.lock().await;
        let setting = inner
            .settings
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| AdminError::not_found("AmountSetup", id))?;

        setting.value = value;
        setting.updated_at = Utc::now();

        Ok(setting.clone())
    }

    async fn delete_setting(&self, id: Uuid) -> AdminResult<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.settings.len();
        inner.settings.retain(|s| s.id != id);
        Ok(inner.settings.len() < before)
    }
}

#[async_trait]
impl DocumentRepository for MemoryStore {
    async fn insert_document(
        &self,
        collection: &str,
        public_id: i64,
        body: serde_json::Value,
    ) -> AdminResult<StoredDocument> {
        let mut inner = self.inner.lock().await;

        if inner
            .documents
            .iter()
            .any(|(c, d)| c == collection && d.public_id == public_id)
        {
            return Err(AdminError::Duplicate("public_id".into()));
        }

        let now = Utc::now();
        let document = StoredDocument {
            id: Uuid::new_v4(),
            public_id,
            body,
            created_at: now,
            updated_at: now,
        };
        inner
            .documents
            .push((collection.to_string(), document.clone()));

        Ok(document)
    }

    async fn find_document(
        &self,
        collection: &str,
        public_id: i64,
    ) -> AdminResult<Option<StoredDocument>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .documents
            .iter()
            .find(|(c, d)| c == collection && d.public_id == public_id)
            .map(|(_, d)| d.clone()))
    }

    async fn list_documents(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<StoredDocument>, i64)> {
        let inner = self.inner.lock().await;
        let (entries, total) = newest_first(
            &inner.documents,
            |(c, d)| c == collection && filter.matches(&d.body),
            page,
        );
        Ok((entries.into_iter().map(|(_, d)| d).collect(), total))
    }

    async fn replace_document(
        &self,
        collection: &str,
        public_id: i64,
        body: serde_json::Value,
    ) -> AdminResult<Option<StoredDocument>> {
        let mut inner = self.inner.lock().await;
        Ok(inner
            .documents
            .iter_mut()
            .find(|(c, d)| c == collection && d.public_id == public_id)
            .map(|(_, d)| {
                d.body = body;
                d.updated_at = Utc::now();
                d.clone()
            }))
    }

    async fn delete_document(&self, collection: &str, public_id: i64) -> AdminResult<bool> {
        let mut inner = self.inner.lock().await;
        let before = inner.documents.len();
        inner
            .documents
            .retain(|(c, d)| !(c == collection && d.public_id == public_id));
        Ok(inner.documents.len() < before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> AdminResult<()> {
        Ok(())
    }
}
