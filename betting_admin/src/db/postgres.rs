//! PostgreSQL storage backend.
//!
//! Balance changes are single `UPDATE ... SET col = col + $n` statements
//! guarded by `col + $n >= 0`, so concurrent writers never lose an update.
//! Multi-record operations run inside one transaction and lock the rows they
//! decide on with `FOR UPDATE`.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::{
    PgConnection, Row,
    postgres::{PgPool, PgRow},
    types::Json,
};
use uuid::Uuid;

use super::repository::{
    BankRepository, BettingRepository, DocumentRepository, SettingsRepository, Store,
    TransactionRepository, UserRepository,
};
use crate::accounts::{BalanceField, Balances, NewUser, Role, User, UserFilter, UserId, UserUpdate};
use crate::bank::{BankDetails, BankDetailsUpdate, NewBankDetails};
use crate::betting::{BetFilter, BetStatus, Betting, BettingId, NewBet};
use crate::catalog::{DocumentFilter, StoredDocument};
use crate::error::{AdminError, AdminResult};
use crate::pagination::PageRequest;
use crate::referral::{ReferralCredit, Registration, commission_for};
use crate::settings::AmountSetting;
use crate::transactions::{Decision, MoneyTransaction, NewTransaction, TransactionFilter};

macro_rules! user_columns {
    () => {
        "id, user_id, name, email, phone, role, status, promo_code, reference_code, \
         referred_by, number_of_referrals, commission_percentage, accessible_games, \
         deposit_amount, winnings_amount, bonus_amount, commission_amount, played_amount, \
         created_at, updated_at"
    };
}

macro_rules! betting_columns {
    () => {
        "id, betting_id, user_id, game, amount, win_amount, status, created_at, updated_at"
    };
}

macro_rules! transaction_columns {
    () => {
        "id, kind, user_id, bank_account_id, amount, status, reference, remark, \
         created_at, updated_at"
    };
}

macro_rules! bank_columns {
    () => {
        "id, user_id, account_holder, bank_name, account_number, ifsc_code, upi_id, \
         is_primary, created_at, updated_at"
    };
}

macro_rules! setting_columns {
    () => {
        "id, name, value, created_at, updated_at"
    };
}

macro_rules! document_columns {
    () => {
        "id, public_id, body, created_at, updated_at"
    };
}

/// Map unique violations to `Duplicate(field)`, and out-of-range arithmetic
/// or a wallet total past `BIGINT` to `BalanceOverflow`
fn map_db_error(err: sqlx::Error) -> AdminError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            let field = match db.constraint() {
                Some("users_user_id_key") => "user_id",
                Some("users_email_key") => "email",
                Some("users_promo_code_key") => "promo_code",
                Some("bettings_betting_id_key") => "betting_id",
                Some("amount_setups_name_key") => "name",
                Some("documents_collection_public_id_key") => "public_id",
                Some("bank_details_one_primary") => "primary",
                other => other.unwrap_or("unknown"),
            };
            return AdminError::Duplicate(field.to_string());
        }
        match (db.code().as_deref(), db.constraint()) {
            (Some("22003"), _) | (Some("23514"), Some("users_wallet_range")) => {
                return AdminError::BalanceOverflow;
            }
            _ => {}
        }
    }
    AdminError::Database(err)
}

fn timestamp(row: &PgRow, column: &str) -> AdminResult<chrono::DateTime<chrono::Utc>> {
    Ok(row.try_get::<NaiveDateTime, _>(column)?.and_utc())
}

fn user_from_row(row: &PgRow) -> AdminResult<User> {
    Ok(User {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        role: row.try_get::<String, _>("role")?.parse()?,
        status: row.try_get::<String, _>("status")?.parse()?,
        promo_code: row.try_get("promo_code")?,
        reference_code: row.try_get("reference_code")?,
        referred_by: row.try_get("referred_by")?,
        number_of_referrals: row.try_get("number_of_referrals")?,
        commission_percentage: row.try_get("commission_percentage")?,
        accessible_games: row.try_get("accessible_games")?,
        balances: Balances {
            deposit_amount: row.try_get("deposit_amount")?,
            winnings_amount: row.try_get("winnings_amount")?,
            bonus_amount: row.try_get("bonus_amount")?,
            commission_amount: row.try_get("commission_amount")?,
            played_amount: row.try_get("played_amount")?,
        },
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn betting_from_row(row: &PgRow) -> AdminResult<Betting> {
    Ok(Betting {
        id: row.try_get("id")?,
        betting_id: row.try_get("betting_id")?,
        user_id: row.try_get("user_id")?,
        game: row.try_get("game")?,
        amount: row.try_get("amount")?,
        win_amount: row.try_get("win_amount")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn transaction_from_row(row: &PgRow) -> AdminResult<MoneyTransaction> {
    Ok(MoneyTransaction {
        id: row.try_get("id")?,
        kind: row.try_get::<String, _>("kind")?.parse()?,
        user_id: row.try_get("user_id")?,
        bank_account_id: row.try_get("bank_account_id")?,
        amount: row.try_get("amount")?,
        status: row.try_get::<String, _>("status")?.parse()?,
        reference: row.try_get("reference")?,
        remark: row.try_get("remark")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn bank_from_row(row: &PgRow) -> AdminResult<BankDetails> {
    Ok(BankDetails {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        account_holder: row.try_get("account_holder")?,
        bank_name: row.try_get("bank_name")?,
        account_number: row.try_get("account_number")?,
        ifsc_code: row.try_get("ifsc_code")?,
        upi_id: row.try_get("upi_id")?,
        is_primary: row.try_get("is_primary")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn setting_from_row(row: &PgRow) -> AdminResult<AmountSetting> {
    Ok(AmountSetting {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        value: row.try_get("value")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

fn document_from_row(row: &PgRow) -> AdminResult<StoredDocument> {
    Ok(StoredDocument {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        body: row.try_get::<serde_json::Value, _>("body")?,
        created_at: timestamp(row, "created_at")?,
        updated_at: timestamp(row, "updated_at")?,
    })
}

/// Guarded increment of one balance column
async fn apply_balance(
    conn: &mut PgConnection,
    user_id: UserId,
    field: BalanceField,
    delta: i64,
) -> AdminResult<User> {
    let sql = format!(
        "UPDATE users SET {col} = {col} + $2, updated_at = NOW() \
         WHERE user_id = $1 AND {col} + $2 >= 0 RETURNING {cols}",
        col = field.column(),
        cols = user_columns!(),
    );
    let row = sqlx::query(&sql)
        .bind(user_id)
        .bind(delta)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_db_error)?;

    if let Some(row) = row {
        return user_from_row(&row);
    }

    // Distinguish a missing user from an insufficient balance
    let sql = format!("SELECT {} FROM users WHERE user_id = $1", field.column());
    let current = sqlx::query(&sql)
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

    match current {
        Some(row) => Err(AdminError::InsufficientBalance {
            available: row.try_get::<i64, _>(0)?,
            required: delta.saturating_neg(),
        }),
        None => Err(AdminError::not_found("User", user_id)),
    }
}

/// Serialize bank-record writes per user
async fn lock_user(conn: &mut PgConnection, user_id: UserId) -> AdminResult<()> {
    sqlx::query("SELECT user_id FROM users WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AdminError::not_found("User", user_id))?;
    Ok(())
}

/// PostgreSQL-backed [`Store`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(
        &self,
        new_user: NewUser,
        referral: Option<ReferralCredit>,
    ) -> AdminResult<Registration> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(concat!(
            "INSERT INTO users (id, user_id, name, email, phone, password_hash, role, \
             promo_code, reference_code, referred_by, accessible_games) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING ",
            user_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(new_user.user_id)
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.phone)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(&new_user.promo_code)
        .bind(&new_user.reference_code)
        .bind(new_user.referred_by)
        .bind(&new_user.accessible_games)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        let user = user_from_row(&row)?;

        let referrer = match referral {
            Some(credit) => {
                let row = sqlx::query(concat!(
                    "UPDATE users SET number_of_referrals = number_of_referrals + 1, \
                     bonus_amount = bonus_amount + $2, updated_at = NOW() \
                     WHERE user_id = $1 RETURNING ",
                    user_columns!()
                ))
                .bind(credit.referrer_id)
                .bind(credit.bonus)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_db_error)?
                .ok_or_else(|| AdminError::not_found("User", credit.referrer_id))?;
                let mut referrer = user_from_row(&row)?;

                if referrer.role == Role::User {
                    if let Some(pct) = commission_for(referrer.number_of_referrals, &credit.tiers)
                    {
                        let row = sqlx::query(concat!(
                            "UPDATE users SET commission_percentage = $2 \
                             WHERE user_id = $1 RETURNING ",
                            user_columns!()
                        ))
                        .bind(referrer.user_id)
                        .bind(pct)
                        .fetch_one(&mut *tx)
                        .await?;
                        referrer = user_from_row(&row)?;
                    }
                }
                Some(referrer)
            }
            None => None,
        };

        tx.commit().await?;

        Ok(Registration { user, referrer })
    }

    async fn find_user(&self, user_id: UserId) -> AdminResult<Option<User>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_credentials(&self, email: &str) -> AdminResult<Option<(User, String)>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            user_columns!(),
            ", password_hash FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some((user_from_row(&row)?, row.try_get("password_hash")?))),
            None => Ok(None),
        }
    }

    async fn find_by_promo_code(&self, code: &str) -> AdminResult<Option<User>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE LOWER(promo_code) = LOWER($1)"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_first_admin(&self) -> AdminResult<Option<User>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE role IN ('admin', 'super-admin') \
             ORDER BY created_at, user_id LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list_users(
        &self,
        filter: &UserFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<User>, i64)> {
        const WHERE: &str = "WHERE ($1::text IS NULL OR role = $1) \
             AND ($2::text IS NULL OR status = $2) \
             AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%' OR email ILIKE '%' || $3 || '%')";

        let role = filter.role.map(|r| r.as_str());
        let status = filter.status.map(|s| s.as_str());
        let search = filter.search.as_deref();

        let total: i64 = sqlx::query(&format!("SELECT COUNT(*) FROM users {WHERE}"))
            .bind(role)
            .bind(status)
            .bind(search)
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        let sql = format!(
            "SELECT {} FROM users {WHERE} ORDER BY created_at DESC, user_id LIMIT $4 OFFSET $5",
            user_columns!()
        );
        let rows = sqlx::query(&sql)
            .bind(role)
            .bind(status)
            .bind(search)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let users = rows.iter().map(user_from_row).collect::<AdminResult<_>>()?;
        Ok((users, total))
    }

    async fn update_user(&self, user_id: UserId, update: &UserUpdate) -> AdminResult<User> {
        let row = sqlx::query(concat!(
            "UPDATE users SET name = COALESCE($2, name), phone = COALESCE($3, phone), \
             role = COALESCE($4, role), status = COALESCE($5, status), \
             accessible_games = COALESCE($6, accessible_games), updated_at = NOW() \
             WHERE user_id = $1 RETURNING ",
            user_columns!()
        ))
        .bind(user_id)
        .bind(&update.name)
        .bind(&update.phone)
        .bind(update.role.map(|r| r.as_str()))
        .bind(update.status.map(|s| s.as_str()))
        .bind(&update.accessible_games)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AdminError::not_found("User", user_id))?;

        user_from_row(&row)
    }

    async fn increment_balance(
        &self,
        user_id: UserId,
        field: BalanceField,
        delta: i64,
    ) -> AdminResult<User> {
        let mut conn = self.pool.acquire().await?;
        apply_balance(&mut conn, user_id, field, delta).await
    }
}

#[async_trait]
impl BettingRepository for PgStore {
    async fn place_bet(&self, bet: NewBet) -> AdminResult<(Betting, User)> {
        let mut tx = self.pool.begin().await?;

        let user = apply_balance(&mut tx, bet.user_id, BalanceField::Played, bet.amount).await?;

        let row = sqlx::query(concat!(
            "INSERT INTO bettings (id, betting_id, user_id, game, amount, win_amount, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING ",
            betting_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(bet.betting_id)
        .bind(bet.user_id)
        .bind(&bet.game)
        .bind(bet.amount)
        .bind(bet.win_amount)
        .bind(BetStatus::BetApplied.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        let betting = betting_from_row(&row)?;

        tx.commit().await?;

        Ok((betting, user))
    }

    async fn transition_bet(
        &self,
        betting_id: BettingId,
        to: BetStatus,
    ) -> AdminResult<(Betting, User)> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(concat!(
            "SELECT ",
            betting_columns!(),
            " FROM bettings WHERE betting_id = $1 FOR UPDATE"
        ))
        .bind(betting_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AdminError::not_found("Betting", betting_id))?;
        let current = betting_from_row(&row)?;
        let (field, delta) = current.settlement(to)?;

        let row = sqlx::query(concat!(
            "UPDATE bettings SET status = $2, updated_at = NOW() \
             WHERE betting_id = $1 RETURNING ",
            betting_columns!()
        ))
        .bind(betting_id)
        .bind(to.as_str())
        .fetch_one(&mut *tx)
        .await?;
        let betting = betting_from_row(&row)?;

        let user = apply_balance(&mut tx, betting.user_id, field, delta).await?;

        tx.commit().await?;

        Ok((betting, user))
    }

    async fn find_bet(&self, betting_id: BettingId) -> AdminResult<Option<Betting>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            betting_columns!(),
            " FROM bettings WHERE betting_id = $1"
        ))
        .bind(betting_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(betting_from_row).transpose()
    }

    async fn list_bets(
        &self,
        filter: &BetFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<Betting>, i64)> {
        const WHERE: &str =
            "WHERE ($1::bigint IS NULL OR user_id = $1) AND ($2::text IS NULL OR status = $2)";

        let status = filter.status.map(|s| s.as_str());

        let total: i64 = sqlx::query(&format!("SELECT COUNT(*) FROM bettings {WHERE}"))
            .bind(filter.user_id)
            .bind(status)
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        let sql = format!(
            "SELECT {} FROM bettings {WHERE} ORDER BY created_at DESC, betting_id LIMIT $3 OFFSET $4",
            betting_columns!()
        );
        let rows = sqlx::query(&sql)
            .bind(filter.user_id)
            .bind(status)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let bets = rows.iter().map(betting_from_row).collect::<AdminResult<_>>()?;
        Ok((bets, total))
    }
}

#[async_trait]
impl TransactionRepository for PgStore {
    async fn create_transaction(&self, txn: NewTransaction) -> AdminResult<MoneyTransaction> {
        let row = sqlx::query(concat!(
            "INSERT INTO transactions (id, kind, user_id, bank_account_id, amount, reference) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING ",
            transaction_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(txn.kind.as_str())
        .bind(txn.user_id)
        .bind(txn.bank_account_id)
        .bind(txn.amount)
        .bind(&txn.reference)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        transaction_from_row(&row)
    }

    async fn find_transaction(&self, id: Uuid) -> AdminResult<Option<MoneyTransaction>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            transaction_columns!(),
            " FROM transactions WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn list_transactions(
        &self,
        filter: &TransactionFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<MoneyTransaction>, i64)> {
        const WHERE: &str = "WHERE ($1::text IS NULL OR kind = $1) \
             AND ($2::text IS NULL OR status = $2) \
             AND ($3::bigint IS NULL OR user_id = $3)";

        let kind = filter.kind.map(|k| k.as_str());
        let status = filter.status.map(|s| s.as_str());

        let total: i64 = sqlx::query(&format!("SELECT COUNT(*) FROM transactions {WHERE}"))
            .bind(kind)
            .bind(status)
            .bind(filter.user_id)
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        let sql = format!(
            "SELECT {} FROM transactions {WHERE} ORDER BY created_at DESC, id LIMIT $4 OFFSET $5",
            transaction_columns!()
        );
        let rows = sqlx::query(&sql)
            .bind(kind)
            .bind(status)
            .bind(filter.user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let txns = rows
            .iter()
            .map(transaction_from_row)
            .collect::<AdminResult<_>>()?;
        Ok((txns, total))
    }

    async fn decide_transaction(
        &self,
        id: Uuid,
        decision: Decision,
    ) -> AdminResult<(MoneyTransaction, Option<User>)> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(concat!(
            "SELECT ",
            transaction_columns!(),
            " FROM transactions WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AdminError::not_found("Transaction", id))?;
        let current = transaction_from_row(&row)?;
        let effect = current.settlement(decision.status)?;

        let row = sqlx::query(concat!(
            "UPDATE transactions SET status = $2, reference = COALESCE($3, reference), \
             remark = COALESCE($4, remark), updated_at = NOW() WHERE id = $1 RETURNING ",
            transaction_columns!()
        ))
        .bind(id)
        .bind(decision.status.as_str())
        .bind(&decision.reference)
        .bind(&decision.remark)
        .fetch_one(&mut *tx)
        .await?;
        let txn = transaction_from_row(&row)?;

        let user = match effect {
            Some((field, delta)) => Some(apply_balance(&mut tx, txn.user_id, field, delta).await?),
            None => None,
        };

        tx.commit().await?;

        Ok((txn, user))
    }
}

#[async_trait]
impl BankRepository for PgStore {
    async fn add_bank(&self, user_id: UserId, bank: NewBankDetails) -> AdminResult<BankDetails> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, user_id).await?;

        let existing: i64 = sqlx::query("SELECT COUNT(*) FROM bank_details WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?
            .try_get(0)?;
        let is_primary = bank.is_primary || existing == 0;

        if is_primary {
            sqlx::query(
                "UPDATE bank_details SET is_primary = FALSE, updated_at = NOW() \
                 WHERE user_id = $1 AND is_primary",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query(concat!(
            "INSERT INTO bank_details (id, user_id, account_holder, bank_name, account_number, \
             ifsc_code, upi_id, is_primary) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING ",
            bank_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(&bank.account_holder)
        .bind(&bank.bank_name)
        .bind(&bank.account_number)
        .bind(&bank.ifsc_code)
        .bind(&bank.upi_id)
        .bind(is_primary)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        let record = bank_from_row(&row)?;

        tx.commit().await?;

        Ok(record)
    }

    async fn find_bank(&self, id: Uuid) -> AdminResult<Option<BankDetails>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            bank_columns!(),
            " FROM bank_details WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(bank_from_row).transpose()
    }

    async fn list_banks(&self, user_id: UserId) -> AdminResult<Vec<BankDetails>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            bank_columns!(),
            " FROM bank_details WHERE user_id = $1 ORDER BY is_primary DESC, created_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(bank_from_row).collect()
    }

    async fn update_bank(
        &self,
        user_id: UserId,
        id: Uuid,
        update: &BankDetailsUpdate,
    ) -> AdminResult<BankDetails> {
        let row = sqlx::query(concat!(
            "UPDATE bank_details SET account_holder = COALESCE($3, account_holder), \
             bank_name = COALESCE($4, bank_name), account_number = COALESCE($5, account_number), \
             ifsc_code = COALESCE($6, ifsc_code), upi_id = COALESCE($7, upi_id), \
             updated_at = NOW() WHERE user_id = $1 AND id = $2 RETURNING ",
            bank_columns!()
        ))
        .bind(user_id)
        .bind(id)
        .bind(&update.account_holder)
        .bind(&update.bank_name)
        .bind(&update.account_number)
        .bind(&update.ifsc_code)
        .bind(&update.upi_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AdminError::not_found("BankDetails", id))?;

        bank_from_row(&row)
    }

    async fn set_primary_bank(&self, user_id: UserId, id: Uuid) -> AdminResult<BankDetails> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, user_id).await?;

        sqlx::query("SELECT id FROM bank_details WHERE user_id = $1 AND id = $2")
            .bind(user_id)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| AdminError::not_found("BankDetails", id))?;

        // Clear first: the partial unique index is checked per statement row
        sqlx::query(
            "UPDATE bank_details SET is_primary = FALSE, updated_at = NOW() \
             WHERE user_id = $1 AND is_primary AND id <> $2",
        )
        .bind(user_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query(concat!(
            "UPDATE bank_details SET is_primary = TRUE, updated_at = NOW() \
             WHERE user_id = $1 AND id = $2 RETURNING ",
            bank_columns!()
        ))
        .bind(user_id)
        .bind(id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;
        let record = bank_from_row(&row)?;

        tx.commit().await?;

        Ok(record)
    }

    async fn remove_bank(&self, user_id: UserId, id: Uuid) -> AdminResult<Option<BankDetails>> {
        let mut tx = self.pool.begin().await?;
        lock_user(&mut tx, user_id).await?;

        let was_primary: bool = sqlx::query(
            "DELETE FROM bank_details WHERE user_id = $1 AND id = $2 RETURNING is_primary",
        )
        .bind(user_id)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AdminError::not_found("BankDetails", id))?
        .try_get(0)?;

        let promoted = if was_primary {
            let row = sqlx::query(concat!(
                "UPDATE bank_details SET is_primary = TRUE, updated_at = NOW() WHERE id = \
                 (SELECT id FROM bank_details WHERE user_id = $1 ORDER BY created_at, id LIMIT 1) \
                 RETURNING ",
                bank_columns!()
            ))
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
            row.as_ref().map(bank_from_row).transpose()?
        } else {
            None
        };

        tx.commit().await?;

        Ok(promoted)
    }
}

#[async_trait]
impl SettingsRepository for PgStore {
    async fn create_setting(&self, name: &str, value: f64) -> AdminResult<AmountSetting> {
        let row = sqlx::query(concat!(
            "INSERT INTO amount_setups (id, name, value) VALUES ($1, $2, $3) RETURNING ",
            setting_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        setting_from_row(&row)
    }

    async fn find_setting(&self, name: &str) -> AdminResult<Option<AmountSetting>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            setting_columns!(),
            " FROM amount_setups WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(setting_from_row).transpose()
    }

    async fn list_settings(&self) -> AdminResult<Vec<AmountSetting>> {
        let rows = sqlx::query(concat!(
            "SELECT ",
            setting_columns!(),
            " FROM amount_setups ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(setting_from_row).collect()
    }

    async fn update_setting(&self, id: Uuid, value: f64) -> AdminResult<AmountSetting> {
        let row = sqlx::query(concat!(
            "UPDATE amount_setups SET value = $2, updated_at = NOW() WHERE id = $1 RETURNING ",
            setting_columns!()
        ))
        .bind(id)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AdminError::not_found("AmountSetup", id))?;

        setting_from_row(&row)
    }

    async fn delete_setting(&self, id: Uuid) -> AdminResult<bool> {
        let result = sqlx::query("DELETE FROM amount_setups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DocumentRepository for PgStore {
    async fn insert_document(
        &self,
        collection: &str,
        public_id: i64,
        body: serde_json::Value,
    ) -> AdminResult<StoredDocument> {
        let row = sqlx::query(concat!(
            "INSERT INTO documents (id, collection, public_id, body) \
             VALUES ($1, $2, $3, $4) RETURNING ",
            document_columns!()
        ))
        .bind(Uuid::new_v4())
        .bind(collection)
        .bind(public_id)
        .bind(Json(body))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        document_from_row(&row)
    }

    async fn find_document(
        &self,
        collection: &str,
        public_id: i64,
    ) -> AdminResult<Option<StoredDocument>> {
        let row = sqlx::query(concat!(
            "SELECT ",
            document_columns!(),
            " FROM documents WHERE collection = $1 AND public_id = $2"
        ))
        .bind(collection)
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    async fn list_documents(
        &self,
        collection: &str,
        filter: &DocumentFilter,
        page: &PageRequest,
    ) -> AdminResult<(Vec<StoredDocument>, i64)> {
        const WHERE: &str = "WHERE collection = $1 \
             AND ($2::text IS NULL OR body->>'status' = $2) \
             AND ($3::bigint IS NULL OR body->'userId' = to_jsonb($3::bigint))";

        let status = filter.status.as_deref();

        let total: i64 = sqlx::query(&format!("SELECT COUNT(*) FROM documents {WHERE}"))
            .bind(collection)
            .bind(status)
            .bind(filter.user_id)
            .fetch_one(&self.pool)
            .await?
            .try_get(0)?;

        let sql = format!(
            "SELECT {} FROM documents {WHERE} ORDER BY created_at DESC, public_id LIMIT $4 OFFSET $5",
            document_columns!()
        );
        let rows = sqlx::query(&sql)
            .bind(collection)
            .bind(status)
            .bind(filter.user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let docs = rows
            .iter()
            .map(document_from_row)
            .collect::<AdminResult<_>>()?;
        Ok((docs, total))
    }

    async fn replace_document(
        &self,
        collection: &str,
        public_id: i64,
        body: serde_json::Value,
    ) -> AdminResult<Option<StoredDocument>> {
        let row = sqlx::query(concat!(
            "UPDATE documents SET body = $3, updated_at = NOW() \
             WHERE collection = $1 AND public_id = $2 RETURNING ",
            document_columns!()
        ))
        .bind(collection)
        .bind(public_id)
        .bind(Json(body))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    async fn delete_document(&self, collection: &str, public_id: i64) -> AdminResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND public_id = $2")
            .bind(collection)
            .bind(public_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> AdminResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
