//! Account data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::error::AdminError;

/// Six-digit public user id
pub type UserId = i64;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "super-admin")]
    SuperAdmin,
    #[serde(rename = "admin")]
    Admin,
    #[serde(rename = "affiliate")]
    Affiliate,
    #[serde(rename = "user")]
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super-admin",
            Role::Admin => "admin",
            Role::Affiliate => "affiliate",
            Role::User => "user",
        }
    }

    /// Whether the role may use administrative routes
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super-admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "affiliate" => Ok(Role::Affiliate),
            "user" => Ok(Role::User),
            other => Err(AdminError::validation(format!("Unknown role: {other}"))),
        }
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Deactive,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "Active",
            AccountStatus::Deactive => "Deactive",
            AccountStatus::Suspended => "Suspended",
        }
    }
}

impl std::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountStatus {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(AccountStatus::Active),
            "Deactive" => Ok(AccountStatus::Deactive),
            "Suspended" => Ok(AccountStatus::Suspended),
            other => Err(AdminError::validation(format!(
                "Unknown account status: {other}"
            ))),
        }
    }
}

/// Balance fields a ledger adjustment can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BalanceField {
    #[serde(alias = "depositAmount")]
    Deposit,
    #[serde(alias = "winningsAmount")]
    Winnings,
    #[serde(alias = "bonusAmount")]
    Bonus,
    #[serde(alias = "commissionAmount")]
    Commission,
    #[serde(alias = "playedAmount")]
    Played,
}

impl BalanceField {
    /// Column holding the field
    pub fn column(&self) -> &'static str {
        match self {
            BalanceField::Deposit => "deposit_amount",
            BalanceField::Winnings => "winnings_amount",
            BalanceField::Bonus => "bonus_amount",
            BalanceField::Commission => "commission_amount",
            BalanceField::Played => "played_amount",
        }
    }
}

impl std::fmt::Display for BalanceField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Per-user balance fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balances {
    pub deposit_amount: i64,
    pub winnings_amount: i64,
    pub bonus_amount: i64,
    pub commission_amount: i64,
    /// Amount currently in play; not part of the wallet
    pub played_amount: i64,
}

impl Balances {
    /// Derived wallet total: deposit + winnings + bonus + commission
    ///
    /// Stores refuse writes that would push the total past `i64::MAX`, so the
    /// saturation only shows up for rows written outside this crate.
    pub fn wallet(&self) -> i64 {
        self.checked_wallet().unwrap_or(i64::MAX)
    }

    /// Wallet total, or `None` when it does not fit in an `i64`
    pub fn checked_wallet(&self) -> Option<i64> {
        self.deposit_amount
            .checked_add(self.winnings_amount)?
            .checked_add(self.bonus_amount)?
            .checked_add(self.commission_amount)
    }

    pub fn get(&self, field: BalanceField) -> i64 {
        match field {
            BalanceField::Deposit => self.deposit_amount,
            BalanceField::Winnings => self.winnings_amount,
            BalanceField::Bonus => self.bonus_amount,
            BalanceField::Commission => self.commission_amount,
            BalanceField::Played => self.played_amount,
        }
    }

    pub fn get_mut(&mut self, field: BalanceField) -> &mut i64 {
        match field {
            BalanceField::Deposit => &mut self.deposit_amount,
            BalanceField::Winnings => &mut self.winnings_amount,
            BalanceField::Bonus => &mut self.bonus_amount,
            BalanceField::Commission => &mut self.commission_amount,
            BalanceField::Played => &mut self.played_amount,
        }
    }
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Storage id
    #[serde(rename = "objectId")]
    pub id: Uuid,
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    /// This account's own code, handed out to people it refers
    pub promo_code: String,
    /// Promo code of the referrer used at registration
    pub reference_code: Option<String>,
    pub referred_by: Option<UserId>,
    #[serde(rename = "numberOfReferals")]
    pub number_of_referrals: i32,
    pub commission_percentage: f64,
    pub accessible_games: Vec<String>,
    #[serde(flatten)]
    pub balances: Balances,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn wallet(&self) -> i64 {
        self.balances.wallet()
    }
}

/// Fields for inserting a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    pub promo_code: String,
    pub reference_code: Option<String>,
    pub referred_by: Option<UserId>,
    pub accessible_games: Vec<String>,
}

/// Partial profile update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    pub accessible_games: Option<Vec<String>>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.role.is_none()
            && self.status.is_none()
            && self.accessible_games.is_none()
    }
}

/// Filter for user listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub status: Option<AccountStatus>,
    /// Substring matched against name and email, case-insensitively
    pub search: Option<String>,
}

/// Wallet view of a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletSummary {
    pub user_id: UserId,
    pub deposit_amount: i64,
    pub winnings_amount: i64,
    pub bonus_amount: i64,
    pub commission_amount: i64,
    pub played_amount: i64,
    pub wallet: i64,
}

impl From<&User> for WalletSummary {
    fn from(user: &User) -> Self {
        let b = &user.balances;
        Self {
            user_id: user.user_id,
            deposit_amount: b.deposit_amount,
            winnings_amount: b.winnings_amount,
            bonus_amount: b.bonus_amount,
            commission_amount: b.commission_amount,
            played_amount: b.played_amount,
            wallet: b.wallet(),
        }
    }
}
