//! Plain CRUD aggregates: bonus campaigns, banners, games and support queries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::accounts::UserId;
use crate::error::{AdminError, AdminResult};

/// Active/Inactive switch shared by campaigns and media
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    #[default]
    Active,
    Inactive,
}

/// Support query status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryStatus {
    #[default]
    Open,
    Resolved,
}

/// A record type stored as a document in a named collection
pub trait CatalogItem: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Collection name
    const COLLECTION: &'static str;

    /// Entity name used in error messages
    const ENTITY: &'static str;

    /// Check field-level rules before a write
    fn validate(&self) -> AdminResult<()>;
}

/// Stored document: storage id, six-digit public id, body and timestamps
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document<T> {
    pub id: Uuid,
    pub public_id: i64,
    #[serde(flatten)]
    pub body: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Untyped document as held by the store
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: Uuid,
    pub public_id: i64,
    pub body: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    pub fn decode<T: CatalogItem>(self) -> AdminResult<Document<T>> {
        Ok(Document {
            id: self.id,
            public_id: self.public_id,
            body: serde_json::from_value(self.body)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Filter on top-level body fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFilter {
    /// Matches the body's `status` field
    pub status: Option<String>,
    /// Matches the body's `userId` field
    pub user_id: Option<UserId>,
}

impl DocumentFilter {
    pub fn matches(&self, body: &serde_json::Value) -> bool {
        let status_ok = self
            .status
            .as_deref()
            .is_none_or(|s| body.get("status").and_then(|v| v.as_str()) == Some(s));
        let user_ok = self
            .user_id
            .is_none_or(|u| body.get("userId").and_then(|v| v.as_i64()) == Some(u));
        status_ok && user_ok
    }
}

fn require_text(field: &str, value: &str) -> AdminResult<()> {
    if value.trim().is_empty() {
        return Err(AdminError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn require_window(valid_from: DateTime<Utc>, valid_to: DateTime<Utc>) -> AdminResult<()> {
    if valid_from >= valid_to {
        return Err(AdminError::validation("validFrom must be before validTo"));
    }
    Ok(())
}

/// Percentage bonus on deposits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositBonus {
    pub title: String,
    pub bonus_percentage: f64,
    pub minimum_deposit: i64,
    pub maximum_bonus: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default)]
    pub status: ItemStatus,
}

impl CatalogItem for DepositBonus {
    const COLLECTION: &'static str = "deposit_bonuses";
    const ENTITY: &'static str = "DepositBonus";

    fn validate(&self) -> AdminResult<()> {
        require_text("title", &self.title)?;
        if !(self.bonus_percentage > 0.0 && self.bonus_percentage <= 100.0) {
            return Err(AdminError::validation(
                "bonusPercentage must be in (0, 100]",
            ));
        }
        if self.minimum_deposit < 0 || self.maximum_bonus <= 0 {
            return Err(AdminError::validation(
                "minimumDeposit must be non-negative and maximumBonus positive",
            ));
        }
        require_window(self.valid_from, self.valid_to)
    }
}

/// Flat bonus granted for a festival period
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FestivalBonus {
    pub title: String,
    pub amount: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    #[serde(default)]
    pub status: ItemStatus,
}

impl CatalogItem for FestivalBonus {
    const COLLECTION: &'static str = "festival_bonuses";
    const ENTITY: &'static str = "FestivalBonus";

    fn validate(&self) -> AdminResult<()> {
        require_text("title", &self.title)?;
        if self.amount <= 0 {
            return Err(AdminError::validation("amount must be positive"));
        }
        require_window(self.valid_from, self.valid_to)
    }
}

/// Promotional banner
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    pub title: String,
    pub image_url: String,
    pub link: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
}

impl CatalogItem for Banner {
    const COLLECTION: &'static str = "banners";
    const ENTITY: &'static str = "Banner";

    fn validate(&self) -> AdminResult<()> {
        require_text("title", &self.title)?;
        require_text("imageUrl", &self.image_url)
    }
}

/// Game offered on the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableGame {
    pub name: String,
    pub image_url: String,
    pub category: Option<String>,
    #[serde(default)]
    pub status: ItemStatus,
}

impl CatalogItem for AvailableGame {
    const COLLECTION: &'static str = "available_games";
    const ENTITY: &'static str = "AvailableGame";

    fn validate(&self) -> AdminResult<()> {
        require_text("name", &self.name)?;
        require_text("imageUrl", &self.image_url)
    }
}

/// Support ticket opened by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportQuery {
    pub user_id: UserId,
    pub subject: String,
    pub message: String,
    pub reply: Option<String>,
    #[serde(default)]
    pub status: QueryStatus,
}

impl CatalogItem for SupportQuery {
    const COLLECTION: &'static str = "queries";
    const ENTITY: &'static str = "Query";

    fn validate(&self) -> AdminResult<()> {
        require_text("subject", &self.subject)?;
        require_text("message", &self.message)
    }
}

/// Support query opened by a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewQuery {
    pub subject: String,
    pub message: String,
}

/// Admin reply to a support query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryReply {
    pub reply: String,
}
