//! Named numeric settings (the AmountSetup table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lower bound (exclusive) for a bet amount
pub const MINIMUM_BET_AMOUNT: &str = "Minimum Bet Amount";

/// Upper bound (exclusive) for a bet amount
pub const MAXIMUM_BET_AMOUNT: &str = "Maximum Bet Amount";

/// Bonus credited to a referrer per registration
pub const PER_REFERRAL_BONUS: &str = "Per Referal Bonus";

/// Commission for referrers with at least 10 referrals
pub const LEVEL_1_COMMISSION: &str = "Level 1 Commission";

/// Commission for referrers with at least 5 referrals
pub const LEVEL_2_COMMISSION: &str = "Level 2 Commission";

/// Commission for every other referrer
pub const LEVEL_3_COMMISSION: &str = "Level 3 Commission";

/// One named setting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmountSetting {
    pub id: Uuid,
    pub name: String,
    pub value: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAmountSetting {
    pub name: String,
    pub value: f64,
}
