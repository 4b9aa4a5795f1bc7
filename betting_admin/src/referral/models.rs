//! Referral tiers and credit descriptors.

use serde::{Deserialize, Serialize};

use crate::accounts::{Role, User, UserId};
use crate::settings::{LEVEL_1_COMMISSION, LEVEL_2_COMMISSION, LEVEL_3_COMMISSION};

/// Commission tier keyed by a minimum referral count
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommissionTier {
    pub min_referrals: i32,
    /// AmountSetup entry holding the tier's percentage
    pub setting: &'static str,
}

/// Tiers in descending threshold order; the first met threshold wins
pub const COMMISSION_TIERS: [CommissionTier; 3] = [
    CommissionTier {
        min_referrals: 10,
        setting: LEVEL_1_COMMISSION,
    },
    CommissionTier {
        min_referrals: 5,
        setting: LEVEL_2_COMMISSION,
    },
    CommissionTier {
        min_referrals: 0,
        setting: LEVEL_3_COMMISSION,
    },
];

/// Tier with its percentage looked up
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTier {
    pub min_referrals: i32,
    pub percentage: f64,
}

/// Pick the first tier (descending order) whose threshold `referrals` meets
pub fn select_tier<T, F>(tiers: &[T], referrals: i32, threshold: F) -> Option<&T>
where
    F: Fn(&T) -> i32,
{
    tiers.iter().find(|t| referrals >= threshold(t))
}

/// Commission percentage for a referral count, if any tier applies
pub fn commission_for(referrals: i32, tiers: &[ResolvedTier]) -> Option<f64> {
    select_tier(tiers, referrals, |t| t.min_referrals).map(|t| t.percentage)
}

/// Credit applied to a referrer in the same atomic step that creates the
/// referred user
#[derive(Debug, Clone)]
pub struct ReferralCredit {
    pub referrer_id: UserId,
    /// Added to the referrer's bonus balance
    pub bonus: i64,
    /// Commission tiers, applied only when the referrer has role `user`.
    /// Empty for other roles.
    pub tiers: Vec<ResolvedTier>,
}

/// Validated account fields entering the referral cascade
#[derive(Debug, Clone)]
pub struct Signup {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub role: Role,
    /// Promo code of the referrer, as typed by the user
    pub reference_code: Option<String>,
}

/// Outcome of a registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub user: User,
    /// Referrer after the credit was applied
    pub referrer: Option<User>,
}
