//! Referral commission cascade run on registration.

pub mod manager;
pub mod models;

pub use manager::ReferralManager;
pub use models::{
    COMMISSION_TIERS, CommissionTier, ReferralCredit, Registration, ResolvedTier, Signup,
    commission_for, select_tier,
};
