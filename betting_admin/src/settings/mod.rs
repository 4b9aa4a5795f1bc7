//! Named numeric settings: bet bounds, referral bonus and commission tiers.

pub mod manager;
pub mod models;

pub use manager::SettingsManager;
pub use models::{
    AmountSetting, LEVEL_1_COMMISSION, LEVEL_2_COMMISSION, LEVEL_3_COMMISSION,
    MAXIMUM_BET_AMOUNT, MINIMUM_BET_AMOUNT, NewAmountSetting, PER_REFERRAL_BONUS,
};
