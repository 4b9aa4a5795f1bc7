//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use betting_admin::accounts::{NewUser, Role, User};
use betting_admin::db::{MemoryStore, SettingsRepository, SharedStore, UserRepository};
use betting_admin::ids::{random_promo_code, random_public_id};
use betting_admin::settings::{
    LEVEL_1_COMMISSION, LEVEL_2_COMMISSION, LEVEL_3_COMMISSION, MAXIMUM_BET_AMOUNT,
    MINIMUM_BET_AMOUNT, PER_REFERRAL_BONUS,
};
use std::sync::Arc;

pub fn memory_store() -> SharedStore {
    Arc::new(MemoryStore::new())
}

/// Insert an account directly, bypassing password hashing and referrals
pub async fn seed_user(store: &SharedStore, role: Role, email: &str) -> User {
    let name = email.split('@').next().unwrap_or(email).to_string();
    store
        .create_user(
            NewUser {
                user_id: random_public_id(),
                name,
                email: email.to_string(),
                phone: None,
                password_hash: "not-a-real-hash".to_string(),
                role,
                promo_code: random_promo_code(),
                reference_code: None,
                referred_by: None,
                accessible_games: Vec::new(),
            },
            None,
        )
        .await
        .expect("Failed to seed user")
        .user
}

pub async fn seed_settings(store: &SharedStore, settings: &[(&str, f64)]) {
    for (name, value) in settings {
        store
            .create_setting(name, *value)
            .await
            .expect("Failed to seed setting");
    }
}

pub async fn seed_bet_bounds(store: &SharedStore, min: f64, max: f64) {
    seed_settings(store, &[(MINIMUM_BET_AMOUNT, min), (MAXIMUM_BET_AMOUNT, max)]).await;
}

/// Referral bonus 50, tiers 5% / 3% / 1%
pub async fn seed_referral_settings(store: &SharedStore) {
    seed_settings(
        store,
        &[
            (PER_REFERRAL_BONUS, 50.0),
            (LEVEL_1_COMMISSION, 5.0),
            (LEVEL_2_COMMISSION, 3.0),
            (LEVEL_3_COMMISSION, 1.0),
        ],
    )
    .await;
}
