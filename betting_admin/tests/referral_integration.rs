//! Integration tests for the referral commission cascade.

mod common;

use betting_admin::AdminError;
use betting_admin::accounts::{Role, UserUpdate};
use betting_admin::db::{SharedStore, UserRepository};
use betting_admin::referral::{ReferralManager, Registration, Signup};
use betting_admin::settings::PER_REFERRAL_BONUS;
use common::{memory_store, seed_referral_settings, seed_settings, seed_user};

fn signup(email: &str, code: Option<&str>) -> Signup {
    Signup {
        name: "New Player".to_string(),
        email: email.to_string(),
        phone: None,
        password_hash: "not-a-real-hash".to_string(),
        role: Role::User,
        reference_code: code.map(str::to_string),
    }
}

async fn register_many(
    referrals: &ReferralManager,
    code: &str,
    count: usize,
    offset: usize,
) -> Registration {
    let mut last = None;
    for i in 0..count {
        let email = format!("referred{}@example.com", i + offset);
        last = Some(referrals.register(signup(&email, Some(code))).await.unwrap());
    }
    last.expect("count must be positive")
}

async fn user_count(store: &SharedStore) -> i64 {
    store
        .list_users(&Default::default(), &Default::default())
        .await
        .unwrap()
        .1
}

#[tokio::test]
async fn test_promo_code_credits_referrer() {
    let store = memory_store();
    seed_referral_settings(&store).await;
    let referrals = ReferralManager::new(store.clone());
    let referrer = seed_user(&store, Role::User, "referrer@example.com").await;

    // Lookup is case-insensitive
    let code = referrer.promo_code.to_lowercase();
    let registration = referrals
        .register(signup("new@example.com", Some(&code)))
        .await
        .unwrap();

    let credited = registration.referrer.expect("referrer credited");
    assert_eq!(credited.user_id, referrer.user_id);
    assert_eq!(credited.number_of_referrals, 1);
    assert_eq!(credited.balances.bonus_amount, 50);
    assert_eq!(credited.commission_percentage, 1.0);

    assert_eq!(registration.user.referred_by, Some(referrer.user_id));
    assert_eq!(registration.user.reference_code, Some(referrer.promo_code));
    assert_ne!(registration.user.promo_code, credited.promo_code);
}

#[tokio::test]
async fn test_commission_tiers_follow_referral_count() {
    let store = memory_store();
    seed_referral_settings(&store).await;
    let referrals = ReferralManager::new(store.clone());
    let referrer = seed_user(&store, Role::User, "tiers@example.com").await;

    let fourth = register_many(&referrals, &referrer.promo_code, 4, 0).await;
    assert_eq!(fourth.referrer.as_ref().unwrap().commission_percentage, 1.0);

    let fifth = register_many(&referrals, &referrer.promo_code, 1, 4).await;
    let at_five = fifth.referrer.unwrap();
    assert_eq!(at_five.number_of_referrals, 5);
    assert_eq!(at_five.commission_percentage, 3.0);

    let tenth = register_many(&referrals, &referrer.promo_code, 5, 5).await;
    let at_ten = tenth.referrer.unwrap();
    assert_eq!(at_ten.number_of_referrals, 10);
    assert_eq!(at_ten.commission_percentage, 5.0);
    assert_eq!(at_ten.balances.bonus_amount, 500);
}

#[tokio::test]
async fn test_missing_tier_setting_aborts_without_writes() {
    let store = memory_store();
    seed_settings(&store, &[(PER_REFERRAL_BONUS, 50.0)]).await;
    let referrals = ReferralManager::new(store.clone());
    let referrer = seed_user(&store, Role::User, "strict@example.com").await;

    let result = referrals
        .register(signup("aborted@example.com", Some(&referrer.promo_code)))
        .await;
    assert!(matches!(
        result,
        Err(AdminError::NotFound {
            entity: "AmountSetup",
            ..
        })
    ));

    assert_eq!(user_count(&store).await, 1);
    let unchanged = store.find_user(referrer.user_id).await.unwrap().unwrap();
    assert_eq!(unchanged.number_of_referrals, 0);
    assert_eq!(unchanged.balances.bonus_amount, 0);
}

#[tokio::test]
async fn test_fractional_bonus_aborts_registration() {
    let store = memory_store();
    // Written straight to the store, past settings validation
    seed_settings(&store, &[(PER_REFERRAL_BONUS, 50.5)]).await;
    let referrals = ReferralManager::new(store.clone());
    let referrer = seed_user(&store, Role::Affiliate, "fraction@example.com").await;

    let result = referrals
        .register(signup("halfway@example.com", Some(&referrer.promo_code)))
        .await;
    assert!(matches!(result, Err(AdminError::Validation(_))));

    assert_eq!(user_count(&store).await, 1);
    let unchanged = store.find_user(referrer.user_id).await.unwrap().unwrap();
    assert_eq!(unchanged.balances.bonus_amount, 0);
}

#[tokio::test]
async fn test_affiliate_hands_down_games_instead_of_tier() {
    let store = memory_store();
    // Tier settings are not needed for affiliates
    seed_settings(&store, &[(PER_REFERRAL_BONUS, 25.0)]).await;
    let referrals = ReferralManager::new(store.clone());
    let affiliate = seed_user(&store, Role::Affiliate, "affiliate@example.com").await;
    store
        .update_user(
            affiliate.user_id,
            &UserUpdate {
                accessible_games: Some(vec!["aviator".into(), "teen-patti".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let registration = referrals
        .register(signup("player@example.com", Some(&affiliate.promo_code)))
        .await
        .unwrap();

    assert_eq!(
        registration.user.accessible_games,
        vec!["aviator".to_string(), "teen-patti".to_string()]
    );
    let credited = registration.referrer.unwrap();
    assert_eq!(credited.number_of_referrals, 1);
    assert_eq!(credited.balances.bonus_amount, 25);
    assert_eq!(credited.commission_percentage, 0.0);
}

#[tokio::test]
async fn test_unknown_code_falls_back_to_earliest_admin() {
    let store = memory_store();
    seed_settings(&store, &[(PER_REFERRAL_BONUS, 10.0)]).await;
    let referrals = ReferralManager::new(store.clone());
    let admin = seed_user(&store, Role::Admin, "admin@example.com").await;
    seed_user(&store, Role::Admin, "second-admin@example.com").await;

    let registration = referrals
        .register(signup("orphan@example.com", Some("NOSUCHCD")))
        .await
        .unwrap();

    let credited = registration.referrer.unwrap();
    assert_eq!(credited.user_id, admin.user_id);
    assert_eq!(credited.balances.bonus_amount, 10);
    assert_eq!(registration.user.referred_by, Some(admin.user_id));
}

#[tokio::test]
async fn test_configured_default_referrer_wins() {
    let store = memory_store();
    seed_referral_settings(&store).await;
    seed_user(&store, Role::Admin, "admin@example.com").await;
    let house = seed_user(&store, Role::User, "house@example.com").await;
    let referrals = ReferralManager::new(store.clone()).with_default_referrer(Some(house.user_id));

    let registration = referrals
        .register(signup("walkin@example.com", None))
        .await
        .unwrap();

    assert_eq!(registration.referrer.unwrap().user_id, house.user_id);
}

#[tokio::test]
async fn test_no_admin_registers_without_referrer() {
    let store = memory_store();
    let referrals = ReferralManager::new(store.clone());

    let registration = referrals
        .register(signup("first@example.com", None))
        .await
        .unwrap();

    assert!(registration.referrer.is_none());
    assert_eq!(registration.user.referred_by, None);
    assert_eq!(registration.user.number_of_referrals, 0);
}

#[tokio::test]
async fn test_duplicate_email_is_validation_error() {
    let store = memory_store();
    let referrals = ReferralManager::new(store.clone());
    referrals
        .register(signup("taken@example.com", None))
        .await
        .unwrap();

    assert!(matches!(
        referrals.register(signup("TAKEN@example.com", None)).await,
        Err(AdminError::Validation(_))
    ));
}
