//! Integration tests for bank records and the single-primary rule.

mod common;

use betting_admin::AdminError;
use betting_admin::accounts::Role;
use betting_admin::bank::{BankDetails, BankDetailsUpdate, BankManager, NewBankDetails};
use common::{memory_store, seed_user};

fn record(number: &str, primary: bool) -> NewBankDetails {
    NewBankDetails {
        account_holder: "Asha Rao".to_string(),
        bank_name: "Union Bank".to_string(),
        account_number: number.to_string(),
        ifsc_code: "UBIN0000123".to_string(),
        upi_id: None,
        is_primary: primary,
    }
}

fn primaries(banks: &[BankDetails]) -> Vec<&str> {
    banks
        .iter()
        .filter(|b| b.is_primary)
        .map(|b| b.account_number.as_str())
        .collect()
}

#[tokio::test]
async fn test_first_record_becomes_primary() {
    let store = memory_store();
    let banks = BankManager::new(store.clone());
    let user = seed_user(&store, Role::User, "asha@example.com").await;

    let first = banks.add(user.user_id, record("111", false)).await.unwrap();
    assert!(first.is_primary);

    let second = banks.add(user.user_id, record("222", false)).await.unwrap();
    assert!(!second.is_primary);

    let listed = banks.list(user.user_id).await.unwrap();
    assert_eq!(primaries(&listed), vec!["111"]);
    assert_eq!(listed[0].id, first.id);
}

#[tokio::test]
async fn test_adding_primary_moves_the_flag() {
    let store = memory_store();
    let banks = BankManager::new(store.clone());
    let user = seed_user(&store, Role::User, "asha@example.com").await;

    banks.add(user.user_id, record("111", false)).await.unwrap();
    let chosen = banks.add(user.user_id, record("222", true)).await.unwrap();
    assert!(chosen.is_primary);

    let listed = banks.list(user.user_id).await.unwrap();
    assert_eq!(primaries(&listed), vec!["222"]);
    assert_eq!(banks.primary(user.user_id).await.unwrap().unwrap().id, chosen.id);
}

#[tokio::test]
async fn test_set_primary_leaves_exactly_one() {
    let store = memory_store();
    let banks = BankManager::new(store.clone());
    let user = seed_user(&store, Role::User, "asha@example.com").await;

    banks.add(user.user_id, record("111", false)).await.unwrap();
    banks.add(user.user_id, record("222", false)).await.unwrap();
    let third = banks.add(user.user_id, record("333", false)).await.unwrap();

    let updated = banks.set_primary(user.user_id, third.id).await.unwrap();
    assert!(updated.is_primary);

    // Setting it twice is harmless
    banks.set_primary(user.user_id, third.id).await.unwrap();

    let listed = banks.list(user.user_id).await.unwrap();
    assert_eq!(primaries(&listed), vec!["333"]);
}

#[tokio::test]
async fn test_removing_primary_promotes_earliest_remaining() {
    let store = memory_store();
    let banks = BankManager::new(store.clone());
    let user = seed_user(&store, Role::User, "asha@example.com").await;

    let first = banks.add(user.user_id, record("111", false)).await.unwrap();
    let second = banks.add(user.user_id, record("222", false)).await.unwrap();
    banks.add(user.user_id, record("333", false)).await.unwrap();

    let promoted = banks.remove(user.user_id, first.id).await.unwrap();
    assert_eq!(promoted.map(|b| b.id), Some(second.id));

    let listed = banks.list(user.user_id).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(primaries(&listed), vec!["222"]);

    // Removing a non-primary record promotes nothing
    let third = listed.iter().find(|b| !b.is_primary).unwrap().id;
    assert!(banks.remove(user.user_id, third).await.unwrap().is_none());
}

#[tokio::test]
async fn test_removing_last_record() {
    let store = memory_store();
    let banks = BankManager::new(store.clone());
    let user = seed_user(&store, Role::User, "asha@example.com").await;

    let only = banks.add(user.user_id, record("111", false)).await.unwrap();
    assert!(banks.remove(user.user_id, only.id).await.unwrap().is_none());
    assert!(banks.primary(user.user_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_records_of_other_users_are_hidden() {
    let store = memory_store();
    let banks = BankManager::new(store.clone());
    let owner = seed_user(&store, Role::User, "owner@example.com").await;
    let other = seed_user(&store, Role::User, "other@example.com").await;
    let record = banks.add(owner.user_id, record("111", false)).await.unwrap();

    assert!(matches!(
        banks.get(other.user_id, record.id).await,
        Err(AdminError::NotFound { .. })
    ));
    assert!(matches!(
        banks.set_primary(other.user_id, record.id).await,
        Err(AdminError::NotFound { .. })
    ));
    assert!(matches!(
        banks.remove(other.user_id, record.id).await,
        Err(AdminError::NotFound { .. })
    ));
    assert!(matches!(
        banks
            .update(other.user_id, record.id, BankDetailsUpdate::default())
            .await,
        Err(AdminError::NotFound { .. })
    ));
    assert!(banks.get(owner.user_id, record.id).await.is_ok());
}

#[tokio::test]
async fn test_update_and_field_validation() {
    let store = memory_store();
    let banks = BankManager::new(store.clone());
    let user = seed_user(&store, Role::User, "asha@example.com").await;
    let created = banks.add(user.user_id, record("111", false)).await.unwrap();

    let updated = banks
        .update(
            user.user_id,
            created.id,
            BankDetailsUpdate {
                bank_name: Some("Canara Bank".into()),
                upi_id: Some("asha@upi".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bank_name, "Canara Bank");
    assert_eq!(updated.upi_id.as_deref(), Some("asha@upi"));
    assert!(updated.is_primary);

    let blank = banks
        .update(
            user.user_id,
            created.id,
            BankDetailsUpdate {
                ifsc_code: Some("  ".into()),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(blank, Err(AdminError::Validation(_))));

    let mut missing = record("", false);
    missing.account_number.clear();
    assert!(matches!(
        banks.add(user.user_id, missing).await,
        Err(AdminError::Validation(_))
    ));
}

#[tokio::test]
async fn test_payment_accounts_belong_to_first_admin() {
    let store = memory_store();
    let banks = BankManager::new(store.clone());
    assert!(banks.payment_accounts().await.unwrap().is_empty());

    let admin = seed_user(&store, Role::Admin, "admin@example.com").await;
    let player = seed_user(&store, Role::User, "player@example.com").await;
    banks.add(admin.user_id, record("999", false)).await.unwrap();
    banks.add(player.user_id, record("111", false)).await.unwrap();

    let accounts = banks.payment_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].user_id, admin.user_id);
}
