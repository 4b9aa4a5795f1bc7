//! Integration tests for the account ledger.
//!
//! Balance adjustments, the derived wallet total, and atomicity of concurrent
//! increments against the in-memory store.

mod common;

use betting_admin::AdminError;
use betting_admin::accounts::{
    AccountLedger, AccountStatus, BalanceField, Role, UserFilter, UserUpdate,
};
use betting_admin::pagination::PageRequest;
use common::{memory_store, seed_user};
use proptest::prelude::*;

#[tokio::test]
async fn test_credit_and_debit() {
    let store = memory_store();
    let ledger = AccountLedger::new(store.clone());
    let user = seed_user(&store, Role::User, "ledger@example.com").await;

    let after_credit = ledger
        .adjust_balance(user.user_id, BalanceField::Deposit, 500)
        .await
        .unwrap();
    assert_eq!(after_credit.balances.deposit_amount, 500);

    let after_debit = ledger
        .adjust_balance(user.user_id, BalanceField::Deposit, -200)
        .await
        .unwrap();
    assert_eq!(after_debit.balances.deposit_amount, 300);
    assert_eq!(after_debit.wallet(), 300);
}

#[tokio::test]
async fn test_overdraft_rejected_without_mutation() {
    let store = memory_store();
    let ledger = AccountLedger::new(store.clone());
    let user = seed_user(&store, Role::User, "overdraft@example.com").await;

    ledger
        .adjust_balance(user.user_id, BalanceField::Bonus, 100)
        .await
        .unwrap();

    let result = ledger
        .adjust_balance(user.user_id, BalanceField::Bonus, -101)
        .await;
    assert!(matches!(
        result,
        Err(AdminError::InsufficientBalance {
            available: 100,
            required: 101
        })
    ));

    let wallet = ledger.get_wallet(user.user_id).await.unwrap();
    assert_eq!(wallet.bonus_amount, 100);
}

#[tokio::test]
async fn test_zero_delta_and_unknown_user() {
    let store = memory_store();
    let ledger = AccountLedger::new(store.clone());
    let user = seed_user(&store, Role::User, "zero@example.com").await;

    assert!(matches!(
        ledger
            .adjust_balance(user.user_id, BalanceField::Winnings, 0)
            .await,
        Err(AdminError::Validation(_))
    ));
    assert!(matches!(
        ledger.adjust_balance(100_001, BalanceField::Winnings, 5).await,
        Err(AdminError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_extreme_deltas_are_refused() {
    let store = memory_store();
    let ledger = AccountLedger::new(store.clone());
    let user = seed_user(&store, Role::User, "extreme@example.com").await;

    assert!(matches!(
        ledger
            .adjust_balance(user.user_id, BalanceField::Deposit, i64::MIN)
            .await,
        Err(AdminError::Validation(_))
    ));

    ledger
        .adjust_balance(user.user_id, BalanceField::Deposit, i64::MAX)
        .await
        .unwrap();
    assert!(matches!(
        ledger
            .adjust_balance(user.user_id, BalanceField::Bonus, 1)
            .await,
        Err(AdminError::BalanceOverflow)
    ));
    assert!(matches!(
        ledger
            .adjust_balance(user.user_id, BalanceField::Deposit, 1)
            .await,
        Err(AdminError::BalanceOverflow)
    ));

    let wallet = ledger.get_wallet(user.user_id).await.unwrap();
    assert_eq!(wallet.deposit_amount, i64::MAX);
    assert_eq!(wallet.bonus_amount, 0);
    assert_eq!(wallet.wallet, i64::MAX);

    // Debits of the largest representable size still report cleanly
    let result = ledger
        .adjust_balance(user.user_id, BalanceField::Winnings, i64::MIN + 1)
        .await;
    assert!(matches!(
        result,
        Err(AdminError::InsufficientBalance {
            available: 0,
            required: i64::MAX
        })
    ));
}

#[tokio::test]
async fn test_wallet_excludes_played_amount() {
    let store = memory_store();
    let ledger = AccountLedger::new(store.clone());
    let user = seed_user(&store, Role::User, "wallet@example.com").await;

    for (field, amount) in [
        (BalanceField::Deposit, 100),
        (BalanceField::Winnings, 20),
        (BalanceField::Bonus, 3),
        (BalanceField::Commission, 4),
        (BalanceField::Played, 1000),
    ] {
        ledger
            .adjust_balance(user.user_id, field, amount)
            .await
            .unwrap();
    }

    let wallet = ledger.get_wallet(user.user_id).await.unwrap();
    assert_eq!(wallet.wallet, 127);
    assert_eq!(wallet.played_amount, 1000);
}

#[tokio::test]
async fn test_concurrent_increments_are_not_lost() {
    let store = memory_store();
    let ledger = AccountLedger::new(store.clone());
    let user = seed_user(&store, Role::User, "concurrent@example.com").await;

    let mut handles = Vec::new();
    for _ in 0..50 {
        let ledger = ledger.clone();
        let user_id = user.user_id;
        handles.push(tokio::spawn(async move {
            ledger
                .adjust_balance(user_id, BalanceField::Deposit, 10)
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let wallet = ledger.get_wallet(user.user_id).await.unwrap();
    assert_eq!(wallet.deposit_amount, 500);
}

#[tokio::test]
async fn test_user_administration() {
    let store = memory_store();
    let ledger = AccountLedger::new(store.clone());
    let alice = seed_user(&store, Role::User, "alice@example.com").await;
    seed_user(&store, Role::Affiliate, "bob@example.com").await;
    seed_user(&store, Role::Admin, "carol@example.com").await;

    let affiliates = ledger
        .list_users(
            &UserFilter {
                role: Some(Role::Affiliate),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(affiliates.total_items, 1);
    assert_eq!(affiliates.items[0].email, "bob@example.com");

    let search = ledger
        .list_users(
            &UserFilter {
                search: Some("ALICE".into()),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(search.items.len(), 1);

    let updated = ledger
        .update_user(
            alice.user_id,
            UserUpdate {
                name: Some("Alice A.".into()),
                accessible_games: Some(vec!["roulette".into()]),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice A.");
    assert_eq!(updated.accessible_games, vec!["roulette".to_string()]);

    let suspended = ledger
        .set_status(alice.user_id, AccountStatus::Suspended)
        .await
        .unwrap();
    assert_eq!(suspended.status, AccountStatus::Suspended);

    assert!(matches!(
        ledger
            .update_user(alice.user_id, UserUpdate::default())
            .await,
        Err(AdminError::Validation(_))
    ));
}

#[tokio::test]
async fn test_list_users_paginates_newest_first() {
    let store = memory_store();
    let ledger = AccountLedger::new(store.clone());
    for i in 0..5 {
        seed_user(&store, Role::User, &format!("user{i}@example.com")).await;
    }

    let page = ledger
        .list_users(&UserFilter::default(), PageRequest::new(2, 2))
        .await
        .unwrap();
    assert_eq!(page.total_items, 5);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].email, "user2@example.com");
    assert_eq!(page.items[1].email, "user1@example.com");
}

fn field_strategy() -> impl Strategy<Value = BalanceField> {
    prop_oneof![
        Just(BalanceField::Deposit),
        Just(BalanceField::Winnings),
        Just(BalanceField::Bonus),
        Just(BalanceField::Commission),
        Just(BalanceField::Played),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_wallet_is_sum_of_four_fields(
        ops in prop::collection::vec((field_strategy(), -500i64..500), 1..40)
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = memory_store();
            let ledger = AccountLedger::new(store.clone());
            let user = seed_user(&store, Role::User, "prop@example.com").await;

            let mut expected = betting_admin::accounts::Balances::default();
            for (field, delta) in ops {
                let result = ledger.adjust_balance(user.user_id, field, delta).await;
                let current = expected.get(field);
                if delta != 0 && current + delta >= 0 {
                    prop_assert!(result.is_ok());
                    *expected.get_mut(field) += delta;
                } else {
                    prop_assert!(result.is_err());
                }
            }

            let wallet = ledger.get_wallet(user.user_id).await.unwrap();
            prop_assert_eq!(
                wallet.wallet,
                wallet.deposit_amount
                    + wallet.winnings_amount
                    + wallet.bonus_amount
                    + wallet.commission_amount
            );
            prop_assert_eq!(wallet.deposit_amount, expected.deposit_amount);
            prop_assert_eq!(wallet.played_amount, expected.played_amount);
            prop_assert!(wallet.deposit_amount >= 0 && wallet.winnings_amount >= 0);
            Ok(())
        })?;
    }
}
