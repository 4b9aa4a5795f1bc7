//! Integration tests for bet placement and settlement.

mod common;

use betting_admin::AdminError;
use betting_admin::accounts::{AccountLedger, BalanceField, Role};
use betting_admin::betting::{BetFilter, BetStatus, BettingManager, PlaceBetRequest};
use betting_admin::pagination::PageRequest;
use common::{memory_store, seed_bet_bounds, seed_user};
use proptest::prelude::*;

fn bet(user_id: i64, amount: i64) -> PlaceBetRequest {
    PlaceBetRequest {
        user_id,
        amount,
        win_amount: amount * 2,
        game: Some("roulette".into()),
    }
}

#[tokio::test]
async fn test_place_and_cancel_restores_played_amount() {
    let store = memory_store();
    seed_bet_bounds(&store, 10.0, 10_000.0).await;
    let ledger = AccountLedger::new(store.clone());
    let bets = BettingManager::new(store.clone());

    let user = seed_user(&store, Role::User, "bettor@example.com").await;
    ledger
        .adjust_balance(user.user_id, BalanceField::Bonus, 500)
        .await
        .unwrap();

    let (betting, after_bet) = bets.place_bet(bet(user.user_id, 100)).await.unwrap();
    assert_eq!(betting.status, BetStatus::BetApplied);
    assert_eq!(after_bet.balances.played_amount, 100);
    assert!((100_000..=999_999).contains(&betting.betting_id));

    let stored = bets.get(betting.betting_id).await.unwrap();
    assert_eq!(stored.status, BetStatus::BetApplied);
    assert_eq!(stored.amount, 100);

    let (cancelled, after_cancel) = bets
        .update_status(betting.betting_id, BetStatus::BetCancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, BetStatus::BetCancelled);
    assert_eq!(after_cancel.balances.played_amount, 0);
    assert_eq!(after_cancel.balances.bonus_amount, 500);
}

#[tokio::test]
async fn test_won_bet_credits_winnings_once() {
    let store = memory_store();
    seed_bet_bounds(&store, 10.0, 10_000.0).await;
    let bets = BettingManager::new(store.clone());
    let user = seed_user(&store, Role::User, "winner@example.com").await;

    let (betting, _) = bets.place_bet(bet(user.user_id, 250)).await.unwrap();
    let (won, user_after) = bets
        .update_status(betting.betting_id, BetStatus::BetWon)
        .await
        .unwrap();
    assert_eq!(won.status, BetStatus::BetWon);
    assert_eq!(user_after.balances.winnings_amount, 500);

    // Terminal: neither a second win nor a cancel is accepted
    assert!(matches!(
        bets.update_status(betting.betting_id, BetStatus::BetWon).await,
        Err(AdminError::InvalidTransition { .. })
    ));
    assert!(matches!(
        bets.update_status(betting.betting_id, BetStatus::BetCancelled)
            .await,
        Err(AdminError::InvalidTransition { .. })
    ));

    let ledger = AccountLedger::new(store.clone());
    let wallet = ledger.get_wallet(user.user_id).await.unwrap();
    assert_eq!(wallet.winnings_amount, 500);
    assert_eq!(wallet.played_amount, 250);
}

#[tokio::test]
async fn test_bounds_are_exclusive_and_leave_balance_untouched() {
    let store = memory_store();
    seed_bet_bounds(&store, 10.0, 10_000.0).await;
    let bets = BettingManager::new(store.clone());
    let ledger = AccountLedger::new(store.clone());
    let user = seed_user(&store, Role::User, "bounds@example.com").await;

    for amount in [10, 10_000, 5, 20_000] {
        assert!(matches!(
            bets.place_bet(bet(user.user_id, amount)).await,
            Err(AdminError::Validation(_))
        ));
    }

    let wallet = ledger.get_wallet(user.user_id).await.unwrap();
    assert_eq!(wallet.played_amount, 0);

    let listed = bets
        .list(&BetFilter::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(listed.total_items, 0);
}

#[tokio::test]
async fn test_missing_bound_setting_is_not_found() {
    let store = memory_store();
    let bets = BettingManager::new(store.clone());
    let user = seed_user(&store, Role::User, "nosettings@example.com").await;

    assert!(matches!(
        bets.place_bet(bet(user.user_id, 100)).await,
        Err(AdminError::NotFound {
            entity: "AmountSetup",
            ..
        })
    ));
}

#[tokio::test]
async fn test_unknown_user_and_bad_amounts() {
    let store = memory_store();
    seed_bet_bounds(&store, 10.0, 10_000.0).await;
    let bets = BettingManager::new(store.clone());

    assert!(matches!(
        bets.place_bet(bet(100_000, 100)).await,
        Err(AdminError::NotFound { entity: "User", .. })
    ));
    assert!(matches!(
        bets.place_bet(bet(100_000, 0)).await,
        Err(AdminError::Validation(_))
    ));
    assert!(matches!(
        bets.update_status(123_456, BetStatus::BetCancelled).await,
        Err(AdminError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_list_filters_by_user_and_status() {
    let store = memory_store();
    seed_bet_bounds(&store, 10.0, 10_000.0).await;
    let bets = BettingManager::new(store.clone());
    let alice = seed_user(&store, Role::User, "alice@example.com").await;
    let bob = seed_user(&store, Role::User, "bob@example.com").await;

    let (first, _) = bets.place_bet(bet(alice.user_id, 100)).await.unwrap();
    bets.place_bet(bet(alice.user_id, 200)).await.unwrap();
    bets.place_bet(bet(bob.user_id, 300)).await.unwrap();
    bets.update_status(first.betting_id, BetStatus::BetCancelled)
        .await
        .unwrap();

    let alice_bets = bets
        .list(
            &BetFilter {
                user_id: Some(alice.user_id),
                status: None,
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(alice_bets.total_items, 2);

    let applied = bets
        .list(
            &BetFilter {
                user_id: None,
                status: Some(BetStatus::BetApplied),
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(applied.total_items, 2);
    assert!(applied.items.iter().all(|b| b.status == BetStatus::BetApplied));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn test_out_of_bounds_amounts_never_change_played(
        min in 1i64..1_000,
        span in 2i64..10_000,
        amount in 1i64..20_000,
    ) {
        let max = min + span;
        let rt = tokio::runtime::Runtime::new().unwrap();
        rt.block_on(async {
            let store = memory_store();
            seed_bet_bounds(&store, min as f64, max as f64).await;
            let bets = BettingManager::new(store.clone());
            let ledger = AccountLedger::new(store.clone());
            let user = seed_user(&store, Role::User, "prop@example.com").await;

            let result = bets.place_bet(bet(user.user_id, amount)).await;
            let played = ledger.get_wallet(user.user_id).await.unwrap().played_amount;

            if amount > min && amount < max {
                prop_assert!(result.is_ok());
                prop_assert_eq!(played, amount);
            } else {
                prop_assert!(matches!(result, Err(AdminError::Validation(_))));
                prop_assert_eq!(played, 0);
            }
            Ok(())
        })?;
    }
}
