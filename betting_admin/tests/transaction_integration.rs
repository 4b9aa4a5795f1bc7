//! Integration tests for recharge and withdrawal approval.

mod common;

use betting_admin::AdminError;
use betting_admin::accounts::{AccountLedger, BalanceField, Role, User};
use betting_admin::bank::{BankDetails, BankManager, NewBankDetails};
use betting_admin::db::{SharedStore, Store};
use betting_admin::transactions::{
    DecisionRequest, RechargeRequest, TransactionFilter, TransactionKind, TransactionManager,
    TransactionStatus, WithdrawalRequest,
};
use betting_admin::PageRequest;
use common::{memory_store, seed_user};

struct Fixture {
    store: SharedStore,
    txns: TransactionManager,
    ledger: AccountLedger,
    player: User,
    admin_bank: BankDetails,
    player_bank: BankDetails,
}

fn bank(holder: &str) -> NewBankDetails {
    NewBankDetails {
        account_holder: holder.to_string(),
        bank_name: "State Bank".to_string(),
        account_number: "00112233".to_string(),
        ifsc_code: "SBIN0000001".to_string(),
        upi_id: None,
        is_primary: false,
    }
}

async fn setup() -> Fixture {
    let store = memory_store();
    let banks = BankManager::new(store.clone());
    let admin = seed_user(&store, Role::Admin, "admin@example.com").await;
    let player = seed_user(&store, Role::User, "player@example.com").await;
    let admin_bank = banks.add(admin.user_id, bank("House")).await.unwrap();
    let player_bank = banks.add(player.user_id, bank("Player")).await.unwrap();

    Fixture {
        txns: TransactionManager::new(store.clone()),
        ledger: AccountLedger::new(store.clone()),
        store,
        player,
        admin_bank,
        player_bank,
    }
}

#[tokio::test]
async fn test_recharge_approval_credits_deposit_once() {
    let f = setup().await;
    let txn = f
        .txns
        .request_recharge(
            f.player.user_id,
            RechargeRequest {
                amount: 750,
                bank_account_id: f.admin_bank.id,
                reference: Some("UTR-1".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(txn.status, TransactionStatus::Pending);
    assert_eq!(txn.kind, TransactionKind::Recharge);

    let (approved, user) = f.txns.approve(txn.id, DecisionRequest::default()).await.unwrap();
    assert_eq!(approved.status, TransactionStatus::Approved);
    assert_eq!(approved.reference.as_deref(), Some("UTR-1"));
    assert_eq!(user.unwrap().balances.deposit_amount, 750);

    let again = f.txns.approve(txn.id, DecisionRequest::default()).await;
    assert!(matches!(again, Err(AdminError::InvalidTransition { .. })));
    let reject_after = f.txns.reject(txn.id, DecisionRequest::default()).await;
    assert!(matches!(reject_after, Err(AdminError::InvalidTransition { .. })));

    let wallet = f.ledger.get_wallet(f.player.user_id).await.unwrap();
    assert_eq!(wallet.deposit_amount, 750);
}

#[tokio::test]
async fn test_rejection_leaves_balances_untouched() {
    let f = setup().await;
    let txn = f
        .txns
        .request_recharge(
            f.player.user_id,
            RechargeRequest {
                amount: 300,
                bank_account_id: f.admin_bank.id,
                reference: None,
            },
        )
        .await
        .unwrap();

    let rejected = f
        .txns
        .reject(
            txn.id,
            DecisionRequest {
                reference: None,
                remark: Some("Payment not received".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(rejected.status, TransactionStatus::Rejected);
    assert_eq!(rejected.remark.as_deref(), Some("Payment not received"));

    let user = f.ledger.get_user(f.player.user_id).await.unwrap();
    assert_eq!(user.wallet(), 0);
}

#[tokio::test]
async fn test_recharge_requires_admin_bank() {
    let f = setup().await;
    let result = f
        .txns
        .request_recharge(
            f.player.user_id,
            RechargeRequest {
                amount: 100,
                bank_account_id: f.player_bank.id,
                reference: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AdminError::Validation(_))));

    let zero = f
        .txns
        .request_recharge(
            f.player.user_id,
            RechargeRequest {
                amount: 0,
                bank_account_id: f.admin_bank.id,
                reference: None,
            },
        )
        .await;
    assert!(matches!(zero, Err(AdminError::Validation(_))));
}

#[tokio::test]
async fn test_withdrawal_limited_by_winnings() {
    let f = setup().await;
    f.ledger
        .adjust_balance(f.player.user_id, BalanceField::Winnings, 400)
        .await
        .unwrap();
    // Deposits cannot be withdrawn
    f.ledger
        .adjust_balance(f.player.user_id, BalanceField::Deposit, 1000)
        .await
        .unwrap();

    let result = f
        .txns
        .request_withdrawal(
            f.player.user_id,
            WithdrawalRequest {
                amount: 401,
                bank_account_id: f.player_bank.id,
            },
        )
        .await;
    assert!(matches!(
        result,
        Err(AdminError::InsufficientBalance {
            available: 400,
            required: 401
        })
    ));
}

#[tokio::test]
async fn test_withdrawal_requires_own_bank() {
    let f = setup().await;
    f.ledger
        .adjust_balance(f.player.user_id, BalanceField::Winnings, 400)
        .await
        .unwrap();

    let result = f
        .txns
        .request_withdrawal(
            f.player.user_id,
            WithdrawalRequest {
                amount: 100,
                bank_account_id: f.admin_bank.id,
            },
        )
        .await;
    assert!(matches!(result, Err(AdminError::NotFound { .. })));
}

#[tokio::test]
async fn test_withdrawal_approval_debits_winnings_and_stamps_reference() {
    let f = setup().await;
    f.ledger
        .adjust_balance(f.player.user_id, BalanceField::Winnings, 400)
        .await
        .unwrap();

    let txn = f
        .txns
        .request_withdrawal(
            f.player.user_id,
            WithdrawalRequest {
                amount: 250,
                bank_account_id: f.player_bank.id,
            },
        )
        .await
        .unwrap();
    assert_eq!(txn.kind, TransactionKind::Withdrawal);

    let (approved, user) = f
        .txns
        .approve(
            txn.id,
            DecisionRequest {
                reference: Some("PAYOUT-77".into()),
                remark: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(approved.reference.as_deref(), Some("PAYOUT-77"));
    assert_eq!(user.unwrap().balances.winnings_amount, 150);
}

#[tokio::test]
async fn test_withdrawal_approval_without_funds_stays_pending() {
    let f = setup().await;
    f.ledger
        .adjust_balance(f.player.user_id, BalanceField::Winnings, 300)
        .await
        .unwrap();
    let txn = f
        .txns
        .request_withdrawal(
            f.player.user_id,
            WithdrawalRequest {
                amount: 300,
                bank_account_id: f.player_bank.id,
            },
        )
        .await
        .unwrap();

    // Winnings spent between request and approval
    f.ledger
        .adjust_balance(f.player.user_id, BalanceField::Winnings, -200)
        .await
        .unwrap();

    let result = f.txns.approve(txn.id, DecisionRequest::default()).await;
    assert!(matches!(result, Err(AdminError::InsufficientBalance { .. })));

    let stored = f.txns.get(txn.id).await.unwrap();
    assert_eq!(stored.status, TransactionStatus::Pending);
    let user = f.ledger.get_user(f.player.user_id).await.unwrap();
    assert_eq!(user.balances.winnings_amount, 100);
}

#[tokio::test]
async fn test_listing_filters_by_status_and_kind() {
    let f = setup().await;
    f.ledger
        .adjust_balance(f.player.user_id, BalanceField::Winnings, 100)
        .await
        .unwrap();
    let recharge = f
        .txns
        .request_recharge(
            f.player.user_id,
            RechargeRequest {
                amount: 50,
                bank_account_id: f.admin_bank.id,
                reference: None,
            },
        )
        .await
        .unwrap();
    f.txns
        .request_withdrawal(
            f.player.user_id,
            WithdrawalRequest {
                amount: 60,
                bank_account_id: f.player_bank.id,
            },
        )
        .await
        .unwrap();
    f.txns
        .approve(recharge.id, DecisionRequest::default())
        .await
        .unwrap();

    let pending = f
        .txns
        .list(
            &TransactionFilter {
                status: Some(TransactionStatus::Pending),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(pending.total_items, 1);
    assert_eq!(pending.items[0].kind, TransactionKind::Withdrawal);

    let recharges = f
        .txns
        .list(
            &TransactionFilter {
                kind: Some(TransactionKind::Recharge),
                user_id: Some(f.player.user_id),
                ..Default::default()
            },
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(recharges.total_items, 1);
    assert_eq!(recharges.items[0].id, recharge.id);

    assert!(f.store.health_check().await.is_ok());
}
