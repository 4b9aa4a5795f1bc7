//! Transaction manager implementation.

use uuid::Uuid;

use super::models::{
    Decision, DecisionRequest, MoneyTransaction, NewTransaction, RechargeRequest,
    TransactionFilter, TransactionKind, TransactionStatus, WithdrawalRequest,
};
use crate::accounts::{User, UserId};
use crate::bank::BankDetails;
use crate::db::SharedStore;
use crate::error::{AdminError, AdminResult};
use crate::pagination::{Page, PageRequest};

/// Transaction manager
#[derive(Clone)]
pub struct TransactionManager {
    store: SharedStore,
}

impl TransactionManager {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    async fn require_user(&self, user_id: UserId) -> AdminResult<User> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AdminError::not_found("User", user_id))
    }

    async fn require_bank(&self, id: Uuid) -> AdminResult<BankDetails> {
        self.store
            .find_bank(id)
            .await?
            .ok_or_else(|| AdminError::not_found("BankDetails", id))
    }

    /// Record a pending recharge paid into an admin bank account
    ///
    /// # Errors
    ///
    /// * `AdminError::Validation` - Non-positive amount or a bank account that
    ///   does not belong to an admin
    /// * `AdminError::NotFound` - User or bank account missing
    pub async fn request_recharge(
        &self,
        user_id: UserId,
        request: RechargeRequest,
    ) -> AdminResult<MoneyTransaction> {
        if request.amount <= 0 {
            return Err(AdminError::validation("Recharge amount must be positive"));
        }
        self.require_user(user_id).await?;

        let bank = self.require_bank(request.bank_account_id).await?;
        let owner = self.require_user(bank.user_id).await?;
        if !owner.role.is_admin() {
            return Err(AdminError::validation(
                "Recharges must be paid into an admin bank account",
            ));
        }

        let txn = self
            .store
            .create_transaction(NewTransaction {
                kind: TransactionKind::Recharge,
                user_id,
                bank_account_id: bank.id,
                amount: request.amount,
                reference: request.reference,
            })
            .await?;

        log::info!("Recharge {} of {} requested by user {}", txn.id, txn.amount, user_id);
        Ok(txn)
    }

    /// Record a pending withdrawal to one of the user's own bank records
    ///
    /// # Errors
    ///
    /// * `AdminError::Validation` - Non-positive amount
    /// * `AdminError::InsufficientBalance` - Amount exceeds current winnings
    /// * `AdminError::NotFound` - User or bank record missing, or the record
    ///   belongs to someone else
    pub async fn request_withdrawal(
        &self,
        user_id: UserId,
        request: WithdrawalRequest,
    ) -> AdminResult<MoneyTransaction> {
        if request.amount <= 0 {
            return Err(AdminError::validation("Withdrawal amount must be positive"));
        }
        let user = self.require_user(user_id).await?;

        let bank = self.require_bank(request.bank_account_id).await?;
        if bank.user_id != user_id {
            return Err(AdminError::not_found("BankDetails", request.bank_account_id));
        }

        let available = user.balances.winnings_amount;
        if request.amount > available {
            return Err(AdminError::InsufficientBalance {
                available,
                required: request.amount,
            });
        }

        let txn = self
            .store
            .create_transaction(NewTransaction {
                kind: TransactionKind::Withdrawal,
                user_id,
                bank_account_id: bank.id,
                amount: request.amount,
                reference: None,
            })
            .await?;

        log::info!("Withdrawal {} of {} requested by user {}", txn.id, txn.amount, user_id);
        Ok(txn)
    }

    /// Approve a pending transaction and apply its ledger effect
    pub async fn approve(
        &self,
        id: Uuid,
        request: DecisionRequest,
    ) -> AdminResult<(MoneyTransaction, Option<User>)> {
        self.decide(
            id,
            Decision {
                status: TransactionStatus::Approved,
                reference: request.reference,
                remark: request.remark,
            },
        )
        .await
    }

    /// Reject a pending transaction; balances are untouched
    pub async fn reject(&self, id: Uuid, request: DecisionRequest) -> AdminResult<MoneyTransaction> {
        let (txn, _) = self
            .decide(
                id,
                Decision {
                    status: TransactionStatus::Rejected,
                    reference: None,
                    remark: request.remark,
                },
            )
            .await?;
        Ok(txn)
    }

    async fn decide(
        &self,
        id: Uuid,
        decision: Decision,
    ) -> AdminResult<(MoneyTransaction, Option<User>)> {
        let status = decision.status;
        match self.store.decide_transaction(id, decision).await {
            Ok((txn, user)) => {
                log::info!("{} {} {} for user {}", txn.kind, txn.id, status, txn.user_id);
                Ok((txn, user))
            }
            Err(e) => {
                log::warn!("Could not mark transaction {} {}: {}", id, status, e);
                Err(e)
            }
        }
    }

    pub async fn get(&self, id: Uuid) -> AdminResult<MoneyTransaction> {
        self.store
            .find_transaction(id)
            .await?
            .ok_or_else(|| AdminError::not_found("Transaction", id))
    }

    pub async fn list(
        &self,
        filter: &TransactionFilter,
        page: PageRequest,
    ) -> AdminResult<Page<MoneyTransaction>> {
        let (txns, total) = self.store.list_transactions(filter, &page).await?;
        Ok(Page::new(txns, page, total))
    }
}
