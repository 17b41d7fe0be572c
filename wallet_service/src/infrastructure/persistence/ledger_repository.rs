//! The composite, row-locked money-movement operations (§4.5/§4.6). Each
//! method is one database transaction end to end: lock, mutate, write the
//! ledger row, commit — a transactional rebind collapsed into single trait
//! methods, see `domain::repository` for why.

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction as SqlxTx};

use crate::domain::entities::{Deposit, Transaction, Withdrawal};
use crate::domain::error::WalletError;
use crate::domain::repository::{LedgerRepository, SettlementOutcome};
use crate::domain::types::{
    ProviderId, TenantId, TransactionId, TransactionStatus, TransactionType, WalletId,
};
use crate::infrastructure::persistence::models::{DepositModel, TransactionModel, WithdrawalModel};

pub struct PostgresLedgerRepository {
    pool: PgPool,
}

impl PostgresLedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Locks a wallet row for update and returns its current balance.
async fn lock_wallet_balance(
    tx: &mut SqlxTx<'_, Postgres>,
    wallet_id: WalletId,
) -> Result<Decimal, WalletError> {
    let row: Option<(Decimal,)> =
        sqlx::query_as("SELECT balance FROM wallets WHERE id = $1 FOR UPDATE")
            .bind(wallet_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;
    row.map(|(b,)| b).ok_or(WalletError::NotFound(wallet_id))
}

async fn set_wallet_balance(
    tx: &mut SqlxTx<'_, Postgres>,
    wallet_id: WalletId,
    new_balance: Decimal,
) -> Result<(), WalletError> {
    sqlx::query("UPDATE wallets SET balance = $1, updated_at = now() WHERE id = $2")
        .bind(new_balance)
        .bind(wallet_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?;
    Ok(())
}

async fn insert_transaction(
    tx: &mut SqlxTx<'_, Postgres>,
    tenant_id: TenantId,
    wallet_id: WalletId,
    provider_id: Option<ProviderId>,
    reference: String,
    currency_code: String,
    transaction_type: TransactionType,
    status: TransactionStatus,
    amount: Decimal,
    metadata: Value,
) -> Result<Transaction, WalletError> {
    let now = Utc::now();
    let id = TransactionId::new();
    let model = sqlx::query_as::<_, TransactionModel>(
        r#"
        INSERT INTO transactions (
            id, tenant_id, wallet_id, provider_id, currency_code, reference,
            transaction_type, status, amount, fee, metadata, error_reason,
            created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, $10, NULL, $11, $11)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(tenant_id)
    .bind(wallet_id)
    .bind(provider_id)
    .bind(currency_code)
    .bind(reference.clone())
    .bind(transaction_type)
    .bind(status)
    .bind(amount)
    .bind(metadata)
    .bind(now)
    .fetch_one(&mut **tx)
    .await
    .map_err(|e| {
        if e.to_string().contains("transactions_reference") {
            WalletError::DuplicateReference(reference.clone())
        } else {
            WalletError::Repository(e.to_string())
        }
    })?;

    Ok(model.into())
}

#[async_trait]
impl LedgerRepository for PostgresLedgerRepository {
    async fn initiate_deposit(
        &self,
        tenant_id: TenantId,
        wallet_id: WalletId,
        provider_id: ProviderId,
        reference: String,
        amount: Decimal,
        currency_code: String,
        metadata: Value,
    ) -> Result<(Transaction, Deposit), WalletError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        let transaction = insert_transaction(
            &mut tx,
            tenant_id,
            wallet_id,
            Some(provider_id),
            reference,
            currency_code,
            TransactionType::Deposit,
            TransactionStatus::Pending,
            amount,
            metadata,
        )
        .await?;

        let now = Utc::now();
        let deposit_id = uuid::Uuid::new_v4();
        let deposit_model = sqlx::query_as::<_, DepositModel>(
            r#"
            INSERT INTO deposits (
                id, user_id, transaction_id, external_tx_id, amount, status, created_at, updated_at
            )
            SELECT $1, wallets.user_id, $2, NULL, $3, $4, $5, $5
            FROM wallets WHERE wallets.id = $6
            RETURNING *
            "#,
        )
        .bind(deposit_id)
        .bind(transaction.id)
        .bind(amount)
        .bind(TransactionStatus::Pending)
        .bind(now)
        .bind(wallet_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        Ok((transaction, deposit_model.into()))
    }

    async fn withdraw(
        &self,
        tenant_id: TenantId,
        wallet_id: WalletId,
        amount: Decimal,
        metadata: Value,
    ) -> Result<(Transaction, Withdrawal), WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(
                "amount must be greater than zero".into(),
            ));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        let balance = lock_wallet_balance(&mut tx, wallet_id).await?;
        if balance < amount {
            return Err(WalletError::InsufficientBalance(wallet_id));
        }
        set_wallet_balance(&mut tx, wallet_id, balance - amount).await?;

        let reference = format!("wd_{}", uuid::Uuid::new_v4());
        let currency_code: (String,) =
            sqlx::query_as("SELECT currency_code FROM wallets WHERE id = $1")
                .bind(wallet_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| WalletError::Repository(e.to_string()))?;

        let transaction = insert_transaction(
            &mut tx,
            tenant_id,
            wallet_id,
            None,
            reference,
            currency_code.0,
            TransactionType::Withdrawal,
            TransactionStatus::Completed,
            amount,
            metadata,
        )
        .await?;

        let now = Utc::now();
        let withdrawal_id = uuid::Uuid::new_v4();
        let withdrawal_model = sqlx::query_as::<_, WithdrawalModel>(
            r#"
            INSERT INTO withdrawals (
                id, user_id, transaction_id, amount, status, created_at, updated_at
            )
            SELECT $1, wallets.user_id, $2, $3, $4, $5, $5
            FROM wallets WHERE wallets.id = $6
            RETURNING *
            "#,
        )
        .bind(withdrawal_id)
        .bind(transaction.id)
        .bind(amount)
        .bind(TransactionStatus::Completed)
        .bind(now)
        .bind(wallet_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        Ok((transaction, withdrawal_model.into()))
    }

    async fn transfer(
        &self,
        tenant_id: TenantId,
        from_wallet_id: WalletId,
        to_wallet_id: WalletId,
        amount: Decimal,
        metadata: Value,
    ) -> Result<Transaction, WalletError> {
        if amount <= Decimal::ZERO {
            return Err(WalletError::InvalidAmount(
                "amount must be greater than zero".into(),
            ));
        }
        if from_wallet_id == to_wallet_id {
            return Err(WalletError::SameWallet(from_wallet_id));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        // Ascending wallet-id order precludes deadlock against a concurrent
        // transfer running in the opposite direction.
        let (from_balance, to_balance) = if from_wallet_id.0 < to_wallet_id.0 {
            let from_balance = lock_wallet_balance(&mut tx, from_wallet_id).await?;
            let to_balance = lock_wallet_balance(&mut tx, to_wallet_id).await?;
            (from_balance, to_balance)
        } else {
            let to_balance = lock_wallet_balance(&mut tx, to_wallet_id).await?;
            let from_balance = lock_wallet_balance(&mut tx, from_wallet_id).await?;
            (from_balance, to_balance)
        };

        if from_balance < amount {
            return Err(WalletError::InsufficientBalance(from_wallet_id));
        }

        set_wallet_balance(&mut tx, from_wallet_id, from_balance - amount).await?;
        set_wallet_balance(&mut tx, to_wallet_id, to_balance + amount).await?;

        let reference = format!("tr_{}", uuid::Uuid::new_v4());
        let currency_code: (String,) =
            sqlx::query_as("SELECT currency_code FROM wallets WHERE id = $1")
                .bind(from_wallet_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| WalletError::Repository(e.to_string()))?;

        let transaction = insert_transaction(
            &mut tx,
            tenant_id,
            from_wallet_id,
            None,
            reference,
            currency_code.0,
            TransactionType::Transfer,
            TransactionStatus::Completed,
            amount,
            metadata,
        )
        .await?;

        tx.commit()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        Ok(transaction)
    }

    async fn settle_deposit(
        &self,
        reference: &str,
        amount_from_gateway: Decimal,
    ) -> Result<(Transaction, SettlementOutcome), WalletError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        let existing = sqlx::query_as::<_, TransactionModel>(
            "SELECT * FROM transactions WHERE reference = $1 FOR UPDATE",
        )
        .bind(reference)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?
        .ok_or_else(|| WalletError::Repository(format!("no transaction for reference {reference}")))?;

        if matches!(existing.status, TransactionStatus::Completed) {
            return Ok((existing.into(), SettlementOutcome::AlreadySettled));
        }

        let wallet_id = existing.wallet_id;
        let balance = lock_wallet_balance(&mut tx, wallet_id).await?;
        set_wallet_balance(&mut tx, wallet_id, balance + amount_from_gateway).await?;

        let updated = sqlx::query_as::<_, TransactionModel>(
            r#"
            UPDATE transactions
            SET status = $1, amount = $2, updated_at = now()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(TransactionStatus::Completed)
        .bind(amount_from_gateway)
        .bind(existing.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?;

        sqlx::query("UPDATE deposits SET status = $1, amount = $2, updated_at = now() WHERE transaction_id = $3")
            .bind(TransactionStatus::Completed)
            .bind(amount_from_gateway)
            .bind(existing.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        Ok((updated.into(), SettlementOutcome::Settled))
    }

    async fn mark_deposit_failed(
        &self,
        reference: &str,
        reason: String,
    ) -> Result<Transaction, WalletError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        let existing = sqlx::query_as::<_, TransactionModel>(
            "SELECT * FROM transactions WHERE reference = $1 FOR UPDATE",
        )
        .bind(reference)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?
        .ok_or_else(|| WalletError::Repository(format!("no transaction for reference {reference}")))?;

        if matches!(
            existing.status,
            TransactionStatus::Failed | TransactionStatus::Completed
        ) {
            // Already terminal: must be safe to run repeatedly.
            return Ok(existing.into());
        }

        let updated = sqlx::query_as::<_, TransactionModel>(
            r#"
            UPDATE transactions
            SET status = $1, error_reason = $2, updated_at = now()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(TransactionStatus::Failed)
        .bind(reason)
        .bind(existing.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| WalletError::Repository(e.to_string()))?;

        sqlx::query("UPDATE deposits SET status = $1, updated_at = now() WHERE transaction_id = $2")
            .bind(TransactionStatus::Failed)
            .bind(existing.id)
            .execute(&mut *tx)
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| WalletError::Repository(e.to_string()))?;

        Ok(updated.into())
    }
}
