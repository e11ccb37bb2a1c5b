use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{
    ConversionQuote, Currency, NewTransaction, Transaction, TransactionKind, TransactionStatus,
};
use crate::{AppError, Result};

#[derive(Clone)]
pub struct TransactionStorage {
    pool: sqlx::PgPool,
}

/// Appends a ledger row on whatever executor the caller is running on, so
/// flows that already hold a database transaction can write through it.
pub(crate) async fn record(
    executor: impl sqlx::PgExecutor<'_>,
    new: NewTransaction,
) -> Result<Transaction> {
    let query = "INSERT INTO transactions
        (id, user_id, kind, amount, currency, status,
         exchange_rate, fee_amount, provider_ref, description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *";
    let row = sqlx::query_as::<_, Transaction>(query)
        .bind(Uuid::new_v4())
        .bind(new.user_id)
        .bind(new.kind.as_str())
        .bind(new.amount)
        .bind(new.currency)
        .bind(new.status.as_str())
        .bind(new.exchange_rate)
        .bind(new.fee_amount)
        .bind(new.provider_ref)
        .bind(new.description)
        .fetch_one(executor)
        .await?;
    Ok(row)
}

fn balance_column(currency: Currency) -> &'static str {
    match currency {
        Currency::Php => "php_balance",
        Currency::Puso => "puso_balance",
    }
}

impl TransactionStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        let query = "SELECT * FROM transactions WHERE id = $1";
        let row = sqlx::query_as::<_, Transaction>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Transaction>> {
        let query = "SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC";
        let rows = sqlx::query_as::<_, Transaction>(query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn create_pending_deposit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        provider_ref: &str,
    ) -> Result<Transaction> {
        record(
            &self.pool,
            NewTransaction {
                user_id,
                kind: TransactionKind::Deposit,
                amount,
                currency: Currency::Php.to_string(),
                status: TransactionStatus::Pending,
                exchange_rate: None,
                fee_amount: None,
                provider_ref: Some(provider_ref.to_string()),
                description: Some("Wallet deposit".to_string()),
            },
        )
        .await
    }

    /// Resolves a pending deposit from a webhook event. Returns `None` for
    /// unknown references or already-settled rows, which makes webhook
    /// redelivery harmless.
    pub async fn settle_deposit(&self, provider_ref: &str, paid: bool) -> Result<Option<Transaction>> {
        let status = if paid {
            TransactionStatus::Completed
        } else {
            TransactionStatus::Failed
        };
        let mut tx = self.pool.begin().await?;
        let query = "UPDATE transactions
            SET status = $2, updated_at = now()
            WHERE provider_ref = $1 AND kind = $3 AND status = $4
            RETURNING *";
        let row = sqlx::query_as::<_, Transaction>(query)
            .bind(provider_ref)
            .bind(status.as_str())
            .bind(TransactionKind::Deposit.as_str())
            .bind(TransactionStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        if paid {
            sqlx::query("UPDATE users SET php_balance = php_balance + $1 WHERE id = $2")
                .bind(row.amount)
                .bind(row.user_id)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(Some(row))
    }

    /// Debits the PHP wallet and opens a pending withdrawal row in one
    /// database transaction.
    pub async fn create_pending_withdrawal(
        &self,
        user_id: Uuid,
        amount: Decimal,
    ) -> Result<Transaction> {
        let mut tx = self.pool.begin().await?;
        let balance: Option<(Decimal,)> =
            sqlx::query_as("SELECT php_balance FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((balance,)) = balance else {
            return Err(AppError::not_found("User"));
        };
        if balance < amount {
            return Err(AppError::validation("Insufficient PHP balance"));
        }
        let debited =
            sqlx::query("UPDATE users SET php_balance = php_balance - $1 WHERE id = $2 AND php_balance >= $1")
                .bind(amount)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        if debited.rows_affected() == 0 {
            return Err(AppError::validation("Insufficient PHP balance"));
        }
        let row = record(
            &mut *tx,
            NewTransaction {
                user_id,
                kind: TransactionKind::Withdrawal,
                amount,
                currency: Currency::Php.to_string(),
                status: TransactionStatus::Pending,
                exchange_rate: None,
                fee_amount: None,
                provider_ref: None,
                description: Some("Wallet withdrawal".to_string()),
            },
        )
        .await?;
        tx.commit().await?;
        Ok(row)
    }

    pub async fn complete_withdrawal(
        &self,
        id: Uuid,
        provider_ref: &str,
    ) -> Result<Option<Transaction>> {
        let query = "UPDATE transactions
            SET status = $2, provider_ref = $3, updated_at = now()
            WHERE id = $1 AND status = $4
            RETURNING *";
        let row = sqlx::query_as::<_, Transaction>(query)
            .bind(id)
            .bind(TransactionStatus::Completed.as_str())
            .bind(provider_ref)
            .bind(TransactionStatus::Pending.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Marks a withdrawal failed and puts the debited amount back.
    pub async fn fail_withdrawal(&self, id: Uuid) -> Result<Option<Transaction>> {
        let mut tx = self.pool.begin().await?;
        let query = "UPDATE transactions
            SET status = $2, updated_at = now()
            WHERE id = $1 AND status = $3
            RETURNING *";
        let row = sqlx::query_as::<_, Transaction>(query)
            .bind(id)
            .bind(TransactionStatus::Failed.as_str())
            .bind(TransactionStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        sqlx::query("UPDATE users SET php_balance = php_balance + $1 WHERE id = $2")
            .bind(row.amount)
            .bind(row.user_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(Some(row))
    }

    /// Applies a quoted conversion to the payer's wallet and records the
    /// ledger row carrying the rate and fee it executed at. The debit, the
    /// credit and the ledger write share one database transaction.
    pub async fn execute_conversion(
        &self,
        user_id: Uuid,
        quote: &ConversionQuote,
    ) -> Result<Transaction> {
        let from_col = balance_column(quote.from_currency);
        let to_col = balance_column(quote.to_currency);
        let mut tx = self.pool.begin().await?;
        let balances: Option<(Decimal, Decimal)> =
            sqlx::query_as("SELECT php_balance, puso_balance FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some((php, puso)) = balances else {
            return Err(AppError::not_found("User"));
        };
        let available = match quote.from_currency {
            Currency::Php => php,
            Currency::Puso => puso,
        };
        if available < quote.total_cost {
            return Err(AppError::validation(format!(
                "Insufficient {} balance",
                quote.from_currency
            )));
        }
        let update = format!(
            "UPDATE users SET {from_col} = {from_col} - $1, {to_col} = {to_col} + $2
             WHERE id = $3 AND {from_col} >= $1"
        );
        let moved = sqlx::query(&update)
            .bind(quote.total_cost)
            .bind(quote.to_amount)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        if moved.rows_affected() == 0 {
            return Err(AppError::validation(format!(
                "Insufficient {} balance",
                quote.from_currency
            )));
        }
        let row = record(
            &mut *tx,
            NewTransaction {
                user_id,
                kind: TransactionKind::Conversion,
                amount: quote.from_amount,
                currency: quote.from_currency.to_string(),
                status: TransactionStatus::Completed,
                exchange_rate: Some(quote.exchange_rate),
                fee_amount: Some(quote.fee),
                provider_ref: None,
                description: Some(format!(
                    "Converted {} {} to {} {}",
                    quote.from_amount, quote.from_currency, quote.to_amount, quote.to_currency
                )),
            },
        )
        .await?;
        tx.commit().await?;
        Ok(row)
    }
}
