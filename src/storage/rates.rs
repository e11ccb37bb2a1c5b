use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::{Currency, ExchangeRate};
use crate::Result;

#[derive(Clone)]
pub struct RateStorage {
    pool: sqlx::PgPool,
}

impl RateStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Latest active rate for the exact pair, if any.
    pub async fn get_active(&self, from: Currency, to: Currency) -> Result<Option<ExchangeRate>> {
        let query = "SELECT * FROM exchange_rates
            WHERE from_currency = $1 AND to_currency = $2 AND is_active
            ORDER BY created_at DESC
            LIMIT 1";
        let rate = sqlx::query_as::<_, ExchangeRate>(query)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(rate)
    }

    /// Supersedes the pair's active rate: deactivates prior rows, then
    /// inserts the new one. Both writes share one database transaction so a
    /// concurrent quote never observes the pair with no active rate.
    pub async fn set_rate(
        &self,
        from: Currency,
        to: Currency,
        rate: Decimal,
        source: &str,
    ) -> Result<ExchangeRate> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "UPDATE exchange_rates SET is_active = FALSE
             WHERE from_currency = $1 AND to_currency = $2 AND is_active",
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&mut *tx)
        .await?;
        let inserted = sqlx::query_as::<_, ExchangeRate>(
            "INSERT INTO exchange_rates (id, from_currency, to_currency, rate, source)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(rate)
        .bind(source)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(inserted)
    }

    /// Rate history for a pair, newest first, superseded rows included.
    pub async fn history(
        &self,
        from: Currency,
        to: Currency,
        limit: i64,
    ) -> Result<Vec<ExchangeRate>> {
        let query = "SELECT * FROM exchange_rates
            WHERE from_currency = $1 AND to_currency = $2
            ORDER BY created_at DESC
            LIMIT $3";
        let rates = sqlx::query_as::<_, ExchangeRate>(query)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rates)
    }
}
