use uuid::Uuid;

use crate::models::{KycStatus, NewUser, User};
use crate::{AppError, Result};

#[derive(Clone)]
pub struct UserStorage {
    pool: sqlx::PgPool,
}

impl UserStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewUser) -> Result<User> {
        let query = "INSERT INTO users (id, email, display_name)
            VALUES ($1, $2, $3) RETURNING *";
        let user = sqlx::query_as::<_, User>(query)
            .bind(Uuid::new_v4())
            .bind(new.email.trim().to_lowercase())
            .bind(new.display_name.trim())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(d) if d.is_unique_violation() => {
                    AppError::validation("Email is already registered")
                }
                _ => AppError::from(e),
            })?;
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>> {
        let query = "SELECT * FROM users WHERE id = $1";
        let user = sqlx::query_as::<_, User>(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Moves a user into the `pending` KYC queue. Verified accounts are not
    /// allowed back in; rejected ones may resubmit.
    pub async fn submit_kyc(&self, id: Uuid) -> Result<User> {
        let current = self.get(id).await?.ok_or(AppError::not_found("User"))?;
        if current.kyc_status == KycStatus::Verified.as_str() {
            return Err(AppError::validation("KYC is already verified"));
        }
        let query = "UPDATE users
            SET kyc_status = $2, kyc_submitted_at = now()
            WHERE id = $1 RETURNING *";
        let user = sqlx::query_as::<_, User>(query)
            .bind(id)
            .bind(KycStatus::Pending.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn set_kyc_status(&self, id: Uuid, status: KycStatus) -> Result<Option<User>> {
        let query = "UPDATE users SET kyc_status = $2 WHERE id = $1 RETURNING *";
        let user = sqlx::query_as::<_, User>(query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}
