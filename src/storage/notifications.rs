use uuid::Uuid;

use crate::models::{NewNotification, Notification};
use crate::Result;

#[derive(Clone)]
pub struct NotificationStorage {
    pool: sqlx::PgPool,
}

impl NotificationStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewNotification) -> Result<Notification> {
        let query = "INSERT INTO notifications (id, user_id, title, body, kind)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *";
        let notification = sqlx::query_as::<_, Notification>(query)
            .bind(Uuid::new_v4())
            .bind(new.user_id)
            .bind(new.title)
            .bind(new.body)
            .bind(new.kind.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(notification)
    }

    pub async fn list(&self, user_id: Uuid, unread_only: bool) -> Result<Vec<Notification>> {
        let mut builder =
            sqlx::QueryBuilder::new("SELECT * FROM notifications WHERE user_id = ");
        builder.push_bind(user_id);
        if unread_only {
            builder.push(" AND is_read = FALSE");
        }
        builder.push(" ORDER BY created_at DESC");
        let rows = builder
            .build_query_as::<Notification>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn mark_read(&self, id: Uuid, user_id: Uuid) -> Result<Option<Notification>> {
        let query = "UPDATE notifications
            SET is_read = TRUE
            WHERE id = $1 AND user_id = $2
            RETURNING *";
        let notification = sqlx::query_as::<_, Notification>(query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(notification)
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<u64> {
        let result =
            sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND is_read = FALSE")
                .bind(user_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
