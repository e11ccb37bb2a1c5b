use uuid::Uuid;

use crate::models::{
    NewReply, NewTicket, SupportTicket, TicketReply, TicketStatus, TicketWithReplies,
};
use crate::{AppError, Result};

#[derive(Clone)]
pub struct TicketStorage {
    pool: sqlx::PgPool,
}

impl TicketStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewTicket) -> Result<SupportTicket> {
        let query = "INSERT INTO support_tickets (id, user_id, subject, category, body)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *";
        let ticket = sqlx::query_as::<_, SupportTicket>(query)
            .bind(Uuid::new_v4())
            .bind(new.user_id)
            .bind(new.subject.trim())
            .bind(new.category)
            .bind(new.body)
            .fetch_one(&self.pool)
            .await?;
        Ok(ticket)
    }

    pub async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<SupportTicket>> {
        let mut builder = sqlx::QueryBuilder::new("SELECT * FROM support_tickets WHERE TRUE");
        if let Some(user_id) = user_id {
            builder.push(" AND user_id = ").push_bind(user_id);
        }
        builder.push(" ORDER BY updated_at DESC");
        let rows = builder
            .build_query_as::<SupportTicket>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_with_replies(&self, id: Uuid) -> Result<Option<TicketWithReplies>> {
        let ticket = sqlx::query_as::<_, SupportTicket>("SELECT * FROM support_tickets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        let Some(ticket) = ticket else {
            return Ok(None);
        };
        let replies = sqlx::query_as::<_, TicketReply>(
            "SELECT * FROM ticket_replies WHERE ticket_id = $1 ORDER BY created_at",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(Some(TicketWithReplies { ticket, replies }))
    }

    /// Appends to the thread. A requester reply reopens a resolved ticket;
    /// a staff reply on a fresh ticket moves it to in_progress.
    pub async fn add_reply(&self, ticket_id: Uuid, new: NewReply) -> Result<TicketReply> {
        let mut tx = self.pool.begin().await?;
        let ticket = sqlx::query_as::<_, SupportTicket>("SELECT * FROM support_tickets WHERE id = $1")
            .bind(ticket_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::not_found("Ticket"))?;
        if ticket.status == TicketStatus::Closed.as_str() {
            return Err(AppError::validation("Ticket is closed"));
        }
        let reply = sqlx::query_as::<_, TicketReply>(
            "INSERT INTO ticket_replies (id, ticket_id, author_id, body)
             VALUES ($1, $2, $3, $4)
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(ticket_id)
        .bind(new.author_id)
        .bind(new.body)
        .fetch_one(&mut *tx)
        .await?;
        let from_requester = new.author_id == ticket.user_id;
        let next_status = if from_requester && ticket.status == TicketStatus::Resolved.as_str() {
            Some(TicketStatus::Open)
        } else if !from_requester && ticket.status == TicketStatus::Open.as_str() {
            Some(TicketStatus::InProgress)
        } else {
            None
        };
        match next_status {
            Some(status) => {
                sqlx::query(
                    "UPDATE support_tickets SET status = $2, updated_at = now() WHERE id = $1",
                )
                .bind(ticket_id)
                .bind(status.as_str())
                .execute(&mut *tx)
                .await?;
            }
            None => {
                sqlx::query("UPDATE support_tickets SET updated_at = now() WHERE id = $1")
                    .bind(ticket_id)
                    .execute(&mut *tx)
                    .await?;
            }
        }
        tx.commit().await?;
        Ok(reply)
    }

    pub async fn set_status(
        &self,
        id: Uuid,
        status: TicketStatus,
    ) -> Result<Option<SupportTicket>> {
        let query = "UPDATE support_tickets
            SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING *";
        let ticket = sqlx::query_as::<_, SupportTicket>(query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(ticket)
    }
}
