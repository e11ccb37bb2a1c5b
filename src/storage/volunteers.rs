use uuid::Uuid;

use crate::models::{
    ApplicationStatus, NewApplication, NewOpportunity, VolunteerApplication, VolunteerOpportunity,
};
use crate::{AppError, Result};

#[derive(Clone)]
pub struct VolunteerStorage {
    pool: sqlx::PgPool,
}

impl VolunteerStorage {
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_opportunity(&self, new: NewOpportunity) -> Result<VolunteerOpportunity> {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM campaigns WHERE id = $1")
            .bind(new.campaign_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(AppError::not_found("Campaign"));
        }
        let query = "INSERT INTO volunteer_opportunities
            (id, campaign_id, title, description, location, slots, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *";
        let opportunity = sqlx::query_as::<_, VolunteerOpportunity>(query)
            .bind(Uuid::new_v4())
            .bind(new.campaign_id)
            .bind(new.title.trim())
            .bind(new.description)
            .bind(new.location)
            .bind(new.slots)
            .bind(new.starts_at)
            .bind(new.ends_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(opportunity)
    }

    pub async fn list_open(&self, campaign_id: Option<Uuid>) -> Result<Vec<VolunteerOpportunity>> {
        let mut builder = sqlx::QueryBuilder::new(
            "SELECT * FROM volunteer_opportunities WHERE status = 'open'",
        );
        if let Some(campaign_id) = campaign_id {
            builder.push(" AND campaign_id = ").push_bind(campaign_id);
        }
        builder.push(" ORDER BY starts_at");
        let rows = builder
            .build_query_as::<VolunteerOpportunity>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn apply(&self, new: NewApplication) -> Result<VolunteerApplication> {
        let opportunity = sqlx::query_as::<_, VolunteerOpportunity>(
            "SELECT * FROM volunteer_opportunities WHERE id = $1",
        )
        .bind(new.opportunity_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::not_found("Volunteer opportunity"))?;
        if opportunity.status != "open" || opportunity.slots_filled >= opportunity.slots {
            return Err(AppError::validation("Opportunity is no longer open"));
        }
        let query = "INSERT INTO volunteer_applications
            (id, opportunity_id, volunteer_id, intent)
            VALUES ($1, $2, $3, $4)
            RETURNING *";
        let application = sqlx::query_as::<_, VolunteerApplication>(query)
            .bind(Uuid::new_v4())
            .bind(new.opportunity_id)
            .bind(new.volunteer_id)
            .bind(new.intent)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(d) if d.is_unique_violation() => {
                    AppError::validation("Already applied to this opportunity")
                }
                _ => AppError::from(e),
            })?;
        Ok(application)
    }

    pub async fn list_applications(
        &self,
        opportunity_id: Uuid,
    ) -> Result<Vec<VolunteerApplication>> {
        let query = "SELECT * FROM volunteer_applications
            WHERE opportunity_id = $1 ORDER BY created_at";
        let rows = sqlx::query_as::<_, VolunteerApplication>(query)
            .bind(opportunity_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Review decision on a pending application. Accepting fills a slot and
    /// closes the opportunity once the last slot goes.
    pub async fn decide(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Option<VolunteerApplication>> {
        let mut tx = self.pool.begin().await?;
        let query = "UPDATE volunteer_applications
            SET status = $2
            WHERE id = $1 AND status = $3
            RETURNING *";
        let application = sqlx::query_as::<_, VolunteerApplication>(query)
            .bind(application_id)
            .bind(status.as_str())
            .bind(ApplicationStatus::Pending.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        let Some(application) = application else {
            return Ok(None);
        };
        if status == ApplicationStatus::Accepted {
            sqlx::query(
                "UPDATE volunteer_opportunities
                 SET slots_filled = slots_filled + 1,
                     status = CASE
                         WHEN slots_filled + 1 >= slots THEN 'closed'
                         ELSE status
                     END
                 WHERE id = $1",
            )
            .bind(application.opportunity_id)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(Some(application))
    }
}
