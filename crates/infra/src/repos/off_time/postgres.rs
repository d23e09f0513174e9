use super::IOffTimeRepo;
use chrono::{DateTime, NaiveDate, Utc};
use consultation_booking_domain::{OffTime, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresOffTimeRepo {
    pool: PgPool,
}

impl PostgresOffTimeRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct OffTimeRaw {
    off_time_uid: Uuid,
    expert_uid: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: Option<String>,
    created: DateTime<Utc>,
}

impl From<OffTimeRaw> for OffTime {
    fn from(raw: OffTimeRaw) -> Self {
        OffTime {
            id: raw.off_time_uid.into(),
            expert_id: raw.expert_uid.into(),
            start_date: raw.start_date,
            end_date: raw.end_date,
            reason: raw.reason,
            created: raw.created,
        }
    }
}

#[async_trait::async_trait]
impl IOffTimeRepo for PostgresOffTimeRepo {
    async fn insert(&self, off_time: &OffTime) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO off_times(off_time_uid, expert_uid, start_date, end_date, reason, created)
            VALUES($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(off_time.id.inner_ref())
        .bind(off_time.expert_id.inner_ref())
        .bind(off_time.start_date)
        .bind(off_time.end_date)
        .bind(&off_time.reason)
        .bind(off_time.created)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, off_time_id: &ID) -> anyhow::Result<Option<OffTime>> {
        let raw: Option<OffTimeRaw> = sqlx::query_as(
            r#"
            SELECT * FROM off_times
            WHERE off_time_uid = $1
            "#,
        )
        .bind(off_time_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw.map(OffTime::from))
    }

    async fn find_by_expert(&self, expert_id: &ID) -> anyhow::Result<Vec<OffTime>> {
        let rows: Vec<OffTimeRaw> = sqlx::query_as(
            r#"
            SELECT * FROM off_times
            WHERE expert_uid = $1
            ORDER BY start_date
            "#,
        )
        .bind(expert_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OffTime::from).collect())
    }

    async fn find_covering_date(
        &self,
        expert_id: &ID,
        date: &NaiveDate,
    ) -> anyhow::Result<Vec<OffTime>> {
        let rows: Vec<OffTimeRaw> = sqlx::query_as(
            r#"
            SELECT * FROM off_times
            WHERE expert_uid = $1 AND start_date <= $2 AND end_date >= $2
            "#,
        )
        .bind(expert_id.inner_ref())
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(OffTime::from).collect())
    }

    async fn delete(&self, off_time_id: &ID) -> anyhow::Result<Option<OffTime>> {
        let raw: Option<OffTimeRaw> = sqlx::query_as(
            r#"
            DELETE FROM off_times
            WHERE off_time_uid = $1
            RETURNING *
            "#,
        )
        .bind(off_time_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw.map(OffTime::from))
    }
}
