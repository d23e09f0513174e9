use super::IExpertRepo;
use chrono::{DateTime, Utc};
use consultation_booking_domain::{Expert, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use std::convert::TryFrom;

pub struct PostgresExpertRepo {
    pool: PgPool,
}

impl PostgresExpertRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ExpertRaw {
    expert_uid: Uuid,
    name: String,
    email: String,
    expertise: String,
    status: String,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl TryFrom<ExpertRaw> for Expert {
    type Error = anyhow::Error;

    fn try_from(raw: ExpertRaw) -> anyhow::Result<Self> {
        Ok(Expert {
            id: raw.expert_uid.into(),
            name: raw.name,
            email: raw.email,
            expertise: raw.expertise,
            status: raw.status.parse().map_err(anyhow::Error::msg)?,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

fn into_experts(rows: Vec<ExpertRaw>) -> anyhow::Result<Vec<Expert>> {
    rows.into_iter().map(Expert::try_from).collect()
}

#[async_trait::async_trait]
impl IExpertRepo for PostgresExpertRepo {
    async fn insert(&self, expert: &Expert) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO experts(expert_uid, name, email, expertise, status, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(expert.id.inner_ref())
        .bind(&expert.name)
        .bind(&expert.email)
        .bind(&expert.expertise)
        .bind(expert.status.as_str())
        .bind(expert.created)
        .bind(expert.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, expert: &Expert) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE experts
            SET name = $2,
            email = $3,
            expertise = $4,
            status = $5,
            updated = $6
            WHERE expert_uid = $1
            "#,
        )
        .bind(expert.id.inner_ref())
        .bind(&expert.name)
        .bind(&expert.email)
        .bind(&expert.expertise)
        .bind(expert.status.as_str())
        .bind(expert.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, expert_id: &ID) -> anyhow::Result<Option<Expert>> {
        let raw: Option<ExpertRaw> = sqlx::query_as(
            r#"
            SELECT * FROM experts
            WHERE expert_uid = $1
            "#,
        )
        .bind(expert_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        raw.map(Expert::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Expert>> {
        let raw: Option<ExpertRaw> = sqlx::query_as(
            r#"
            SELECT * FROM experts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        raw.map(Expert::try_from).transpose()
    }

    async fn find_many(&self, skip: usize, limit: usize) -> anyhow::Result<Vec<Expert>> {
        let rows: Vec<ExpertRaw> = sqlx::query_as(
            r#"
            SELECT * FROM experts
            ORDER BY created ASC
            LIMIT $1
            OFFSET $2
            "#,
        )
        .bind(limit as i64)
        .bind(skip as i64)
        .fetch_all(&self.pool)
        .await?;

        into_experts(rows)
    }

    async fn find_by_expertise(&self, expertise: &str) -> anyhow::Result<Vec<Expert>> {
        let rows: Vec<ExpertRaw> = sqlx::query_as(
            r#"
            SELECT * FROM experts
            WHERE expertise = $1
            ORDER BY created ASC
            "#,
        )
        .bind(expertise)
        .fetch_all(&self.pool)
        .await?;

        into_experts(rows)
    }

    async fn delete(&self, expert_id: &ID) -> anyhow::Result<Option<Expert>> {
        let raw: Option<ExpertRaw> = sqlx::query_as(
            r#"
            DELETE FROM experts
            WHERE expert_uid = $1
            RETURNING *
            "#,
        )
        .bind(expert_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        raw.map(Expert::try_from).transpose()
    }
}
