use super::IStatusHistoryRepo;
use chrono::{DateTime, Utc};
use consultation_booking_domain::{StatusHistory, ID};
use sqlx::{types::Uuid, FromRow, PgExecutor, PgPool};
use std::convert::TryFrom;

pub struct PostgresStatusHistoryRepo {
    pool: PgPool,
}

impl PostgresStatusHistoryRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StatusHistoryRaw {
    status_history_uid: Uuid,
    booking_uid: Uuid,
    from_status: Option<String>,
    to_status: String,
    actor_uid: Uuid,
    actor_role: String,
    note: Option<String>,
    reason: Option<String>,
    created: DateTime<Utc>,
}

impl TryFrom<StatusHistoryRaw> for StatusHistory {
    type Error = anyhow::Error;

    fn try_from(raw: StatusHistoryRaw) -> anyhow::Result<Self> {
        let from_status = match raw.from_status {
            Some(status) => Some(status.parse().map_err(anyhow::Error::msg)?),
            None => None,
        };
        Ok(StatusHistory {
            id: raw.status_history_uid.into(),
            booking_id: raw.booking_uid.into(),
            from_status,
            to_status: raw.to_status.parse().map_err(anyhow::Error::msg)?,
            actor_id: raw.actor_uid.into(),
            actor_role: raw.actor_role.parse().map_err(anyhow::Error::msg)?,
            note: raw.note,
            reason: raw.reason,
            created: raw.created,
        })
    }
}

/// Shared with the booking repo so history rows can be written inside
/// the same transaction as the booking they describe
pub(crate) async fn insert_history<'e, E: PgExecutor<'e>>(
    executor: E,
    history: &StatusHistory,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO status_histories(status_history_uid, booking_uid, from_status, to_status, actor_uid, actor_role, note, reason, created)
        VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(history.id.inner_ref())
    .bind(history.booking_id.inner_ref())
    .bind(history.from_status.map(|s| s.as_str()))
    .bind(history.to_status.as_str())
    .bind(history.actor_id.inner_ref())
    .bind(history.actor_role.as_str())
    .bind(&history.note)
    .bind(&history.reason)
    .bind(history.created)
    .execute(executor)
    .await?;

    Ok(())
}

#[async_trait::async_trait]
impl IStatusHistoryRepo for PostgresStatusHistoryRepo {
    async fn insert(&self, history: &StatusHistory) -> anyhow::Result<()> {
        insert_history(&self.pool, history).await?;
        Ok(())
    }

    async fn find_by_booking(&self, booking_id: &ID) -> anyhow::Result<Vec<StatusHistory>> {
        let rows: Vec<StatusHistoryRaw> = sqlx::query_as(
            r#"
            SELECT * FROM status_histories
            WHERE booking_uid = $1
            ORDER BY created ASC
            "#,
        )
        .bind(booking_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(StatusHistory::try_from).collect()
    }
}
