use super::IBookingRepo;
use crate::repos::{
    shared::query_structs::{BookingCount, BookingPage, BookingQuery, WriteOutcome},
    status_history::insert_history,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use consultation_booking_domain::{
    date::local_day_bounds, Booking, BookingStatus, StatusHistory, TimeSpan, ID,
};
use sqlx::{types::Uuid, FromRow, PgConnection, PgExecutor, PgPool};
use std::convert::TryFrom;

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct BookingRaw {
    booking_uid: Uuid,
    expert_uid: Uuid,
    user_uid: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    mode: String,
    status: String,
    location: Option<String>,
    meeting_link: Option<String>,
    notes: Option<String>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl TryFrom<BookingRaw> for Booking {
    type Error = anyhow::Error;

    fn try_from(raw: BookingRaw) -> anyhow::Result<Self> {
        Ok(Booking {
            id: raw.booking_uid.into(),
            expert_id: raw.expert_uid.into(),
            user_id: raw.user_uid.into(),
            start_time: raw.start_time,
            end_time: raw.end_time,
            mode: raw.mode.parse().map_err(anyhow::Error::msg)?,
            status: raw.status.parse().map_err(anyhow::Error::msg)?,
            location: raw.location,
            meeting_link: raw.meeting_link,
            notes: raw.notes,
            created: raw.created,
            updated: raw.updated,
        })
    }
}

fn into_bookings(rows: Vec<BookingRaw>) -> anyhow::Result<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

#[derive(Debug, FromRow)]
struct BookingCountRaw {
    status: String,
    mode: String,
    count: i64,
}

/// Which column a conflict or listing query is scoped by. Only these
/// two constants are ever interpolated into SQL.
#[derive(Clone, Copy)]
enum Owner {
    Expert,
    User,
}

impl Owner {
    fn column(&self) -> &'static str {
        match self {
            Self::Expert => "expert_uid",
            Self::User => "user_uid",
        }
    }

    /// First key of the two-key advisory lock, keeps expert and user
    /// locks in separate namespaces
    fn lock_namespace(&self) -> i32 {
        match self {
            Self::Expert => 1,
            Self::User => 2,
        }
    }
}

fn conflict_filter(owner: Owner) -> String {
    format!(
        r#"
        {} = $1
        AND status IN ('pending', 'confirmed')
        AND start_time < $3
        AND end_time > $2
        AND ($4::uuid IS NULL OR booking_uid <> $4)
        "#,
        owner.column()
    )
}

async fn has_conflict<'e, E: PgExecutor<'e>>(
    executor: E,
    owner: Owner,
    owner_id: &ID,
    span: &TimeSpan,
    exclude: Option<&ID>,
) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "SELECT EXISTS(SELECT 1 FROM bookings WHERE {})",
        conflict_filter(owner)
    );
    sqlx::query_scalar(&sql)
        .bind(owner_id.inner_ref())
        .bind(span.start())
        .bind(span.end())
        .bind(exclude.map(|id| *id.inner_ref()))
        .fetch_one(executor)
        .await
}

/// Serializes writers touching the same expert or user until the
/// surrounding transaction ends. Callers take the expert lock first.
async fn advisory_lock(conn: &mut PgConnection, owner: Owner, id: &ID) -> Result<(), sqlx::Error> {
    let bytes = id.inner_ref().as_bytes();
    let key = i32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(owner.lock_namespace())
        .bind(key)
        .execute(conn)
        .await?;
    Ok(())
}

async fn check_conflicts(
    conn: &mut PgConnection,
    booking: &Booking,
    exclude: Option<&ID>,
) -> Result<Option<WriteOutcome>, sqlx::Error> {
    advisory_lock(&mut *conn, Owner::Expert, &booking.expert_id).await?;
    advisory_lock(&mut *conn, Owner::User, &booking.user_id).await?;

    let span = booking.timespan();
    if has_conflict(&mut *conn, Owner::Expert, &booking.expert_id, &span, exclude).await? {
        return Ok(Some(WriteOutcome::ExpertConflict));
    }
    if has_conflict(&mut *conn, Owner::User, &booking.user_id, &span, exclude).await? {
        return Ok(Some(WriteOutcome::UserConflict));
    }
    Ok(None)
}

async fn insert_booking<'e, E: PgExecutor<'e>>(
    executor: E,
    booking: &Booking,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO bookings(booking_uid, expert_uid, user_uid, start_time, end_time, mode, status, location, meeting_link, notes, created, updated)
        VALUES($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(booking.id.inner_ref())
    .bind(booking.expert_id.inner_ref())
    .bind(booking.user_id.inner_ref())
    .bind(booking.start_time)
    .bind(booking.end_time)
    .bind(booking.mode.as_str())
    .bind(booking.status.as_str())
    .bind(&booking.location)
    .bind(&booking.meeting_link)
    .bind(&booking.notes)
    .bind(booking.created)
    .bind(booking.updated)
    .execute(executor)
    .await?;
    Ok(())
}

async fn update_booking<'e, E: PgExecutor<'e>>(
    executor: E,
    booking: &Booking,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE bookings
        SET start_time = $2,
        end_time = $3,
        mode = $4,
        status = $5,
        location = $6,
        meeting_link = $7,
        notes = $8,
        updated = $9
        WHERE booking_uid = $1
        "#,
    )
    .bind(booking.id.inner_ref())
    .bind(booking.start_time)
    .bind(booking.end_time)
    .bind(booking.mode.as_str())
    .bind(booking.status.as_str())
    .bind(&booking.location)
    .bind(&booking.meeting_link)
    .bind(&booking.notes)
    .bind(booking.updated)
    .execute(executor)
    .await?;
    Ok(())
}

impl PostgresBookingRepo {
    async fn page(
        &self,
        owner: Owner,
        owner_id: &ID,
        query: &BookingQuery,
    ) -> anyhow::Result<BookingPage> {
        let filter = format!(
            r#"
            {} = $1
            AND ($2::text IS NULL OR status = $2)
            AND ($3::text IS NULL OR mode = $3)
            AND ($4::timestamptz IS NULL OR start_time >= $4)
            AND ($5::timestamptz IS NULL OR start_time < $5)
            "#,
            owner.column()
        );

        let rows: Vec<BookingRaw> = sqlx::query_as(&format!(
            "SELECT * FROM bookings WHERE {} ORDER BY start_time DESC LIMIT $6 OFFSET $7",
            filter
        ))
        .bind(owner_id.inner_ref())
        .bind(query.status.map(|s| s.as_str()))
        .bind(query.mode.map(|m| m.as_str()))
        .bind(query.start_from)
        .bind(query.start_until)
        .bind(query.limit as i64)
        .bind(query.skip as i64)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM bookings WHERE {}", filter))
            .bind(owner_id.inner_ref())
            .bind(query.status.map(|s| s.as_str()))
            .bind(query.mode.map(|m| m.as_str()))
            .bind(query.start_from)
            .bind(query.start_until)
            .fetch_one(&self.pool)
            .await?;

        Ok(BookingPage {
            bookings: into_bookings(rows)?,
            total: total as usize,
        })
    }
}

#[async_trait::async_trait]
impl IBookingRepo for PostgresBookingRepo {
    async fn insert(&self, booking: &Booking) -> anyhow::Result<()> {
        insert_booking(&self.pool, booking).await?;
        Ok(())
    }

    async fn save(&self, booking: &Booking) -> anyhow::Result<()> {
        update_booking(&self.pool, booking).await?;
        Ok(())
    }

    async fn find(&self, booking_id: &ID) -> anyhow::Result<Option<Booking>> {
        let raw: Option<BookingRaw> = sqlx::query_as(
            r#"
            SELECT * FROM bookings
            WHERE booking_uid = $1
            "#,
        )
        .bind(booking_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        raw.map(Booking::try_from).transpose()
    }

    async fn find_by_expert(
        &self,
        expert_id: &ID,
        query: &BookingQuery,
    ) -> anyhow::Result<BookingPage> {
        self.page(Owner::Expert, expert_id, query).await
    }

    async fn find_by_user(
        &self,
        user_id: &ID,
        query: &BookingQuery,
    ) -> anyhow::Result<BookingPage> {
        self.page(Owner::User, user_id, query).await
    }

    async fn find_by_expert_on_date(
        &self,
        expert_id: &ID,
        date: &NaiveDate,
        tz: &Tz,
    ) -> anyhow::Result<Vec<Booking>> {
        let (day_start, day_end) = local_day_bounds(date, tz)
            .ok_or_else(|| anyhow::Error::msg(format!("Date {} has no local midnight", date)))?;
        let rows: Vec<BookingRaw> = sqlx::query_as(
            r#"
            SELECT * FROM bookings
            WHERE expert_uid = $1 AND start_time >= $2 AND start_time < $3
            ORDER BY start_time ASC
            "#,
        )
        .bind(expert_id.inner_ref())
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await?;

        into_bookings(rows)
    }

    async fn has_expert_conflict(
        &self,
        expert_id: &ID,
        span: &TimeSpan,
        exclude: Option<&ID>,
    ) -> anyhow::Result<bool> {
        Ok(has_conflict(&self.pool, Owner::Expert, expert_id, span, exclude).await?)
    }

    async fn has_user_conflict(
        &self,
        user_id: &ID,
        span: &TimeSpan,
        exclude: Option<&ID>,
    ) -> anyhow::Result<bool> {
        Ok(has_conflict(&self.pool, Owner::User, user_id, span, exclude).await?)
    }

    async fn find_expert_conflicts(
        &self,
        expert_id: &ID,
        span: &TimeSpan,
        exclude: Option<&ID>,
    ) -> anyhow::Result<Vec<Booking>> {
        let sql = format!(
            "SELECT * FROM bookings WHERE {} ORDER BY start_time ASC",
            conflict_filter(Owner::Expert)
        );
        let rows: Vec<BookingRaw> = sqlx::query_as(&sql)
            .bind(expert_id.inner_ref())
            .bind(span.start())
            .bind(span.end())
            .bind(exclude.map(|id| *id.inner_ref()))
            .fetch_all(&self.pool)
            .await?;

        into_bookings(rows)
    }

    async fn insert_with_history(
        &self,
        booking: &Booking,
        history: &StatusHistory,
    ) -> anyhow::Result<WriteOutcome> {
        let mut tx = self.pool.begin().await?;

        if let Some(conflict) = check_conflicts(&mut tx, booking, None).await? {
            tx.rollback().await?;
            return Ok(conflict);
        }
        insert_booking(&mut *tx, booking).await?;
        insert_history(&mut *tx, history).await?;

        tx.commit().await?;
        Ok(WriteOutcome::Written)
    }

    async fn save_with_history(
        &self,
        booking: &Booking,
        expected_status: BookingStatus,
        history: &StatusHistory,
        recheck_conflicts: bool,
    ) -> anyhow::Result<WriteOutcome> {
        let mut tx = self.pool.begin().await?;

        let stored_status: Option<String> = sqlx::query_scalar(
            r#"
            SELECT status FROM bookings
            WHERE booking_uid = $1
            FOR UPDATE
            "#,
        )
        .bind(booking.id.inner_ref())
        .fetch_optional(&mut *tx)
        .await?;

        let outcome = match stored_status {
            None => Some(WriteOutcome::Missing),
            Some(status) if status != expected_status.as_str() => Some(WriteOutcome::StaleStatus),
            Some(_) if recheck_conflicts && booking.status.occupies_slot() => {
                check_conflicts(&mut tx, booking, Some(&booking.id)).await?
            }
            Some(_) => None,
        };
        if let Some(outcome) = outcome {
            tx.rollback().await?;
            return Ok(outcome);
        }

        update_booking(&mut *tx, booking).await?;
        insert_history(&mut *tx, history).await?;

        tx.commit().await?;
        Ok(WriteOutcome::Written)
    }

    async fn find_ended_unresolved(
        &self,
        before: DateTime<Utc>,
        limit: usize,
    ) -> anyhow::Result<Vec<Booking>> {
        let rows: Vec<BookingRaw> = sqlx::query_as(
            r#"
            SELECT * FROM bookings
            WHERE status IN ('pending', 'confirmed') AND end_time < $1
            ORDER BY end_time ASC
            LIMIT $2
            "#,
        )
        .bind(before)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        into_bookings(rows)
    }

    async fn count_by_expert(&self, expert_id: &ID) -> anyhow::Result<Vec<BookingCount>> {
        let rows: Vec<BookingCountRaw> = sqlx::query_as(
            r#"
            SELECT status, mode, COUNT(*) AS count FROM bookings
            WHERE expert_uid = $1
            GROUP BY status, mode
            "#,
        )
        .bind(expert_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|raw| {
                Ok(BookingCount {
                    status: raw.status.parse::<BookingStatus>().map_err(anyhow::Error::msg)?,
                    mode: raw.mode.parse().map_err(anyhow::Error::msg)?,
                    count: raw.count,
                })
            })
            .collect()
    }
}
