use super::IScheduleRepo;
use chrono::{DateTime, Utc};
use consultation_booking_domain::{MinuteOfDay, Schedule, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::warn;

pub struct PostgresScheduleRepo {
    pool: PgPool,
}

impl PostgresScheduleRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ScheduleRaw {
    schedule_uid: Uuid,
    expert_uid: Uuid,
    day_of_week: i16,
    start_time: String,
    end_time: String,
    is_active: bool,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl ScheduleRaw {
    /// Rows with malformed times of day are treated as absent
    fn into_schedule(self) -> Option<Schedule> {
        let start = self.start_time.parse::<MinuteOfDay>();
        let end = self.end_time.parse::<MinuteOfDay>();
        let (start, end) = match (start, end) {
            (Ok(start), Ok(end)) if start < end && (0..=6).contains(&self.day_of_week) => {
                (start, end)
            }
            _ => {
                warn!(
                    schedule_id = %self.schedule_uid,
                    start_time = %self.start_time,
                    end_time = %self.end_time,
                    "Skipping schedule with a malformed window"
                );
                return None;
            }
        };

        Some(Schedule {
            id: self.schedule_uid.into(),
            expert_id: self.expert_uid.into(),
            day_of_week: self.day_of_week as u8,
            start,
            end,
            is_active: self.is_active,
            created: self.created,
            updated: self.updated,
        })
    }
}

fn into_schedules(rows: Vec<ScheduleRaw>) -> Vec<Schedule> {
    rows.into_iter().filter_map(ScheduleRaw::into_schedule).collect()
}

#[async_trait::async_trait]
impl IScheduleRepo for PostgresScheduleRepo {
    async fn insert(&self, schedule: &Schedule) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO schedules(schedule_uid, expert_uid, day_of_week, start_time, end_time, is_active, created, updated)
            VALUES($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(schedule.id.inner_ref())
        .bind(schedule.expert_id.inner_ref())
        .bind(schedule.day_of_week as i16)
        .bind(schedule.start.to_string())
        .bind(schedule.end.to_string())
        .bind(schedule.is_active)
        .bind(schedule.created)
        .bind(schedule.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, schedule: &Schedule) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE schedules
            SET day_of_week = $2,
            start_time = $3,
            end_time = $4,
            is_active = $5,
            updated = $6
            WHERE schedule_uid = $1
            "#,
        )
        .bind(schedule.id.inner_ref())
        .bind(schedule.day_of_week as i16)
        .bind(schedule.start.to_string())
        .bind(schedule.end.to_string())
        .bind(schedule.is_active)
        .bind(schedule.updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, schedule_id: &ID) -> anyhow::Result<Option<Schedule>> {
        let raw: Option<ScheduleRaw> = sqlx::query_as(
            r#"
            SELECT * FROM schedules
            WHERE schedule_uid = $1
            "#,
        )
        .bind(schedule_id.inner_ref())
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw.and_then(ScheduleRaw::into_schedule))
    }

    async fn find_by_expert(&self, expert_id: &ID) -> anyhow::Result<Vec<Schedule>> {
        let rows: Vec<ScheduleRaw> = sqlx::query_as(
            r#"
            SELECT * FROM schedules
            WHERE expert_uid = $1
            ORDER BY day_of_week, start_time
            "#,
        )
        .bind(expert_id.inner_ref())
        .fetch_all(&self.pool)
        .await?;

        Ok(into_schedules(rows))
    }

    async fn find_active_by_expert_and_day(
        &self,
        expert_id: &ID,
        day_of_week: u8,
    ) -> anyhow::Result<Vec<Schedule>> {
        let rows: Vec<ScheduleRaw> = sqlx::query_as(
            r#"
            SELECT * FROM schedules
            WHERE expert_uid = $1 AND day_of_week = $2 AND is_active
            "#,
        )
        .bind(expert_id.inner_ref())
        .bind(day_of_week as i16)
        .fetch_all(&self.pool)
        .await?;

        Ok(into_schedules(rows))
    }

    async fn deactivate(
        &self,
        schedule_id: &ID,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Schedule>> {
        let raw: Option<ScheduleRaw> = sqlx::query_as(
            r#"
            UPDATE schedules
            SET is_active = FALSE,
            updated = $2
            WHERE schedule_uid = $1
            RETURNING *
            "#,
        )
        .bind(schedule_id.inner_ref())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(raw.and_then(ScheduleRaw::into_schedule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(start: &str, end: &str) -> ScheduleRaw {
        ScheduleRaw {
            schedule_uid: Uuid::new_v4(),
            expert_uid: Uuid::new_v4(),
            day_of_week: 1,
            start_time: start.into(),
            end_time: end.into(),
            is_active: true,
            created: Utc::now(),
            updated: Utc::now(),
        }
    }

    #[test]
    fn skips_rows_with_malformed_windows() {
        let rows = vec![
            raw("09:00", "12:00"),
            raw("9am", "12:00"),
            raw("09:00", "25:00"),
            raw("12:00", "09:00"),
            raw("13:00:00", "17:30:00"),
        ];
        let schedules = into_schedules(rows);
        assert_eq!(schedules.len(), 2);
        assert_eq!(schedules[0].start.to_string(), "09:00");
        assert_eq!(schedules[1].end.to_string(), "17:30");
    }
}
