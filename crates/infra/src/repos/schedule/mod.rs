mod inmemory;
mod postgres;

use chrono::{DateTime, Utc};
use consultation_booking_domain::{Schedule, ID};
pub use inmemory::InMemoryScheduleRepo;
pub use postgres::PostgresScheduleRepo;

#[async_trait::async_trait]
pub trait IScheduleRepo: Send + Sync {
    async fn insert(&self, schedule: &Schedule) -> anyhow::Result<()>;
    async fn save(&self, schedule: &Schedule) -> anyhow::Result<()>;
    async fn find(&self, schedule_id: &ID) -> anyhow::Result<Option<Schedule>>;
    /// Active and deactivated schedules of the expert
    async fn find_by_expert(&self, expert_id: &ID) -> anyhow::Result<Vec<Schedule>>;
    async fn find_active_by_expert_and_day(
        &self,
        expert_id: &ID,
        day_of_week: u8,
    ) -> anyhow::Result<Vec<Schedule>>;
    /// Soft delete, returns the deactivated schedule
    async fn deactivate(
        &self,
        schedule_id: &ID,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<Schedule>>;
}

#[cfg(test)]
mod tests {
    use crate::BookingContext;
    use chrono::Utc;
    use consultation_booking_domain::{Expert, Schedule, ID};

    fn schedule(expert_id: &ID, dow: i64, start: &str, end: &str) -> Schedule {
        Schedule::new(
            expert_id.clone(),
            dow,
            start.parse().unwrap(),
            end.parse().unwrap(),
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn create_find_and_deactivate() {
        let ctx = BookingContext::create_inmemory();
        let expert = Expert::new("a".into(), "a@x.io".into(), "law".into(), Utc::now());
        ctx.repos.experts.insert(&expert).await.unwrap();

        let monday = schedule(&expert.id, 1, "09:00", "12:00");
        let monday_afternoon = schedule(&expert.id, 1, "13:00", "17:00");
        let tuesday = schedule(&expert.id, 2, "09:00", "12:00");
        for s in [&monday, &monday_afternoon, &tuesday] {
            assert!(ctx.repos.schedules.insert(s).await.is_ok());
        }

        let res = ctx.repos.schedules.find(&monday.id).await.unwrap();
        assert_eq!(res, Some(monday.clone()));
        assert_eq!(
            ctx.repos
                .schedules
                .find_by_expert(&expert.id)
                .await
                .unwrap()
                .len(),
            3
        );
        let res = ctx
            .repos
            .schedules
            .find_active_by_expert_and_day(&expert.id, 1)
            .await
            .unwrap();
        assert_eq!(res.len(), 2);

        let deactivated = ctx
            .repos
            .schedules
            .deactivate(&monday.id, Utc::now())
            .await
            .unwrap()
            .unwrap();
        assert!(!deactivated.is_active);

        let res = ctx
            .repos
            .schedules
            .find_active_by_expert_and_day(&expert.id, 1)
            .await
            .unwrap();
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].id, monday_afternoon.id);
        // Soft deleted schedules are still listed
        assert_eq!(
            ctx.repos
                .schedules
                .find_by_expert(&expert.id)
                .await
                .unwrap()
                .len(),
            3
        );
        assert!(ctx
            .repos
            .schedules
            .deactivate(&ID::new(), Utc::now())
            .await
            .unwrap()
            .is_none());
    }
}
