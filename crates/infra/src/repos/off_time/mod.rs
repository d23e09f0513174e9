mod inmemory;
mod postgres;

use chrono::NaiveDate;
use consultation_booking_domain::{OffTime, ID};
pub use inmemory::InMemoryOffTimeRepo;
pub use postgres::PostgresOffTimeRepo;

#[async_trait::async_trait]
pub trait IOffTimeRepo: Send + Sync {
    async fn insert(&self, off_time: &OffTime) -> anyhow::Result<()>;
    async fn find(&self, off_time_id: &ID) -> anyhow::Result<Option<OffTime>>;
    async fn find_by_expert(&self, expert_id: &ID) -> anyhow::Result<Vec<OffTime>>;
    /// Off times with `start_date <= date <= end_date`
    async fn find_covering_date(
        &self,
        expert_id: &ID,
        date: &NaiveDate,
    ) -> anyhow::Result<Vec<OffTime>>;
    async fn delete(&self, off_time_id: &ID) -> anyhow::Result<Option<OffTime>>;
}

#[cfg(test)]
mod tests {
    use crate::BookingContext;
    use chrono::{NaiveDate, Utc};
    use consultation_booking_domain::{OffTime, ID};

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    async fn covering(ctx: &BookingContext, expert_id: &ID, d: u32) -> Vec<OffTime> {
        ctx.repos
            .off_times
            .find_covering_date(expert_id, &date(d))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn finds_off_times_covering_a_date() {
        let ctx = BookingContext::create_inmemory();
        let expert_id = ID::new();
        let other_expert_id = ID::new();
        let vacation = OffTime::new(expert_id.clone(), date(2), date(6), None, Utc::now()).unwrap();
        let sick = OffTime::new(expert_id.clone(), date(10), date(10), None, Utc::now()).unwrap();
        let other =
            OffTime::new(other_expert_id.clone(), date(1), date(30), None, Utc::now()).unwrap();
        for off_time in [&vacation, &sick, &other] {
            assert!(ctx.repos.off_times.insert(off_time).await.is_ok());
        }

        assert!(covering(&ctx, &expert_id, 1).await.is_empty());
        assert_eq!(covering(&ctx, &expert_id, 2).await.len(), 1);
        assert_eq!(covering(&ctx, &expert_id, 6).await.len(), 1);
        assert!(covering(&ctx, &expert_id, 7).await.is_empty());
        assert_eq!(covering(&ctx, &expert_id, 10).await[0].id, sick.id);

        assert_eq!(
            ctx.repos
                .off_times
                .find_by_expert(&expert_id)
                .await
                .unwrap()
                .len(),
            2
        );

        let deleted = ctx.repos.off_times.delete(&vacation.id).await.unwrap();
        assert_eq!(deleted, Some(vacation.clone()));
        assert!(covering(&ctx, &expert_id, 3).await.is_empty());
        assert!(ctx.repos.off_times.find(&vacation.id).await.unwrap().is_none());
    }
}
