mod inmemory;
mod postgres;

use crate::repos::shared::query_structs::{BookingCount, BookingPage, BookingQuery, WriteOutcome};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use consultation_booking_domain::{Booking, BookingStatus, StatusHistory, TimeSpan, ID};
pub use inmemory::InMemoryBookingRepo;
pub use postgres::PostgresBookingRepo;

/// Conflict checks only consider bookings that hold their slot
/// (`pending` or `confirmed`) and use the half-open overlap test
/// `existing.start < probe.end AND existing.end > probe.start`.
#[async_trait::async_trait]
pub trait IBookingRepo: Send + Sync {
    async fn insert(&self, booking: &Booking) -> anyhow::Result<()>;
    async fn save(&self, booking: &Booking) -> anyhow::Result<()>;
    async fn find(&self, booking_id: &ID) -> anyhow::Result<Option<Booking>>;
    async fn find_by_expert(
        &self,
        expert_id: &ID,
        query: &BookingQuery,
    ) -> anyhow::Result<BookingPage>;
    async fn find_by_user(&self, user_id: &ID, query: &BookingQuery)
        -> anyhow::Result<BookingPage>;
    /// Bookings starting on the given local date, earliest first
    async fn find_by_expert_on_date(
        &self,
        expert_id: &ID,
        date: &NaiveDate,
        tz: &Tz,
    ) -> anyhow::Result<Vec<Booking>>;
    async fn has_expert_conflict(
        &self,
        expert_id: &ID,
        span: &TimeSpan,
        exclude: Option<&ID>,
    ) -> anyhow::Result<bool>;
    async fn has_user_conflict(
        &self,
        user_id: &ID,
        span: &TimeSpan,
        exclude: Option<&ID>,
    ) -> anyhow::Result<bool>;
    async fn find_expert_conflicts(
        &self,
        expert_id: &ID,
        span: &TimeSpan,
        exclude: Option<&ID>,
    ) -> anyhow::Result<Vec<Booking>>;
    /// Atomically re-checks both conflict predicates and writes the booking
    /// together with its first history entry
    async fn insert_with_history(
        &self,
        booking: &Booking,
        history: &StatusHistory,
    ) -> anyhow::Result<WriteOutcome>;
    /// Atomically writes the booking and a history entry, provided the stored
    /// status still equals `expected_status`. With `recheck_conflicts` the
    /// new time range is also checked against other bookings.
    async fn save_with_history(
        &self,
        booking: &Booking,
        expected_status: BookingStatus,
        history: &StatusHistory,
        recheck_conflicts: bool,
    ) -> anyhow::Result<WriteOutcome>;
    /// Slot holding bookings whose end lies before `before`
    async fn find_ended_unresolved(
        &self,
        before: DateTime<Utc>,
        limit: usize,
    ) -> anyhow::Result<Vec<Booking>>;
    async fn count_by_expert(&self, expert_id: &ID) -> anyhow::Result<Vec<BookingCount>>;
}

#[cfg(test)]
mod tests {
    use crate::{BookingContext, BookingQuery, WriteOutcome};
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
    use consultation_booking_domain::{
        Actor, ActorRole, Booking, BookingDetails, BookingMode, BookingStatus, StatusHistory,
        TimeSpan, ID,
    };

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, minute, 0).unwrap()
    }

    fn booking(expert_id: &ID, user_id: &ID, start: DateTime<Utc>, minutes: i64) -> Booking {
        let span = TimeSpan::new(start, start + Duration::minutes(minutes)).unwrap();
        let details = BookingDetails {
            mode: BookingMode::Online,
            location: None,
            meeting_link: None,
            notes: None,
        };
        Booking::new(expert_id.clone(), user_id.clone(), &span, details, at(0, 0))
    }

    fn created(booking: &Booking) -> StatusHistory {
        let actor = Actor::new(booking.user_id.clone(), ActorRole::User);
        StatusHistory::new(
            booking.id.clone(),
            None,
            BookingStatus::Pending,
            &actor,
            at(0, 0),
        )
    }

    #[tokio::test]
    async fn detects_half_open_conflicts() {
        let ctx = BookingContext::create_inmemory();
        let expert_id = ID::new();
        let user_id = ID::new();
        let existing = booking(&expert_id, &user_id, at(10, 0), 30);
        ctx.repos.bookings.insert(&existing).await.unwrap();

        let probe = |h, m, minutes| TimeSpan::new(at(h, m), at(h, m) + Duration::minutes(minutes)).unwrap();
        let repo = &ctx.repos.bookings;
        assert!(repo.has_expert_conflict(&expert_id, &probe(10, 15, 30), None).await.unwrap());
        assert!(repo.has_expert_conflict(&expert_id, &probe(9, 45, 30), None).await.unwrap());
        assert!(!repo.has_expert_conflict(&expert_id, &probe(10, 30, 30), None).await.unwrap());
        assert!(!repo.has_expert_conflict(&expert_id, &probe(9, 30, 30), None).await.unwrap());
        assert!(!repo.has_expert_conflict(&ID::new(), &probe(10, 0, 30), None).await.unwrap());
        assert!(repo.has_user_conflict(&user_id, &probe(10, 0, 15), None).await.unwrap());
        assert!(!repo
            .has_expert_conflict(&expert_id, &probe(10, 0, 30), Some(&existing.id))
            .await
            .unwrap());

        // Terminal bookings free their slot
        let mut cancelled = existing.clone();
        cancelled.status = BookingStatus::Cancelled;
        repo.save(&cancelled).await.unwrap();
        assert!(!repo.has_expert_conflict(&expert_id, &probe(10, 0, 30), None).await.unwrap());
        assert!(!repo.has_user_conflict(&user_id, &probe(10, 0, 30), None).await.unwrap());
    }

    #[tokio::test]
    async fn insert_with_history_rechecks_conflicts() {
        let ctx = BookingContext::create_inmemory();
        let expert_id = ID::new();
        let first = booking(&expert_id, &ID::new(), at(10, 0), 30);
        let res = ctx
            .repos
            .bookings
            .insert_with_history(&first, &created(&first))
            .await
            .unwrap();
        assert_eq!(res, WriteOutcome::Written);

        let second = booking(&expert_id, &ID::new(), at(10, 15), 30);
        let res = ctx
            .repos
            .bookings
            .insert_with_history(&second, &created(&second))
            .await
            .unwrap();
        assert_eq!(res, WriteOutcome::ExpertConflict);

        let same_user = booking(&ID::new(), &first.user_id, at(10, 0), 60);
        let res = ctx
            .repos
            .bookings
            .insert_with_history(&same_user, &created(&same_user))
            .await
            .unwrap();
        assert_eq!(res, WriteOutcome::UserConflict);

        assert!(ctx.repos.bookings.find(&second.id).await.unwrap().is_none());
        assert!(ctx
            .repos
            .status_histories
            .find_by_booking(&second.id)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            ctx.repos
                .status_histories
                .find_by_booking(&first.id)
                .await
                .unwrap()
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn save_with_history_compares_status() {
        let ctx = BookingContext::create_inmemory();
        let original = booking(&ID::new(), &ID::new(), at(10, 0), 30);
        ctx.repos
            .bookings
            .insert_with_history(&original, &created(&original))
            .await
            .unwrap();

        let expert = Actor::new(original.expert_id.clone(), ActorRole::Expert);
        let mut confirmed = original.clone();
        confirmed.status = BookingStatus::Confirmed;
        let history = StatusHistory::new(
            original.id.clone(),
            Some(BookingStatus::Pending),
            BookingStatus::Confirmed,
            &expert,
            at(1, 0),
        );
        let res = ctx
            .repos
            .bookings
            .save_with_history(&confirmed, BookingStatus::Pending, &history, false)
            .await
            .unwrap();
        assert_eq!(res, WriteOutcome::Written);

        // A second writer that still believes the booking is pending loses
        let mut rejected = original.clone();
        rejected.status = BookingStatus::Rejected;
        let res = ctx
            .repos
            .bookings
            .save_with_history(&rejected, BookingStatus::Pending, &history, false)
            .await
            .unwrap();
        assert_eq!(res, WriteOutcome::StaleStatus);

        let stored = ctx.repos.bookings.find(&original.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        let histories = ctx
            .repos
            .status_histories
            .find_by_booking(&original.id)
            .await
            .unwrap();
        assert_eq!(histories.len(), 2);
        assert_eq!(histories[1].to_status, BookingStatus::Confirmed);

        let unknown = booking(&ID::new(), &ID::new(), at(10, 0), 30);
        let res = ctx
            .repos
            .bookings
            .save_with_history(&unknown, BookingStatus::Pending, &history, false)
            .await
            .unwrap();
        assert_eq!(res, WriteOutcome::Missing);
    }

    #[tokio::test]
    async fn lists_filters_and_counts() {
        let ctx = BookingContext::create_inmemory();
        let expert_id = ID::new();
        let user_id = ID::new();
        let mut morning = booking(&expert_id, &user_id, at(9, 0), 30);
        let noon = booking(&expert_id, &ID::new(), at(12, 0), 60);
        let next_day = booking(&expert_id, &user_id, at(10, 0) + Duration::days(1), 30);
        morning.status = BookingStatus::Confirmed;
        for b in [&morning, &noon, &next_day] {
            ctx.repos.bookings.insert(b).await.unwrap();
        }

        let page = ctx
            .repos
            .bookings
            .find_by_expert(&expert_id, &BookingQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.bookings[0].id, next_day.id);

        let query = BookingQuery {
            status: Some(BookingStatus::Pending),
            limit: 1,
            ..Default::default()
        };
        let page = ctx.repos.bookings.find_by_expert(&expert_id, &query).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.bookings.len(), 1);

        let page = ctx
            .repos
            .bookings
            .find_by_user(&user_id, &BookingQuery::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        let on_date = ctx
            .repos
            .bookings
            .find_by_expert_on_date(
                &expert_id,
                &NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
                &chrono_tz::UTC,
            )
            .await
            .unwrap();
        assert_eq!(
            on_date.iter().map(|b| b.id.clone()).collect::<Vec<_>>(),
            vec![morning.id.clone(), noon.id.clone()]
        );

        let ended = ctx
            .repos
            .bookings
            .find_ended_unresolved(at(13, 0), 10)
            .await
            .unwrap();
        assert_eq!(ended.len(), 2);

        let counts = ctx.repos.bookings.count_by_expert(&expert_id).await.unwrap();
        let pending = counts
            .iter()
            .filter(|c| c.status == BookingStatus::Pending)
            .map(|c| c.count)
            .sum::<i64>();
        assert_eq!(pending, 2);
    }
}
