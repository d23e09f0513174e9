use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use consultation_booking_domain::{
    Actor, ActorRole, Booking, BookingDetails, BookingMode, BookingStatus, Expert, MinuteOfDay,
    Schedule, StatusHistory, TimeSpan, ID,
};
use consultation_booking_infra::{BookingContext, IKVRepo, StaticTimeSys, WriteOutcome};
use std::{sync::Arc, time::Duration};

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Inmemory context in the UTC region with the clock frozen at
/// Sunday 2025-06-01 00:00
pub fn setup() -> (BookingContext, Arc<StaticTimeSys>) {
    let sys = Arc::new(StaticTimeSys::new(utc(2025, 6, 1, 0, 0)));
    let mut ctx = BookingContext::create_inmemory_with_sys(sys.clone());
    ctx.config.timezone = chrono_tz::UTC;
    (ctx, sys)
}

/// Active expert with a Monday 09:00 - 12:00 schedule
pub async fn seed_expert(ctx: &BookingContext) -> Expert {
    let now = ctx.sys.now();
    let email = format!("{}@example.com", ID::new());
    let expert = Expert::new("Ada".into(), email, "tax".into(), now);
    ctx.repos.experts.insert(&expert).await.unwrap();
    let schedule = Schedule::new(
        expert.id.clone(),
        1,
        MinuteOfDay::from_hm(9, 0).unwrap(),
        MinuteOfDay::from_hm(12, 0).unwrap(),
        now,
    )
    .unwrap();
    ctx.repos.schedules.insert(&schedule).await.unwrap();
    expert
}

/// Pending 30 minute online booking on Monday 2025-06-02 10:00
pub async fn seed_booking(ctx: &BookingContext, expert: &Expert, user: &Actor) -> Booking {
    seed_booking_at(ctx, expert, user, utc(2025, 6, 2, 10, 0)).await
}

pub async fn seed_booking_at(
    ctx: &BookingContext,
    expert: &Expert,
    user: &Actor,
    start: DateTime<Utc>,
) -> Booking {
    let now = ctx.sys.now();
    let span = TimeSpan::new(start, start + chrono::Duration::minutes(30)).unwrap();
    let details = BookingDetails {
        mode: BookingMode::Online,
        location: None,
        meeting_link: None,
        notes: None,
    };
    let booking = Booking::new(expert.id.clone(), user.id.clone(), &span, details, now);
    let history = StatusHistory::new(booking.id.clone(), None, BookingStatus::Pending, user, now);
    let outcome = ctx
        .repos
        .bookings
        .insert_with_history(&booking, &history)
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Written);
    booking
}

pub fn user() -> Actor {
    Actor::new(ID::new(), ActorRole::User)
}

pub fn admin() -> Actor {
    Actor::new(ID::new(), ActorRole::Admin)
}

pub fn expert_actor(expert: &Expert) -> Actor {
    Actor::new(expert.id.clone(), ActorRole::Expert)
}

/// Key-value store whose backend can not be reached
pub struct UnreachableKVRepo;

#[async_trait::async_trait]
impl IKVRepo for UnreachableKVRepo {
    async fn get(&self, _: &str) -> anyhow::Result<Option<String>> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn set(&self, _: &str, _: &str, _: Duration) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn set_nx(&self, _: &str, _: &str, _: Duration) -> anyhow::Result<bool> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn delete(&self, _: &str) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn delete_if_value(&self, _: &str, _: &str) -> anyhow::Result<bool> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn delete_by_prefix(&self, _: &str) -> anyhow::Result<u64> {
        Err(anyhow::anyhow!("connection refused"))
    }
    async fn purge_expired(&self) -> anyhow::Result<u64> {
        Err(anyhow::anyhow!("connection refused"))
    }
}
