use crate::shared::deadline::bounded;
use chrono::{DateTime, Utc};
use consultation_booking_domain::{LocalInstant, ID};
use consultation_booking_infra::BookingContext;
use tracing::debug;

#[derive(Debug)]
pub enum ResolverError {
    ExpertNotFound(ID),
    Storage(anyhow::Error),
}

impl From<anyhow::Error> for ResolverError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(e)
    }
}

/// Decides whether the expert can be booked at `instant`, which is read
/// in the region timezone.
///
/// The cache only remembers whether the expert has an active schedule and
/// no off time on the local date. A cached `false` is final, a cached
/// `true` is always confirmed against the schedules.
pub async fn is_available(
    ctx: &BookingContext,
    expert_id: &ID,
    instant: &DateTime<Utc>,
) -> Result<bool, ResolverError> {
    let expert = bounded(ctx, ctx.repos.experts.find(expert_id))
        .await?
        .ok_or_else(|| ResolverError::ExpertNotFound(expert_id.clone()))?;
    if !expert.is_bookable() {
        return Ok(false);
    }

    let local = LocalInstant::from_utc(instant, &ctx.config.timezone);
    let cached = ctx.cache.get(expert_id, &local.date).await;
    if cached == Some(false) {
        debug!(expert_id = %expert_id, date = %local.date, "Unavailable according to cache");
        return Ok(false);
    }

    let off_times = bounded(
        ctx,
        ctx.repos.off_times.find_covering_date(expert_id, &local.date),
    )
    .await?;
    if !off_times.is_empty() {
        ctx.cache.set(expert_id, &local.date, false).await;
        return Ok(false);
    }

    let schedules = bounded(
        ctx,
        ctx.repos
            .schedules
            .find_active_by_expert_and_day(expert_id, local.day_of_week),
    )
    .await?;
    if schedules.is_empty() {
        ctx.cache.set(expert_id, &local.date, false).await;
        return Ok(false);
    }
    if cached.is_none() {
        ctx.cache.set(expert_id, &local.date, true).await;
    }

    Ok(schedules.iter().any(|s| s.covers(local.minute_of_day)))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{date, seed_expert, setup, utc};
    use consultation_booking_domain::{ExpertStatus, OffTime};

    #[actix_web::test]
    async fn closed_start_open_end() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;

        assert!(!is_available(&ctx, &expert.id, &utc(2025, 6, 2, 8, 59)).await.unwrap());
        assert!(is_available(&ctx, &expert.id, &utc(2025, 6, 2, 9, 0)).await.unwrap());
        assert!(is_available(&ctx, &expert.id, &utc(2025, 6, 2, 11, 59)).await.unwrap());
        assert!(!is_available(&ctx, &expert.id, &utc(2025, 6, 2, 12, 0)).await.unwrap());
        // Tuesday
        assert!(!is_available(&ctx, &expert.id, &utc(2025, 6, 3, 10, 0)).await.unwrap());
    }

    #[actix_web::test]
    async fn unknown_and_inactive_experts() {
        let (ctx, _) = setup();
        let res = is_available(&ctx, &ID::new(), &utc(2025, 6, 2, 10, 0)).await;
        assert!(matches!(res, Err(ResolverError::ExpertNotFound(_))));

        let mut expert = seed_expert(&ctx).await;
        expert.status = ExpertStatus::Inactive;
        ctx.repos.experts.save(&expert).await.unwrap();
        assert!(!is_available(&ctx, &expert.id, &utc(2025, 6, 2, 10, 0)).await.unwrap());
    }

    #[actix_web::test]
    async fn caches_date_level_hints() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;

        // Outside the window but the date itself is bookable
        assert!(!is_available(&ctx, &expert.id, &utc(2025, 6, 2, 8, 0)).await.unwrap());
        assert_eq!(ctx.cache.get(&expert.id, &date(2025, 6, 2)).await, Some(true));
        assert!(is_available(&ctx, &expert.id, &utc(2025, 6, 2, 10, 0)).await.unwrap());

        // No schedule at all on a Tuesday
        assert!(!is_available(&ctx, &expert.id, &utc(2025, 6, 3, 10, 0)).await.unwrap());
        assert_eq!(ctx.cache.get(&expert.id, &date(2025, 6, 3)).await, Some(false));
    }

    #[actix_web::test]
    async fn off_time_blocks_the_whole_date() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let off_time = OffTime::new(
            expert.id.clone(),
            date(2025, 6, 1),
            date(2025, 6, 2),
            Some("Vacation".into()),
            ctx.sys.now(),
        )
        .unwrap();
        ctx.repos.off_times.insert(&off_time).await.unwrap();

        assert!(!is_available(&ctx, &expert.id, &utc(2025, 6, 2, 10, 0)).await.unwrap());
        assert_eq!(ctx.cache.get(&expert.id, &date(2025, 6, 2)).await, Some(false));
    }

    #[actix_web::test]
    async fn cached_negatives_short_circuit() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        ctx.cache.set(&expert.id, &date(2025, 6, 2), false).await;
        assert!(!is_available(&ctx, &expert.id, &utc(2025, 6, 2, 10, 0)).await.unwrap());

        ctx.cache.invalidate_expert(&expert.id).await;
        assert!(is_available(&ctx, &expert.id, &utc(2025, 6, 2, 10, 0)).await.unwrap());
    }

    #[actix_web::test]
    async fn reads_instants_in_the_region_timezone() {
        let (mut ctx, _) = setup();
        ctx.config.timezone = chrono_tz::Asia::Ho_Chi_Minh;
        let expert = seed_expert(&ctx).await;

        // 03:00 UTC is 10:00 in Ho Chi Minh City
        assert!(is_available(&ctx, &expert.id, &utc(2025, 6, 2, 3, 0)).await.unwrap());
        assert!(!is_available(&ctx, &expert.id, &utc(2025, 6, 2, 10, 0)).await.unwrap());
    }
}
