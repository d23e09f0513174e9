use crate::{
    booking::mark_missed_bookings::MarkMissedBookingsUseCase,
    shared::{deadline::bounded, usecase::execute},
};
use actix_web::rt::time::interval;
use consultation_booking_infra::BookingContext;
use std::time::Duration;
use tracing::{debug, error, info_span};
use tracing_futures::Instrument;

fn every(period: Duration) -> Duration {
    period.max(Duration::from_secs(1))
}

/// Periodically marks bookings whose session ended unresolved as missed
pub fn start_missed_bookings_job_scheduler(ctx: BookingContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(every(ctx.config.missed_bookings_sweep_interval));
        loop {
            interval.tick().await;

            // Errors are logged by the usecase executor
            let _ = execute(MarkMissedBookingsUseCase::default(), &ctx).await;
        }
    }
    .instrument(info_span!("missed_bookings_job")));
}

/// Periodically drops expired cache and lock entries from the key-value store
pub fn start_kv_purge_job_scheduler(ctx: BookingContext) {
    actix_web::rt::spawn(async move {
        let mut interval = interval(every(ctx.config.availability_cache_ttl));
        loop {
            interval.tick().await;

            match bounded(&ctx, ctx.repos.kv.purge_expired()).await {
                Ok(purged) => debug!(purged, "Purged expired key-value entries"),
                Err(e) => error!("Error purging expired key-value entries: {:?}", e),
            }
        }
    }
    .instrument(info_span!("kv_purge_job")));
}
