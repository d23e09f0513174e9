use crate::{
    availability::resolver::{is_available, ResolverError},
    shared::deadline::bounded,
};
use consultation_booking_domain::{Booking, ID};
use consultation_booking_infra::{BookingContext, LockOutcome, WriteOutcome};
use std::future::Future;
use tracing::warn;

#[derive(Debug)]
pub(super) enum AdmissionError {
    ExpertNotFound(ID),
    ExpertConflict,
    UserConflict,
    OutsideSchedule,
    LockBusy,
    /// The booking changed status or vanished while being written
    Stale,
    Storage(anyhow::Error),
}

impl From<ResolverError> for AdmissionError {
    fn from(e: ResolverError) -> Self {
        match e {
            ResolverError::ExpertNotFound(id) => Self::ExpertNotFound(id),
            ResolverError::Storage(e) => Self::Storage(e),
        }
    }
}

/// Admits `booking` into its time slot and runs `write` once every check
/// passed.
///
/// The checks and the write happen while holding the slot lock. When the
/// lock store is unreachable admission continues without it, `write` is
/// expected to re-check both conflict predicates in its own transaction.
/// `exclude` leaves the booking itself out of the conflict checks.
pub(super) async fn admit<F>(
    ctx: &BookingContext,
    booking: &Booking,
    exclude: Option<&ID>,
    write: F,
) -> Result<(), AdmissionError>
where
    F: Future<Output = anyhow::Result<WriteOutcome>>,
{
    let span = booking.timespan();
    let guard = match ctx.locks.acquire(&booking.expert_id, &span).await {
        LockOutcome::Acquired(guard) => Some(guard),
        LockOutcome::Busy => return Err(AdmissionError::LockBusy),
        LockOutcome::Unavailable => {
            warn!(
                expert_id = %booking.expert_id,
                "Admission lock unavailable, relying on the transactional conflict check"
            );
            None
        }
    };

    let res = check_and_write(ctx, booking, exclude, write).await;

    if let Some(guard) = guard {
        ctx.locks.release(guard).await;
    }
    res
}

async fn check_and_write<F>(
    ctx: &BookingContext,
    booking: &Booking,
    exclude: Option<&ID>,
    write: F,
) -> Result<(), AdmissionError>
where
    F: Future<Output = anyhow::Result<WriteOutcome>>,
{
    let span = booking.timespan();
    let expert_busy = bounded(
        ctx,
        ctx.repos
            .bookings
            .has_expert_conflict(&booking.expert_id, &span, exclude),
    )
    .await
    .map_err(AdmissionError::Storage)?;
    if expert_busy {
        return Err(AdmissionError::ExpertConflict);
    }

    let user_busy = bounded(
        ctx,
        ctx.repos
            .bookings
            .has_user_conflict(&booking.user_id, &span, exclude),
    )
    .await
    .map_err(AdmissionError::Storage)?;
    if user_busy {
        return Err(AdmissionError::UserConflict);
    }

    if !is_available(ctx, &booking.expert_id, &booking.start_time).await? {
        return Err(AdmissionError::OutsideSchedule);
    }

    match bounded(ctx, write).await.map_err(AdmissionError::Storage)? {
        WriteOutcome::Written => Ok(()),
        WriteOutcome::ExpertConflict => Err(AdmissionError::ExpertConflict),
        WriteOutcome::UserConflict => Err(AdmissionError::UserConflict),
        WriteOutcome::StaleStatus | WriteOutcome::Missing => Err(AdmissionError::Stale),
    }
}
