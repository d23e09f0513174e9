use super::change_booking_status::ChangeBookingStatusUseCase;
use crate::shared::{
    deadline::bounded,
    usecase::{execute, UseCase},
};
use consultation_booking_domain::{Actor, BookingStatus};
use consultation_booking_infra::BookingContext;
use tracing::{info, warn};

/// Moves slot holding bookings whose session is over to `missed`
#[derive(Debug)]
pub struct MarkMissedBookingsUseCase {
    pub batch_size: usize,
}

impl Default for MarkMissedBookingsUseCase {
    fn default() -> Self {
        Self { batch_size: 100 }
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    Storage(anyhow::Error),
}

#[async_trait::async_trait(?Send)]
impl UseCase for MarkMissedBookingsUseCase {
    /// Number of bookings marked as missed
    type Response = usize;

    type Error = UseCaseError;

    const NAME: &'static str = "MarkMissedBookings";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let ended = bounded(
            ctx,
            ctx.repos
                .bookings
                .find_ended_unresolved(ctx.sys.now(), self.batch_size),
        )
        .await
        .map_err(UseCaseError::Storage)?;

        let mut marked = 0;
        for booking in ended {
            let usecase = ChangeBookingStatusUseCase {
                actor: Actor::system(),
                booking_id: booking.id.clone(),
                to: BookingStatus::Missed,
                note: Some("Session ended without being resolved".into()),
                reason: None,
                meeting_link: None,
            };
            match execute(usecase, ctx).await {
                Ok(_) => marked += 1,
                Err(e) => warn!(
                    booking_id = %booking.id,
                    "Could not mark booking as missed: {:?}", e
                ),
            }
        }
        if marked > 0 {
            info!(marked, "Marked bookings as missed");
        }

        Ok(marked)
    }
}
