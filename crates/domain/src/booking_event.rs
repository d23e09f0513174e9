use crate::{actor::Actor, booking::Booking, booking_status::BookingStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Emitted after a `Booking` was durably moved into a new status,
/// including its creation as `pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingStatusChanged {
    pub booking: Booking,
    pub from: Option<BookingStatus>,
    pub to: BookingStatus,
    pub actor: Actor,
    pub at: DateTime<Utc>,
}
