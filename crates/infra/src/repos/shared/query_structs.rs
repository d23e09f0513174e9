use chrono::{DateTime, Utc};
use consultation_booking_domain::{Booking, BookingMode, BookingStatus};

/// Filter and page for booking listings. Results are ordered by
/// `start_time`, latest first.
#[derive(Debug, Clone)]
pub struct BookingQuery {
    pub status: Option<BookingStatus>,
    pub mode: Option<BookingMode>,
    /// Inclusive lower bound on `start_time`
    pub start_from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `start_time`
    pub start_until: Option<DateTime<Utc>>,
    pub skip: usize,
    pub limit: usize,
}

impl Default for BookingQuery {
    fn default() -> Self {
        Self {
            status: None,
            mode: None,
            start_from: None,
            start_until: None,
            skip: 0,
            limit: 20,
        }
    }
}

impl BookingQuery {
    pub fn matches(&self, booking: &Booking) -> bool {
        self.status.map_or(true, |s| booking.status == s)
            && self.mode.map_or(true, |m| booking.mode == m)
            && self.start_from.map_or(true, |from| booking.start_time >= from)
            && self.start_until.map_or(true, |until| booking.start_time < until)
    }
}

#[derive(Debug, Clone)]
pub struct BookingPage {
    pub bookings: Vec<Booking>,
    /// Number of bookings matching the filter, ignoring the page
    pub total: usize,
}

/// Number of bookings an expert has per status and mode
#[derive(Debug, Clone, PartialEq)]
pub struct BookingCount {
    pub status: BookingStatus,
    pub mode: BookingMode,
    pub count: i64,
}

/// Result of a booking write that re-validates under a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The expert already holds an overlapping booking
    ExpertConflict,
    /// The user already holds an overlapping booking
    UserConflict,
    /// The booking was moved to another status by a concurrent writer
    StaleStatus,
    /// The booking no longer exists
    Missing,
}
