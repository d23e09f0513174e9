use crate::timespan::TimeSpan;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

/// Limits every booked time slot has to respect
#[derive(Debug, Clone)]
pub struct BookingRules {
    pub min_duration: Duration,
    pub max_duration: Duration,
    /// Durations must be a multiple of this
    pub granularity: Duration,
    /// How far into the future a booking may start
    pub max_lead: Duration,
    /// Non-admins can only cancel or update bookings starting at least
    /// this far from now
    pub cancel_lead: Duration,
}

impl Default for BookingRules {
    fn default() -> Self {
        Self {
            min_duration: Duration::minutes(15),
            max_duration: Duration::hours(4),
            granularity: Duration::minutes(15),
            max_lead: Duration::days(180),
            cancel_lead: Duration::hours(1),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SlotError {
    #[error("The booking must last at least {0} minutes")]
    TooShort(i64),
    #[error("The booking can not last longer than {0} minutes")]
    TooLong(i64),
    #[error("The booking duration must be a multiple of {0} minutes")]
    Misaligned(i64),
    #[error("The booking must start in the future")]
    StartsInPast,
    #[error("The booking can not start more than {0} days from now")]
    TooFarAhead(i64),
}

impl BookingRules {
    pub fn validate_slot(&self, slot: &TimeSpan, now: DateTime<Utc>) -> Result<(), SlotError> {
        let duration = slot.duration();
        if duration < self.min_duration {
            return Err(SlotError::TooShort(self.min_duration.num_minutes()));
        }
        if duration > self.max_duration {
            return Err(SlotError::TooLong(self.max_duration.num_minutes()));
        }
        let granularity = self.granularity.num_seconds();
        if granularity > 0 && duration.num_seconds() % granularity != 0 {
            return Err(SlotError::Misaligned(self.granularity.num_minutes()));
        }
        if slot.start() <= now {
            return Err(SlotError::StartsInPast);
        }
        if slot.start() > now + self.max_lead {
            return Err(SlotError::TooFarAhead(self.max_lead.num_days()));
        }
        Ok(())
    }

    /// `now + cancel_lead <= start`
    pub fn has_cancel_lead(&self, start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now + self.cancel_lead <= start
    }
}
