mod actor;
mod booking;
mod booking_event;
mod booking_rules;
mod booking_status;
pub mod date;
mod expert;
mod off_time;
mod schedule;
mod shared;
mod status_history;
mod timespan;

pub use actor::{Actor, ActorRole};
pub use booking::{validate_meeting_link, Booking, BookingDetails, BookingDetailsError, BookingMode};
pub use booking_event::BookingStatusChanged;
pub use booking_rules::{BookingRules, SlotError};
pub use booking_status::{BookingStatus, TransitionError};
pub use date::LocalInstant;
pub use expert::{Expert, ExpertStatus};
pub use off_time::{InvalidOffTimeError, OffTime};
pub use schedule::{
    validate_day_of_week, InvalidTimeOfDayError, MinuteOfDay, Schedule, ScheduleError,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use status_history::StatusHistory;
pub use timespan::{InvalidTimeSpanError, TimeSpan};
