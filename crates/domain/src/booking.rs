use crate::{
    booking_rules::BookingRules,
    booking_status::BookingStatus,
    shared::entity::{Entity, ID},
    timespan::TimeSpan,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingMode {
    Online,
    Offline,
}

impl BookingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::Offline => "offline",
        }
    }
}

impl Display for BookingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            _ => Err(format!("Invalid booking type: {}", s)),
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BookingDetailsError {
    #[error("A location is required for offline bookings")]
    MissingLocation,
    #[error("Online bookings can not have a location")]
    UnexpectedLocation,
    #[error("Meeting link: `{0}` is not a valid url")]
    InvalidMeetingLink(String),
}

/// A `User`s reservation of an `Expert` for the half-open
/// range `[start_time, end_time)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: ID,
    pub expert_id: ID,
    pub user_id: ID,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub mode: BookingMode,
    pub status: BookingStatus,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDetails {
    pub mode: BookingMode,
    pub location: Option<String>,
    pub meeting_link: Option<String>,
    pub notes: Option<String>,
}

impl BookingDetails {
    /// Normalizes blank strings to `None` and checks the mode specific fields
    pub fn validate(mut self) -> Result<Self, BookingDetailsError> {
        self.location = non_blank(self.location);
        self.meeting_link = non_blank(self.meeting_link);
        self.notes = non_blank(self.notes);

        match (self.mode, &self.location) {
            (BookingMode::Offline, None) => return Err(BookingDetailsError::MissingLocation),
            (BookingMode::Online, Some(_)) => return Err(BookingDetailsError::UnexpectedLocation),
            _ => (),
        }
        if let Some(link) = &self.meeting_link {
            validate_meeting_link(link)?;
        }
        Ok(self)
    }
}

pub fn validate_meeting_link(link: &str) -> Result<(), BookingDetailsError> {
    match url::Url::parse(link) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => Ok(()),
        _ => Err(BookingDetailsError::InvalidMeetingLink(link.to_string())),
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Booking {
    pub fn new(
        expert_id: ID,
        user_id: ID,
        slot: &TimeSpan,
        details: BookingDetails,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Default::default(),
            expert_id,
            user_id,
            start_time: slot.start(),
            end_time: slot.end(),
            mode: details.mode,
            status: BookingStatus::Pending,
            location: details.location,
            meeting_link: details.meeting_link,
            notes: details.notes,
            created: now,
            updated: now,
        }
    }

    pub fn timespan(&self) -> TimeSpan {
        TimeSpan {
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn set_timespan(&mut self, slot: &TimeSpan) {
        self.start_time = slot.start();
        self.end_time = slot.end();
    }

    pub fn set_details(&mut self, details: BookingDetails) {
        self.mode = details.mode;
        self.location = details.location;
        self.meeting_link = details.meeting_link;
        self.notes = details.notes;
    }

    pub fn details(&self) -> BookingDetails {
        BookingDetails {
            mode: self.mode,
            location: self.location.clone(),
            meeting_link: self.meeting_link.clone(),
            notes: self.notes.clone(),
        }
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }

    pub fn can_be_cancelled(&self, rules: &BookingRules, now: DateTime<Utc>) -> bool {
        self.status.occupies_slot() && rules.has_cancel_lead(self.start_time, now)
    }

    pub fn can_be_confirmed(&self) -> bool {
        self.status == BookingStatus::Pending
    }

    /// Still waiting on the expert although the session is over
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.status == BookingStatus::Pending && now > self.end_time
    }

    /// Holds its slot although the session is over
    pub fn is_missed(&self, now: DateTime<Utc>) -> bool {
        self.status.occupies_slot() && now > self.end_time
    }
}

impl Entity for Booking {
    fn id(&self) -> &ID {
        &self.id
    }
}
