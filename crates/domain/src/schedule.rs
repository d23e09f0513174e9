use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt::Display, str::FromStr};
use thiserror::Error;

const MINUTES_IN_DAY: u32 = 24 * 60;

/// Minutes elapsed since local midnight, always in `[0, 1440)`.
///
/// Parsed from and rendered as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MinuteOfDay(u32);

impl MinuteOfDay {
    pub const MIDNIGHT: MinuteOfDay = MinuteOfDay(0);

    pub fn new(value: u32) -> Option<Self> {
        if value < MINUTES_IN_DAY {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if hour > 23 || minute > 59 {
            return None;
        }
        Self::new(hour * 60 + minute)
    }

    pub fn value(&self) -> u32 {
        self.0
    }

    pub fn hour(&self) -> u32 {
        self.0 / 60
    }

    pub fn minute(&self) -> u32 {
        self.0 % 60
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Time: `{0}` is not a valid HH:MM time of day")]
pub struct InvalidTimeOfDayError(pub String);

impl FromStr for MinuteOfDay {
    type Err = InvalidTimeOfDayError;

    /// Accepts `HH:MM` and the `HH:MM:SS` form Postgres renders, ignoring seconds.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || InvalidTimeOfDayError(s.to_string());
        let parts = s.trim().split(':').collect::<Vec<_>>();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(err());
        }
        if parts.iter().any(|p| p.is_empty() || p.len() > 2) {
            return Err(err());
        }
        let hour = parts[0].parse::<u32>().map_err(|_| err())?;
        let minute = parts[1].parse::<u32>().map_err(|_| err())?;
        if parts.len() == 3 {
            let seconds = parts[2].parse::<u32>().map_err(|_| err())?;
            if seconds > 59 {
                return Err(err());
            }
        }
        Self::from_hm(hour, minute).ok_or_else(err)
    }
}

impl Display for MinuteOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl TryFrom<String> for MinuteOfDay {
    type Error = InvalidTimeOfDayError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MinuteOfDay> for String {
    fn from(m: MinuteOfDay) -> Self {
        m.to_string()
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Day of week must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidDayOfWeek(i64),
    #[error("Schedule start {start} must be before its end {end}")]
    EmptyWindow { start: MinuteOfDay, end: MinuteOfDay },
}

/// Weekly recurring availability window of an `Expert`.
///
/// Never hard deleted, `is_active` is flipped instead so that the
/// history of when an expert used to be available is kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ID,
    pub expert_id: ID,
    /// 0 = Sunday
    pub day_of_week: u8,
    pub start: MinuteOfDay,
    pub end: MinuteOfDay,
    pub is_active: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

pub fn validate_day_of_week(day_of_week: i64) -> Result<u8, ScheduleError> {
    if (0..=6).contains(&day_of_week) {
        Ok(day_of_week as u8)
    } else {
        Err(ScheduleError::InvalidDayOfWeek(day_of_week))
    }
}

impl Schedule {
    pub fn new(
        expert_id: ID,
        day_of_week: i64,
        start: MinuteOfDay,
        end: MinuteOfDay,
        now: DateTime<Utc>,
    ) -> Result<Self, ScheduleError> {
        let day_of_week = validate_day_of_week(day_of_week)?;
        if start >= end {
            return Err(ScheduleError::EmptyWindow { start, end });
        }
        Ok(Self {
            id: Default::default(),
            expert_id,
            day_of_week,
            start,
            end,
            is_active: true,
            created: now,
            updated: now,
        })
    }

    pub fn set_window(
        &mut self,
        start: MinuteOfDay,
        end: MinuteOfDay,
        now: DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        if start >= end {
            return Err(ScheduleError::EmptyWindow { start, end });
        }
        self.start = start;
        self.end = end;
        self.updated = now;
        Ok(())
    }

    pub fn set_day_of_week(&mut self, day_of_week: i64, now: DateTime<Utc>) -> Result<(), ScheduleError> {
        self.day_of_week = validate_day_of_week(day_of_week)?;
        self.updated = now;
        Ok(())
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) {
        self.is_active = false;
        self.updated = now;
    }

    /// Closed start, open end.
    pub fn covers(&self, minute: MinuteOfDay) -> bool {
        self.start <= minute && minute < self.end
    }
}

impl Entity for Schedule {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn m(s: &str) -> MinuteOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn parses_time_of_day() {
        assert_eq!(m("00:00").value(), 0);
        assert_eq!(m("09:30").value(), 570);
        assert_eq!(m("9:05").value(), 545);
        assert_eq!(m("23:59").value(), 1439);
        assert_eq!(m("10:00:00").value(), 600);
        assert_eq!(m("10:00").to_string(), "10:00");
    }

    #[test]
    fn rejects_malformed_time_of_day() {
        let invalid = vec![
            "", "24:00", "12:60", "12", "12:", ":30", "ab:cd", "12:30:61", "1:2:3:4", "123:00",
            "-1:00",
        ];
        for s in invalid {
            assert!(s.parse::<MinuteOfDay>().is_err(), "{} should be invalid", s);
        }
    }

    #[test]
    fn window_is_closed_start_open_end() {
        let schedule = Schedule::new(ID::new(), 1, m("09:00"), m("12:00"), Utc::now()).unwrap();
        assert!(schedule.covers(m("09:00")));
        assert!(schedule.covers(m("11:59")));
        assert!(!schedule.covers(m("12:00")));
        assert!(!schedule.covers(m("08:59")));
    }

    #[test]
    fn rejects_invalid_schedules() {
        let now = Utc::now();
        assert_eq!(
            Schedule::new(ID::new(), 7, m("09:00"), m("12:00"), now),
            Err(ScheduleError::InvalidDayOfWeek(7))
        );
        assert!(Schedule::new(ID::new(), -1, m("09:00"), m("12:00"), now).is_err());
        assert!(Schedule::new(ID::new(), 1, m("12:00"), m("12:00"), now).is_err());
        assert!(Schedule::new(ID::new(), 1, m("13:00"), m("12:00"), now).is_err());

        let mut schedule = Schedule::new(ID::new(), 0, m("09:00"), m("12:00"), now).unwrap();
        assert!(schedule.set_window(m("12:00"), m("09:00"), now).is_err());
        assert_eq!(schedule.start, m("09:00"));
    }
}
