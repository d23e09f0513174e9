use crate::shared::entity::{Entity, ID};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One-shot unavailability of an `Expert` spanning whole local dates,
/// both ends inclusive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OffTime {
    pub id: ID,
    pub expert_id: ID,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
    pub created: DateTime<Utc>,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("Off time start date {start} is after its end date {end}")]
pub struct InvalidOffTimeError {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl OffTime {
    pub fn new(
        expert_id: ID,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, InvalidOffTimeError> {
        if start_date > end_date {
            return Err(InvalidOffTimeError {
                start: start_date,
                end: end_date,
            });
        }
        Ok(Self {
            id: Default::default(),
            expert_id,
            start_date,
            end_date,
            reason,
            created: now,
        })
    }

    pub fn covers(&self, date: &NaiveDate) -> bool {
        self.start_date <= *date && *date <= self.end_date
    }
}

impl Entity for OffTime {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    #[test]
    fn covers_both_ends() {
        let off = OffTime::new(ID::new(), date(2), date(4), None, Utc::now()).unwrap();
        assert!(!off.covers(&date(1)));
        assert!(off.covers(&date(2)));
        assert!(off.covers(&date(3)));
        assert!(off.covers(&date(4)));
        assert!(!off.covers(&date(5)));
    }

    #[test]
    fn single_day_off_time_is_valid() {
        let off = OffTime::new(ID::new(), date(2), date(2), Some("Holiday".into()), Utc::now());
        assert!(off.is_ok());
        assert!(OffTime::new(ID::new(), date(3), date(2), None, Utc::now()).is_err());
    }
}
