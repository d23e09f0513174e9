use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Half-open instant range `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSpan {
    pub(crate) start: DateTime<Utc>,
    pub(crate) end: DateTime<Utc>,
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("The end of a timespan must be after its start")]
pub struct InvalidTimeSpanError;

impl TimeSpan {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidTimeSpanError> {
        if end <= start {
            return Err(InvalidTimeSpanError);
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &TimeSpan) -> bool {
        self.start < other.end && self.end > other.start
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        self.start <= *instant && *instant < self.end
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::TimeZone;

    fn span(start_hour: u32, start_min: u32, end_hour: u32, end_min: u32) -> TimeSpan {
        TimeSpan::new(
            Utc.with_ymd_and_hms(2025, 6, 2, start_hour, start_min, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 2, end_hour, end_min, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_empty_and_inverted_spans() {
        let at = Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
        assert_eq!(TimeSpan::new(at, at), Err(InvalidTimeSpanError));
        assert!(TimeSpan::new(at, at - Duration::minutes(1)).is_err());
    }

    #[test]
    fn overlap_is_half_open() {
        let booked = span(10, 0, 10, 30);
        assert!(booked.overlaps(&span(10, 15, 10, 45)));
        assert!(booked.overlaps(&span(9, 0, 11, 0)));
        assert!(!booked.overlaps(&span(10, 30, 11, 0)));
        assert!(!booked.overlaps(&span(9, 30, 10, 0)));

        assert!(booked.contains(&booked.start()));
        assert!(!booked.contains(&booked.end()));
    }
}
