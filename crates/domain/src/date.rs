use crate::schedule::MinuteOfDay;
use chrono::prelude::*;
use chrono_tz::Tz;

/// An instant seen through the wall clock of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalInstant {
    pub date: NaiveDate,
    pub minute_of_day: MinuteOfDay,
    /// 0 = Sunday
    pub day_of_week: u8,
}

impl LocalInstant {
    pub fn from_utc(instant: &DateTime<Utc>, tz: &Tz) -> Self {
        let local = instant.with_timezone(tz);
        let minute_of_day = MinuteOfDay::from_hm(local.hour(), local.minute())
            .unwrap_or(MinuteOfDay::MIDNIGHT);
        Self {
            date: local.date_naive(),
            minute_of_day,
            day_of_week: local.weekday().num_days_from_sunday() as u8,
        }
    }
}

pub fn parse_date(datestr: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(datestr, "%Y-%m-%d")
        .map_err(|_| anyhow::Error::msg(format!("Invalid date: {}", datestr)))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Wall-clock time on `date` in `tz` as an instant. Ambiguous times
/// resolve to the earliest candidate, times inside a DST gap to `None`.
pub fn local_to_utc(date: &NaiveDate, minute: MinuteOfDay, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(minute.hour(), minute.minute(), 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// The half-open instant range covering a whole local date.
pub fn local_day_bounds(date: &NaiveDate, tz: &Tz) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = local_to_utc(date, MinuteOfDay::MIDNIGHT, tz)?;
    let next = date.succ_opt()?;
    let end = local_to_utc(&next, MinuteOfDay::MIDNIGHT, tz)?;
    Some((start, end))
}
