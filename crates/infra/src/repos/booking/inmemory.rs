use super::IBookingRepo;
use crate::repos::{
    shared::{
        inmemory_repo::*,
        query_structs::{BookingCount, BookingPage, BookingQuery, WriteOutcome},
    },
    status_history::InMemoryStatusHistoryRepo,
};
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use consultation_booking_domain::{
    date::local_day_bounds, Booking, BookingStatus, StatusHistory, TimeSpan, ID,
};
use std::{collections::HashMap, sync::Arc};

pub struct InMemoryBookingRepo {
    bookings: std::sync::Mutex<Vec<Booking>>,
    histories: Arc<InMemoryStatusHistoryRepo>,
}

impl InMemoryBookingRepo {
    pub fn new(histories: Arc<InMemoryStatusHistoryRepo>) -> Self {
        Self {
            bookings: std::sync::Mutex::new(Vec::new()),
            histories,
        }
    }

    fn page(&self, query: &BookingQuery, mut owner: impl FnMut(&Booking) -> bool) -> BookingPage {
        let mut bookings = find_by(&self.bookings, |b| owner(b) && query.matches(b));
        bookings.sort_by(|b1, b2| b2.start_time.cmp(&b1.start_time));
        let total = bookings.len();
        BookingPage {
            bookings: paginate(bookings, query.skip, query.limit),
            total,
        }
    }
}

fn conflicts(existing: &Booking, span: &TimeSpan, exclude: Option<&ID>) -> bool {
    existing.status.occupies_slot()
        && existing.timespan().overlaps(span)
        && exclude.map_or(true, |id| existing.id != *id)
}

#[async_trait::async_trait]
impl IBookingRepo for InMemoryBookingRepo {
    async fn insert(&self, booking: &Booking) -> anyhow::Result<()> {
        insert(booking, &self.bookings);
        Ok(())
    }

    async fn save(&self, booking: &Booking) -> anyhow::Result<()> {
        save(booking, &self.bookings);
        Ok(())
    }

    async fn find(&self, booking_id: &ID) -> anyhow::Result<Option<Booking>> {
        Ok(find(booking_id, &self.bookings))
    }

    async fn find_by_expert(
        &self,
        expert_id: &ID,
        query: &BookingQuery,
    ) -> anyhow::Result<BookingPage> {
        Ok(self.page(query, |b| b.expert_id == *expert_id))
    }

    async fn find_by_user(
        &self,
        user_id: &ID,
        query: &BookingQuery,
    ) -> anyhow::Result<BookingPage> {
        Ok(self.page(query, |b| b.user_id == *user_id))
    }

    async fn find_by_expert_on_date(
        &self,
        expert_id: &ID,
        date: &NaiveDate,
        tz: &Tz,
    ) -> anyhow::Result<Vec<Booking>> {
        let (day_start, day_end) = local_day_bounds(date, tz)
            .ok_or_else(|| anyhow::Error::msg(format!("Date {} has no local midnight", date)))?;
        let mut bookings = find_by(&self.bookings, |b| {
            b.expert_id == *expert_id && b.start_time >= day_start && b.start_time < day_end
        });
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    async fn has_expert_conflict(
        &self,
        expert_id: &ID,
        span: &TimeSpan,
        exclude: Option<&ID>,
    ) -> anyhow::Result<bool> {
        Ok(lock(&self.bookings)
            .iter()
            .any(|b| b.expert_id == *expert_id && conflicts(b, span, exclude)))
    }

    async fn has_user_conflict(
        &self,
        user_id: &ID,
        span: &TimeSpan,
        exclude: Option<&ID>,
    ) -> anyhow::Result<bool> {
        Ok(lock(&self.bookings)
            .iter()
            .any(|b| b.user_id == *user_id && conflicts(b, span, exclude)))
    }

    async fn find_expert_conflicts(
        &self,
        expert_id: &ID,
        span: &TimeSpan,
        exclude: Option<&ID>,
    ) -> anyhow::Result<Vec<Booking>> {
        let mut bookings = find_by(&self.bookings, |b| {
            b.expert_id == *expert_id && conflicts(b, span, exclude)
        });
        bookings.sort_by_key(|b| b.start_time);
        Ok(bookings)
    }

    async fn insert_with_history(
        &self,
        booking: &Booking,
        history: &StatusHistory,
    ) -> anyhow::Result<WriteOutcome> {
        // The collection lock plays the role of the transaction
        let mut bookings = lock(&self.bookings);
        let span = booking.timespan();
        if bookings
            .iter()
            .any(|b| b.expert_id == booking.expert_id && conflicts(b, &span, None))
        {
            return Ok(WriteOutcome::ExpertConflict);
        }
        if bookings
            .iter()
            .any(|b| b.user_id == booking.user_id && conflicts(b, &span, None))
        {
            return Ok(WriteOutcome::UserConflict);
        }
        bookings.push(booking.clone());
        self.histories.append(history);
        Ok(WriteOutcome::Written)
    }

    async fn save_with_history(
        &self,
        booking: &Booking,
        expected_status: BookingStatus,
        history: &StatusHistory,
        recheck_conflicts: bool,
    ) -> anyhow::Result<WriteOutcome> {
        let mut bookings = lock(&self.bookings);
        let index = match bookings.iter().position(|b| b.id == booking.id) {
            Some(index) => index,
            None => return Ok(WriteOutcome::Missing),
        };
        if bookings[index].status != expected_status {
            return Ok(WriteOutcome::StaleStatus);
        }
        if recheck_conflicts && booking.status.occupies_slot() {
            let span = booking.timespan();
            let exclude = Some(&booking.id);
            if bookings
                .iter()
                .any(|b| b.expert_id == booking.expert_id && conflicts(b, &span, exclude))
            {
                return Ok(WriteOutcome::ExpertConflict);
            }
            if bookings
                .iter()
                .any(|b| b.user_id == booking.user_id && conflicts(b, &span, exclude))
            {
                return Ok(WriteOutcome::UserConflict);
            }
        }
        bookings[index] = booking.clone();
        self.histories.append(history);
        Ok(WriteOutcome::Written)
    }

    async fn find_ended_unresolved(
        &self,
        before: DateTime<Utc>,
        limit: usize,
    ) -> anyhow::Result<Vec<Booking>> {
        let mut bookings = find_by(&self.bookings, |b| {
            b.status.occupies_slot() && b.end_time < before
        });
        bookings.sort_by_key(|b| b.end_time);
        Ok(paginate(bookings, 0, limit))
    }

    async fn count_by_expert(&self, expert_id: &ID) -> anyhow::Result<Vec<BookingCount>> {
        let mut counts = HashMap::new();
        for booking in find_by(&self.bookings, |b| b.expert_id == *expert_id) {
            *counts.entry((booking.status, booking.mode)).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|((status, mode), count)| BookingCount {
                status,
                mode,
                count,
            })
            .collect())
    }
}
