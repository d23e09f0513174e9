mod admission;
mod cancel_booking;
mod change_booking_status;
mod check_booking_conflicts;
mod create_booking;
mod get_booking;
mod get_booking_history;
mod get_bookings;
mod get_expert_booking_stats;
mod get_expert_bookings_on_date;
pub(crate) mod mark_missed_bookings;
mod subscribers;
mod update_booking;

use actix_web::web;
use cancel_booking::cancel_booking_controller;
use change_booking_status::update_booking_status_controller;
use chrono::{DateTime, Duration, Utc};
use check_booking_conflicts::check_booking_conflicts_controller;
use consultation_booking_api_structs::dtos::BookingDTO;
use consultation_booking_domain::{Actor, ActorRole, Booking, TimeSpan};
use consultation_booking_infra::BookingContext;
use create_booking::create_booking_controller;
use get_booking::get_booking_controller;
use get_booking_history::get_booking_history_controller;
use get_bookings::{get_expert_bookings_controller, get_user_bookings_controller};
use get_expert_booking_stats::get_expert_booking_stats_controller;
use get_expert_bookings_on_date::get_expert_bookings_on_date_controller;
use update_booking::update_booking_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/bookings", web::post().to(create_booking_controller));
    cfg.route(
        "/bookings/conflicts",
        web::post().to(check_booking_conflicts_controller),
    );
    cfg.route("/bookings/{booking_id}", web::get().to(get_booking_controller));
    cfg.route(
        "/bookings/{booking_id}",
        web::put().to(update_booking_controller),
    );
    cfg.route(
        "/bookings/{booking_id}",
        web::delete().to(cancel_booking_controller),
    );
    cfg.route(
        "/bookings/{booking_id}/status",
        web::put().to(update_booking_status_controller),
    );
    cfg.route(
        "/bookings/{booking_id}/history",
        web::get().to(get_booking_history_controller),
    );
    cfg.route(
        "/users/{user_id}/bookings",
        web::get().to(get_user_bookings_controller),
    );
    cfg.route(
        "/experts/{expert_id}/bookings",
        web::get().to(get_expert_bookings_controller),
    );
    cfg.route(
        "/experts/{expert_id}/bookings/stats",
        web::get().to(get_expert_booking_stats_controller),
    );
    cfg.route(
        "/experts/{expert_id}/bookings/date/{date}",
        web::get().to(get_expert_bookings_on_date_controller),
    );
}

/// The booking's user, its expert or an admin
fn is_party(actor: &Actor, booking: &Booking) -> bool {
    match actor.role {
        ActorRole::User => actor.id == booking.user_id,
        _ => actor.acts_for_expert(&booking.expert_id),
    }
}

fn to_dto(ctx: &BookingContext, booking: Booking) -> BookingDTO {
    BookingDTO::new(booking, &ctx.config.booking_rules, ctx.sys.now())
}

#[derive(Debug, PartialEq, Eq)]
enum SpanError {
    Missing,
    Ambiguous,
    Empty,
    OutOfRange,
}

impl SpanError {
    fn message(&self) -> String {
        match self {
            Self::Missing => "Either end_time or duration_minutes must be given.".into(),
            Self::Ambiguous => "Only one of end_time and duration_minutes can be given.".into(),
            Self::Empty => "The end_time must be after the start_time.".into(),
            Self::OutOfRange => "The duration_minutes is out of range.".into(),
        }
    }
}

/// Builds the booked range from an explicit end or a duration
fn resolve_span(
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    duration_minutes: Option<i64>,
) -> Result<TimeSpan, SpanError> {
    let end = match (end, duration_minutes) {
        (Some(_), Some(_)) => return Err(SpanError::Ambiguous),
        (None, None) => return Err(SpanError::Missing),
        (Some(end), None) => end,
        (None, Some(minutes)) => Duration::try_minutes(minutes)
            .and_then(|duration| start.checked_add_signed(duration))
            .ok_or(SpanError::OutOfRange)?,
    };
    TimeSpan::new(start, end).map_err(|_| SpanError::Empty)
}
