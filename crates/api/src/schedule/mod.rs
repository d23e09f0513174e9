mod create_schedule;
mod delete_schedule;
mod get_expert_schedules;
mod update_schedule;

use actix_web::web;
use consultation_booking_domain::{MinuteOfDay, ScheduleError};
use create_schedule::create_schedule_controller;
use delete_schedule::delete_schedule_controller;
use get_expert_schedules::get_expert_schedules_controller;
use update_schedule::update_schedule_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/schedules", web::post().to(create_schedule_controller));
    cfg.route(
        "/experts/{expert_id}/schedules",
        web::get().to(get_expert_schedules_controller),
    );
    cfg.route(
        "/schedules/{schedule_id}",
        web::put().to(update_schedule_controller),
    );
    cfg.route(
        "/schedules/{schedule_id}",
        web::delete().to(delete_schedule_controller),
    );
}

/// Window problems shared by the schedule writes
#[derive(Debug)]
enum WindowError {
    InvalidTime(String),
    Invalid(ScheduleError),
}

impl WindowError {
    fn message(&self) -> String {
        match self {
            Self::InvalidTime(time) => format!(
                "The time: {} is not valid, it should be formatted as HH:MM.",
                time
            ),
            Self::Invalid(e) => e.to_string(),
        }
    }
}

fn parse_time(time: &str) -> Result<MinuteOfDay, WindowError> {
    time.trim()
        .parse()
        .map_err(|_| WindowError::InvalidTime(time.to_string()))
}
