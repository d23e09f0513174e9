mod check_availability;
pub(crate) mod resolver;

use actix_web::web;
use check_availability::check_availability_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/availability/check",
        web::post().to(check_availability_controller),
    );
}
