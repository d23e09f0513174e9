mod create_off_time;
mod delete_off_time;
mod get_expert_off_times;

use actix_web::web;
use create_off_time::create_off_time_controller;
use delete_off_time::delete_off_time_controller;
use get_expert_off_times::get_expert_off_times_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/off-times", web::post().to(create_off_time_controller));
    cfg.route(
        "/experts/{expert_id}/off-times",
        web::get().to(get_expert_off_times_controller),
    );
    cfg.route(
        "/off-times/{off_time_id}",
        web::delete().to(delete_off_time_controller),
    );
}
