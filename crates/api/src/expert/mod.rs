mod create_expert;
mod delete_expert;
mod get_expert;
mod get_experts;
mod update_expert;

use actix_web::web;
use create_expert::create_expert_controller;
use delete_expert::delete_expert_controller;
use get_expert::get_expert_controller;
use get_experts::{get_experts_by_expertise_controller, get_experts_controller};
use update_expert::update_expert_controller;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/experts", web::post().to(create_expert_controller));
    cfg.route("/experts", web::get().to(get_experts_controller));
    cfg.route(
        "/experts/expertise/{expertise}",
        web::get().to(get_experts_by_expertise_controller),
    );

    cfg.route("/experts/{expert_id}", web::get().to(get_expert_controller));
    cfg.route(
        "/experts/{expert_id}",
        web::put().to(update_expert_controller),
    );
    cfg.route(
        "/experts/{expert_id}",
        web::delete().to(delete_expert_controller),
    );
}

/// Trimmed value, `None` when nothing is left
fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
