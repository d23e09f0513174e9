use actix_web::{web, HttpResponse};
use consultation_booking_api_structs::get_service_health::*;

async fn status() -> HttpResponse {
    HttpResponse::Ok().json(APIResponse::new(HealthDTO {
        message: "Ready to take bookings".into(),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(status));
}
