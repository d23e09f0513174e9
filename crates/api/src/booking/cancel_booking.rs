use super::{change_booking_status::ChangeBookingStatusUseCase, to_dto};
use crate::{
    error::BookingError,
    shared::{auth::protect_route, usecase::execute_with_policy},
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::cancel_booking::*;
use consultation_booking_domain::BookingStatus;
use consultation_booking_infra::BookingContext;

pub async fn cancel_booking_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let usecase = ChangeBookingStatusUseCase {
        actor,
        booking_id: path.booking_id.clone(),
        to: BookingStatus::Cancelled,
        note: None,
        reason: None,
        meeting_link: None,
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|changed| HttpResponse::Ok().json(APIResponse::new(to_dto(&ctx, changed.booking))))
        .map_err(BookingError::from)
}
