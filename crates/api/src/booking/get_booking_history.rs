use super::is_party;
use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::{dtos::StatusHistoryDTO, get_booking_history::*};
use consultation_booking_domain::{Actor, StatusHistory, ID};
use consultation_booking_infra::BookingContext;

pub async fn get_booking_history_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let usecase = GetBookingHistoryUseCase {
        actor,
        booking_id: path.booking_id.clone(),
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|history| {
            let history = history.into_iter().map(StatusHistoryDTO::new).collect();
            HttpResponse::Ok().json(APIResponse::new(history))
        })
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct GetBookingHistoryUseCase {
    pub actor: Actor,
    pub booking_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    NotParty,
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The booking with id: {}, was not found.", id))
            }
            UseCaseError::NotParty => Self::Forbidden(
                "Only the user, the expert or an admin can see the history of this booking."
                    .into(),
            ),
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetBookingHistoryUseCase {
    type Response = Vec<StatusHistory>;

    type Error = UseCaseError;

    const NAME: &'static str = "GetBookingHistory";

    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let booking = bounded(ctx, ctx.repos.bookings.find(&self.booking_id))
            .await
            .map_err(UseCaseError::Storage)?
            .ok_or_else(|| UseCaseError::NotFound(self.booking_id.clone()))?;
        if !is_party(&self.actor, &booking) {
            return Err(UseCaseError::NotParty);
        }

        bounded(ctx, ctx.repos.status_histories.find_by_booking(&booking.id))
            .await
            .map_err(UseCaseError::Storage)
    }
}

impl PermissionBoundary for GetBookingHistoryUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ReadBookings]
    }
}
