use super::{is_party, to_dto};
use crate::{
    error::BookingError,
    shared::{
        auth::{protect_route, Permission},
        deadline::bounded,
        usecase::{execute_with_policy, PermissionBoundary, UseCase},
    },
};
use actix_web::{web, HttpRequest, HttpResponse};
use consultation_booking_api_structs::get_booking::*;
use consultation_booking_domain::{Actor, Booking, ID};
use consultation_booking_infra::BookingContext;

pub async fn get_booking_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<BookingContext>,
) -> Result<HttpResponse, BookingError> {
    let (actor, policy) = protect_route(&http_req)?;

    let usecase = GetBookingUseCase {
        actor,
        booking_id: path.booking_id.clone(),
    };

    execute_with_policy(usecase, &policy, &ctx)
        .await
        .map(|booking| HttpResponse::Ok().json(APIResponse::new(to_dto(&ctx, booking))))
        .map_err(BookingError::from)
}

#[derive(Debug)]
struct GetBookingUseCase {
    pub actor: Actor,
    pub booking_id: ID,
}

#[derive(Debug)]
enum UseCaseError {
    NotFound(ID),
    Storage(anyhow::Error),
}

impl From<UseCaseError> for BookingError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(id) => {
                Self::NotFound(format!("The booking with id: {}, was not found.", id))
            }
            UseCaseError::Storage(e) => Self::internal(e),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetBookingUseCase {
    type Response = Booking;

    type Error = UseCaseError;

    const NAME: &'static str = "GetBooking";

    /// Bookings of others are reported as missing
    async fn execute(&mut self, ctx: &BookingContext) -> Result<Self::Response, Self::Error> {
        let booking = bounded(ctx, ctx.repos.bookings.find(&self.booking_id))
            .await
            .map_err(UseCaseError::Storage)?;
        match booking {
            Some(booking) if is_party(&self.actor, &booking) => Ok(booking),
            _ => Err(UseCaseError::NotFound(self.booking_id.clone())),
        }
    }
}

impl PermissionBoundary for GetBookingUseCase {
    fn permissions(&self) -> Vec<Permission> {
        vec![Permission::ReadBookings]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::shared::test_helpers::{admin, expert_actor, seed_booking, seed_expert, setup, user};

    #[actix_web::test]
    async fn visible_to_the_parties_only() {
        let (ctx, _) = setup();
        let expert = seed_expert(&ctx).await;
        let owner = user();
        let booking = seed_booking(&ctx, &expert, &owner).await;

        for actor in [owner, expert_actor(&expert), admin()] {
            let mut usecase = GetBookingUseCase {
                actor,
                booking_id: booking.id.clone(),
            };
            assert_eq!(usecase.execute(&ctx).await.unwrap(), booking);
        }

        let mut usecase = GetBookingUseCase {
            actor: user(),
            booking_id: booking.id.clone(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
    }
}
